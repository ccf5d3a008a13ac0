// src/repositories/mod.rs

pub mod postgres;

pub use postgres::dashboard::PostgresDashboardRepository;
pub use postgres::identity::PostgresIdentityRepository;
