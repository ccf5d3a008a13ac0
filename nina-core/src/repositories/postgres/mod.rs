// src/repositories/postgres/mod.rs

pub mod dashboard;
pub mod identity;

pub use dashboard::PostgresDashboardRepository;
pub use identity::PostgresIdentityRepository;
