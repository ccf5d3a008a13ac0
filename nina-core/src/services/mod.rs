// File: src/services/mod.rs

pub mod aggregation;
pub mod metrics_service;

pub use metrics_service::MetricsService;
