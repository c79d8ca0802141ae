// Domain layer - Wire models and pure derived metrics
pub mod brand;
pub mod dashboard;
pub mod metrics;
