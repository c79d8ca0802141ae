// Port for the remote analytics API
use crate::domain::brand::{BrandMetrics, DetailedBrandAnalysis};
use crate::domain::dashboard::{DashboardSnapshot, HealthStatus};
use async_trait::async_trait;
use thiserror::Error;

/// Why a call to the analytics API produced no usable payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never got a response (DNS, refused connection, reset)
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("server responded with status {status}: {body}")]
    Server { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl FetchError {
    /// Message shown under the single "connection error" state
    pub fn user_message(&self) -> String {
        format!(
            "Unable to connect to the analytics API. Please ensure the backend service is running. ({})",
            self
        )
    }
}

#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    async fn get_dashboard_data(&self) -> Result<DashboardSnapshot, FetchError>;

    async fn get_brand_metrics(&self, brand: &str) -> Result<BrandMetrics, FetchError>;

    async fn get_detailed_brand_analysis(
        &self,
        brand: &str,
    ) -> Result<DetailedBrandAnalysis, FetchError>;

    async fn health_check(&self) -> Result<HealthStatus, FetchError>;
}
