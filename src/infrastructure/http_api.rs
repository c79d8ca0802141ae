// reqwest adapter for the remote analytics API
use crate::application::analytics_api::{AnalyticsApi, FetchError};
use crate::domain::brand::{BrandMetrics, DetailedBrandAnalysis};
use crate::domain::dashboard::{DashboardSnapshot, HealthStatus};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpAnalyticsApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAnalyticsApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(FetchError::InvalidBaseUrl(base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn brand_url(&self, brand: &str, suffix: &str) -> String {
        format!(
            "{}/brand/{}{}",
            self.base_url,
            urlencoding::encode(brand),
            suffix
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!("Making GET request to: {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Request to {} failed with status {}: {}", url, status, body);
            return Err(FetchError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(classify_transport_error)?;
        tracing::debug!("Response received from: {} ({})", url, status);

        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

fn classify_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e.to_string())
    }
}

#[async_trait]
impl AnalyticsApi for HttpAnalyticsApi {
    async fn get_dashboard_data(&self) -> Result<DashboardSnapshot, FetchError> {
        self.get_json(&format!("{}/dashboard", self.base_url)).await
    }

    async fn get_brand_metrics(&self, brand: &str) -> Result<BrandMetrics, FetchError> {
        self.get_json(&self.brand_url(brand, "")).await
    }

    async fn get_detailed_brand_analysis(
        &self,
        brand: &str,
    ) -> Result<DetailedBrandAnalysis, FetchError> {
        self.get_json(&self.brand_url(brand, "/analysis")).await
    }

    async fn health_check(&self) -> Result<HealthStatus, FetchError> {
        self.get_json(&format!("{}/health", self.base_url)).await
    }
}
