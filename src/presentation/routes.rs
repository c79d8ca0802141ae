// Route table for the dashboard views
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    clear_brand, get_brand, get_brand_analysis, get_brand_ranking, get_overview, get_table,
    health_check, refresh_overview, upstream_health,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Everything under `/api/brands/` is keyed by brand name, so the selection
/// lives at its own path.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/overview", get(get_overview))
        .route("/api/refresh", post(refresh_overview))
        .route("/api/tables/:table", get(get_table))
        .route("/api/brands", get(get_brand_ranking))
        .route("/api/brands/:brand", get(get_brand))
        .route("/api/brands/:brand/analysis", get(get_brand_analysis))
        .route("/api/selected-brand", delete(clear_brand))
        .route("/api/upstream-health", get(upstream_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::analytics_api::{AnalyticsApi, FetchError};
    use crate::application::brand_controller::BrandController;
    use crate::application::dashboard_controller::{DashboardController, FetchPolicy};
    use crate::application::overview_service::OverviewService;
    use crate::application::retry::RetryPolicy;
    use crate::domain::brand::{BrandMetrics, DetailedBrandAnalysis};
    use crate::domain::dashboard::{DashboardSnapshot, HealthStatus};
    use async_trait::async_trait;
    use std::net::SocketAddr;
    use std::time::Duration;

    /// Knows every brand; the dashboard is never reachable
    struct EchoBrandApi;

    #[async_trait]
    impl AnalyticsApi for EchoBrandApi {
        async fn get_dashboard_data(&self) -> Result<DashboardSnapshot, FetchError> {
            Err(FetchError::Timeout)
        }

        async fn get_brand_metrics(&self, brand: &str) -> Result<BrandMetrics, FetchError> {
            Ok(BrandMetrics {
                brand: brand.to_string(),
                total_vehicles: 3,
                average_price: 1.0,
                total_sales_30_days: 1,
                avg_days_to_sell: 1.0,
                top_models: vec![],
            })
        }

        async fn get_detailed_brand_analysis(
            &self,
            _brand: &str,
        ) -> Result<DetailedBrandAnalysis, FetchError> {
            Err(FetchError::Timeout)
        }

        async fn health_check(&self) -> Result<HealthStatus, FetchError> {
            Ok(HealthStatus {
                status: "healthy".to_string(),
            })
        }
    }

    async fn serve_dashboard() -> SocketAddr {
        let api: Arc<dyn AnalyticsApi> = Arc::new(EchoBrandApi);
        let retry = RetryPolicy::new(0, Duration::from_millis(1), Duration::from_millis(1));
        let policy = FetchPolicy {
            retry: retry.clone(),
            ..FetchPolicy::default()
        };
        let state = Arc::new(AppState {
            overview_service: OverviewService::new(
                Arc::new(DashboardController::new(api.clone(), policy)),
                Arc::new(BrandController::new(api.clone(), retry)),
            ),
            api,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_brand_named_like_a_route_is_still_a_brand() {
        let addr = serve_dashboard().await;
        let client = reqwest::Client::new();

        let resp = client
            .get(format!("http://{}/api/brands/selection", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["brand"], "selection");
        assert_eq!(body["metrics"]["brand"], "selection");

        let resp = client
            .delete(format!("http://{}/api/selected-brand", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_unloaded_dashboard_and_upstream_errors() {
        let addr = serve_dashboard().await;
        let client = reqwest::Client::new();

        let resp = client
            .get(format!("http://{}/api/brands", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

        let resp = client
            .get(format!("http://{}/api/brands/Ford/analysis", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::BAD_GATEWAY);

        let resp = client
            .get(format!("http://{}/api/upstream-health", addr))
            .send()
            .await
            .unwrap();
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "healthy");
    }
}
