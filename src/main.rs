// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::analytics_api::AnalyticsApi;
use crate::application::brand_controller::BrandController;
use crate::application::dashboard_controller::DashboardController;
use crate::application::overview_service::OverviewService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_api::HttpAnalyticsApi;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;
    let policy = config.fetch.policy();

    // Create API client (infrastructure layer)
    let http_api = HttpAnalyticsApi::new(&config.api.resolved_base_url(), policy.request_timeout)?;
    tracing::info!("Using analytics API at {}", http_api.base_url());
    let api: Arc<dyn AnalyticsApi> = Arc::new(http_api);

    // Create controllers (application layer)
    let dashboard = Arc::new(DashboardController::new(api.clone(), policy.clone()));
    let brands = Arc::new(BrandController::new(api.clone(), policy.retry.clone()));
    let polling = dashboard.spawn_polling();

    // Log connection state transitions
    let mut updates = dashboard.subscribe();
    let connection_log = tokio::spawn(async move {
        let mut connected = true;
        while updates.changed().await.is_ok() {
            let has_error = updates.borrow_and_update().error.is_some();
            if has_error == connected {
                connected = !has_error;
                if connected {
                    tracing::info!("Analytics API reachable again");
                } else {
                    tracing::warn!("Analytics API unreachable, serving last known data");
                }
            }
        }
    });

    // Create application state
    let state = Arc::new(AppState {
        overview_service: OverviewService::new(dashboard, brands),
        api,
    });

    // Build router (presentation layer)
    let app = router(state);

    // Start server
    let addr: SocketAddr = config.server.listen_addr.parse()?;
    tracing::info!("Starting vehicle analytics dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    polling.abort();
    connection_log.abort();
    Ok(())
}
