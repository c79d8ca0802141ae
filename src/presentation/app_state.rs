// Application state for HTTP handlers
use crate::application::analytics_api::AnalyticsApi;
use crate::application::overview_service::OverviewService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub overview_service: OverviewService,
    pub api: Arc<dyn AnalyticsApi>,
}
