// HTTP request handlers
use crate::application::analytics_api::FetchError;
use crate::application::overview_service::{
    BrandAnalysisView, BrandRankRow, BrandView, ConnectionStatus, DashboardTable, OverviewView, TableQuery,
    TableView, ViewError,
};
use crate::domain::dashboard::HealthStatus;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct TableParams {
    pub search: Option<String>,
    pub field: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn error_response(status: StatusCode, message: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

pub fn view_error_status(err: &ViewError) -> StatusCode {
    match err {
        ViewError::UnknownTable(_) => StatusCode::NOT_FOUND,
        ViewError::UnknownField(_) => StatusCode::BAD_REQUEST,
        ViewError::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Upstream failures are reported as a bad gateway; the message is the
/// single user-facing connection error text
fn upstream_error(err: &FetchError) -> ApiError {
    error_response(StatusCode::BAD_GATEWAY, err.user_message())
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current dashboard state, including the last good data while refreshing
pub async fn get_overview(State(state): State<Arc<AppState>>) -> Json<OverviewView> {
    Json(state.overview_service.overview())
}

/// Manual refresh
pub async fn refresh_overview(State(state): State<Arc<AppState>>) -> Json<OverviewView> {
    Json(state.overview_service.refresh().await)
}

/// Filtered rows of one of the dashboard tables
pub async fn get_table(
    Path(table): Path<String>,
    Query(params): Query<TableParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<TableView>, ApiError> {
    let table: DashboardTable = table
        .parse()
        .map_err(|e: ViewError| error_response(view_error_status(&e), e))?;

    let query = TableQuery {
        search: params.search,
        field: params.field,
        limit: params.limit,
    };

    state
        .overview_service
        .table(table, &query)
        .map(Json)
        .map_err(|e| error_response(view_error_status(&e), e))
}

/// Top brands by sales from the current snapshot
pub async fn get_brand_ranking(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BrandRankRow>>, ApiError> {
    state
        .overview_service
        .brand_ranking()
        .map(Json)
        .map_err(|e| error_response(view_error_status(&e), e))
}

/// Select a brand and return its metrics
pub async fn get_brand(
    Path(brand): Path<String>,
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<BrandView>) {
    let view = state.overview_service.brand(&brand).await;
    let status = match view.status {
        ConnectionStatus::ConnectionError if view.metrics.is_none() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    (status, Json(view))
}

/// Back to the overview
pub async fn clear_brand(State(state): State<Arc<AppState>>) -> StatusCode {
    state.overview_service.clear_brand();
    StatusCode::NO_CONTENT
}

pub async fn get_brand_analysis(
    Path(brand): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BrandAnalysisView>, ApiError> {
    match state.overview_service.brand_analysis(&brand).await {
        Ok(view) => Ok(Json(view)),
        Err(e) => {
            tracing::error!("Failed to fetch detailed analysis for {}: {}", brand, e);
            Err(upstream_error(&e))
        }
    }
}

/// Health of the remote analytics API
pub async fn upstream_health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthStatus>, ApiError> {
    match state.api.health_check().await {
        Ok(health) => Ok(Json(health)),
        Err(e) => {
            tracing::warn!("Analytics API health check failed: {}", e);
            Err(upstream_error(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_error_status() {
        assert_eq!(
            view_error_status(&ViewError::UnknownTable("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            view_error_status(&ViewError::UnknownField("vin".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            view_error_status(&ViewError::NotLoaded),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_upstream_error_uses_connection_message() {
        let (status, Json(body)) = upstream_error(&FetchError::Timeout);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.error.starts_with("Unable to connect to the analytics API"));
    }
}
