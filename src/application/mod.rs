// Application layer - Fetch lifecycle and use cases
pub mod analytics_api;
pub mod brand_controller;
pub mod dashboard_controller;
pub mod fetch_state;
pub mod overview_service;
pub mod retry;
