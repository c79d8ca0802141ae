// Presentation layer - HTTP views over the dashboard state
pub mod app_state;
pub mod handlers;
pub mod routes;
