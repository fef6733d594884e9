//! HTTP server module

mod api;

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};

use crate::AppState;
use crate::middleware::utm_middleware;

pub use api::{ErrorResponse, HealthResponse, ValueResponse};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    let utm = state.utm.clone();
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/utm", get(api::get_attribution))
        .route("/api/utm/clear", post(api::clear))
        .route("/api/utm/:key", get(api::get_value))
        .layer(axum::middleware::from_fn(utm_middleware))
        .layer(Extension(utm))
        .with_state(state)
}
