//! REST API handlers

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use utm_core::{AttributionRecord, UtmError, UtmKey};

use crate::AppState;
use crate::middleware::Attribution;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the server
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since server started
    pub uptime_seconds: i64,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// A single attribution value
#[derive(Debug, Serialize, Deserialize)]
pub struct ValueResponse {
    /// Canonical key, always `utm_` prefixed
    pub key: String,
    pub value: Option<String>,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /api/utm - All five attribution values
pub async fn get_attribution(
    Extension(attribution): Extension<Attribution>,
) -> Json<AttributionRecord> {
    Json(attribution.record())
}

/// GET /api/utm/:key - One attribution value, `key` may omit the `utm_` prefix
pub async fn get_value(
    Path(key): Path<String>,
    Extension(attribution): Extension<Attribution>,
) -> Result<Json<ValueResponse>, (StatusCode, Json<ErrorResponse>)> {
    let not_found = |e: UtmError| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    };

    let key = UtmKey::parse(&key).map_err(not_found)?;
    let value = attribution.value_of(key);

    Ok(Json(ValueResponse {
        key: key.as_str().to_string(),
        value,
    }))
}

/// POST /api/utm/clear - Expire the attribution cookie
pub async fn clear(Extension(attribution): Extension<Attribution>) -> StatusCode {
    attribution.clear();
    StatusCode::NO_CONTENT
}
