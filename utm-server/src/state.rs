//! Shared application state for the utm server

use chrono::{DateTime, Utc};
use utm_core::{UtmConfig, UtmResult};

use crate::middleware::UtmLayer;

/// Shared application state accessible by all handlers
#[derive(Clone)]
pub struct AppState {
    /// Attribution middleware settings
    pub utm: UtmLayer,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new AppState with default cookie settings
    pub fn new() -> Self {
        Self::from_layer(Self::default_layer())
    }

    /// Create AppState for the given cookie settings
    pub fn with_config(config: UtmConfig) -> UtmResult<Self> {
        Ok(Self::from_layer(UtmLayer::new(config)?))
    }

    /// Create AppState around an existing layer (for testing)
    pub fn from_layer(utm: UtmLayer) -> Self {
        Self {
            utm,
            started_at: Utc::now(),
        }
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    fn default_layer() -> UtmLayer {
        match UtmLayer::new(UtmConfig::default()) {
            Ok(layer) => layer,
            Err(e) => unreachable!("default cookie settings are valid: {e}"),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
