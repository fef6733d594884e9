//! Configuration for the attribution cookie

use serde::{Deserialize, Serialize};

use crate::error::{UtmError, UtmResult};

/// Default cookie name
pub const DEFAULT_COOKIE_NAME: &str = "utm";

/// Default cookie lifetime: 7 days
pub const DEFAULT_LIFETIME_SECS: i64 = 604_800;

/// Settings for the attribution cookie and the engine's merge policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmConfig {
    /// Name of the cookie holding the attribution data
    #[serde(default = "default_name")]
    pub name: String,

    /// Cookie lifetime in seconds
    #[serde(default = "default_lifetime")]
    pub lifetime: i64,

    /// Cookie path
    #[serde(default = "default_path")]
    pub path: String,

    /// Cookie domain, empty means the current host
    #[serde(default)]
    pub domain: String,

    /// Replace all stored values as soon as one UTM parameter shows up
    #[serde(default = "default_true")]
    pub overwrite: bool,

    /// Send the cookie over HTTPS only
    #[serde(default)]
    pub secure: bool,

    /// Hide the cookie from client-side scripts
    #[serde(default)]
    pub httponly: bool,

    /// Initialize automatically on every main request
    #[serde(default = "default_true")]
    pub auto_init: bool,
}

fn default_name() -> String {
    DEFAULT_COOKIE_NAME.to_string()
}

fn default_lifetime() -> i64 {
    DEFAULT_LIFETIME_SECS
}

fn default_path() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for UtmConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            lifetime: default_lifetime(),
            path: default_path(),
            domain: String::new(),
            overwrite: true,
            secure: false,
            httponly: false,
            auto_init: true,
        }
    }
}

impl UtmConfig {
    /// Load-time checks. A lifetime of zero passes here and is rejected
    /// later by [`crate::AttributionStore::set_lifetime`].
    pub fn validate(&self) -> UtmResult<()> {
        if self.name.trim().is_empty() {
            return Err(UtmError::InvalidConfiguration(
                "cookie name can't be empty".to_string(),
            ));
        }
        if self.lifetime < 0 {
            return Err(UtmError::InvalidConfiguration(format!(
                "lifetime must be at least 0, got {}",
                self.lifetime
            )));
        }
        Ok(())
    }
}
