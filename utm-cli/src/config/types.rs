use serde::{Deserialize, Serialize};
use utm_core::UtmConfig;

/// Default host for the utm server
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port for the utm server
pub const DEFAULT_PORT: u16 = 7480;

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCliConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub cookie: RawCookieConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    /// Host for the utm server
    pub host: Option<String>,

    /// Port for the utm server
    pub port: Option<u16>,
}

/// Cookie config as stored in TOML
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawCookieConfig {
    pub name: Option<String>,
    pub lifetime: Option<i64>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub overwrite: Option<bool>,
    pub secure: Option<bool>,
    pub httponly: Option<bool>,
    pub auto_init: Option<bool>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub cookie: UtmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host for the utm server
    pub host: String,

    /// Port for the utm server
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = CliConfig::default();
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.cookie.name, "utm");
        assert_eq!(config.cookie.lifetime, 604_800);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CliConfig {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            cookie: UtmConfig {
                name: "campaign".to_string(),
                overwrite: false,
                ..Default::default()
            },
        };

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: CliConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.cookie.name, "campaign");
        assert!(!parsed.cookie.overwrite);
    }

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[cookie]
secure = true
"#;
        let raw: RawCliConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.cookie.secure, Some(true));
        assert!(raw.cookie.name.is_none());
        assert!(raw.server.port.is_none());
    }
}
