use super::types::{
    CliConfig, DEFAULT_HOST, DEFAULT_PORT, RawCliConfig, RawCookieConfig, RawServerConfig,
    ServerConfig,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use utm_core::UtmConfig;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project + explicit file)
    pub fn load(explicit: Option<&Path>) -> Result<CliConfig> {
        let mut raw = RawCliConfig::default();

        // Layer 1: User config
        if let Some(user_path) = Self::user_config_path()
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        // Layer 3: File passed on the command line, must exist
        if let Some(path) = explicit {
            raw = Self::merge_raw(raw, Self::read_raw(path)?);
        }

        Self::finalize(raw)
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "utm").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with UTM_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("UTM_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".utm/config.toml")
        }
    }

    fn read_raw(path: &Path) -> Result<RawCliConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawCliConfig, overlay: RawCliConfig) -> RawCliConfig {
        RawCliConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            cookie: RawCookieConfig {
                name: overlay.cookie.name.or(base.cookie.name),
                lifetime: overlay.cookie.lifetime.or(base.cookie.lifetime),
                path: overlay.cookie.path.or(base.cookie.path),
                domain: overlay.cookie.domain.or(base.cookie.domain),
                overwrite: overlay.cookie.overwrite.or(base.cookie.overwrite),
                secure: overlay.cookie.secure.or(base.cookie.secure),
                httponly: overlay.cookie.httponly.or(base.cookie.httponly),
                auto_init: overlay.cookie.auto_init.or(base.cookie.auto_init),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawCliConfig) -> Result<CliConfig> {
        let defaults = UtmConfig::default();
        let cookie = UtmConfig {
            name: raw.cookie.name.unwrap_or(defaults.name),
            lifetime: raw.cookie.lifetime.unwrap_or(defaults.lifetime),
            path: raw.cookie.path.unwrap_or(defaults.path),
            domain: raw.cookie.domain.unwrap_or(defaults.domain),
            overwrite: raw.cookie.overwrite.unwrap_or(defaults.overwrite),
            secure: raw.cookie.secure.unwrap_or(defaults.secure),
            httponly: raw.cookie.httponly.unwrap_or(defaults.httponly),
            auto_init: raw.cookie.auto_init.unwrap_or(defaults.auto_init),
        };
        cookie.validate()?;

        Ok(CliConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
            },
            cookie,
        })
    }

    /// Load config from a single file (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<CliConfig> {
        Self::finalize(Self::read_raw(path)?)
    }
}
