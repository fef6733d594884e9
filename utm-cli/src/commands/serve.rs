//! Serve command for running the attribution server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;
use utm_server::{AppState, ServerConfig, UtmServer};

use crate::config::{CliConfig, ConfigLoader};

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,

    /// Extra config file layered on top of user and project config
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = ConfigLoader::load(args.config.as_deref())?;
    let server_config = server_config(&args, &config);

    info!(
        "Starting utm server on {}:{}",
        server_config.host, server_config.port
    );

    let state = Arc::new(AppState::with_config(config.cookie)?);
    let server = UtmServer::with_state(server_config, state);
    server.run().await.map_err(Into::into)
}

/// Command-line flags win over file configuration
fn server_config(args: &ServeArgs, config: &CliConfig) -> ServerConfig {
    ServerConfig::new(
        args.host.clone().unwrap_or_else(|| config.server.host.clone()),
        args.port.unwrap_or(config.server.port),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = ServeArgs {
            port: Some(9999),
            host: None,
            config: None,
        };
        let config = CliConfig::default();

        let server = server_config(&args, &config);
        assert_eq!(server.port, 9999);
        assert_eq!(server.host, config.server.host);
    }

    #[test]
    fn test_config_used_without_flags() {
        let args = ServeArgs {
            port: None,
            host: Some("0.0.0.0".to_string()),
            config: None,
        };
        let config = CliConfig::default();

        let server = server_config(&args, &config);
        assert_eq!(server.port, config.server.port);
        assert_eq!(server.host, "0.0.0.0");
    }
}
