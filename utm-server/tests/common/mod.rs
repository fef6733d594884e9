//! Shared test utilities for utm-server integration tests

use std::net::SocketAddr;
use std::sync::Arc;

use axum_test::TestServer;
use tokio::net::TcpListener;
use utm_core::UtmConfig;
use utm_server::{AppState, ServerConfig, UtmServer, create_router};

/// In-process test server with the given cookie settings
#[allow(dead_code)]
pub fn test_server(config: UtmConfig) -> TestServer {
    let state = Arc::new(AppState::with_config(config).unwrap());
    TestServer::new(create_router(state)).unwrap()
}

/// Spawns a real server on an ephemeral port, returns its address
#[allow(dead_code)]
pub async fn spawn_server(config: UtmConfig) -> SocketAddr {
    let state = Arc::new(AppState::with_config(config).unwrap());
    let server = UtmServer::with_state(ServerConfig::default(), state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}

/// The `name=value` part of a `Set-Cookie` header, as a browser would echo it
#[allow(dead_code)]
pub fn echo_cookie(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap_or_default().to_string()
}
