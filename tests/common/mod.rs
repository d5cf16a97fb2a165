//! Shared helpers for integration tests.

#![allow(dead_code)]

use httpmock::MockServer;
use tracing_subscriber::EnvFilter;
use user_service_client::app::UserClient;

/// Installs a test-friendly subscriber; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Client whose internal base URL points at `server`.
pub fn client_for(server: &MockServer) -> UserClient {
    init_tracing();
    UserClient::new(server.base_url(), "https://external.invalid").unwrap()
}

/// A loopback address nothing listens on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
