//! Structured logging setup.

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured `log_level`. Production emits JSON
/// lines; other environments use the human-readable formatter.
pub fn init(server: &ServerConfig) {
    let filter = env_filter(&server.log_level);

    if server.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
