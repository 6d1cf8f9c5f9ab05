use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use newswire_core::LoremGenerator;
use newswire_server::ServerConfig;
use newswire_store::{Database, NewsRepo};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting newswire server");

    // Database path
    let db_path = std::env::var("NEWSWIRE_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".newswire").join("newswire.db"));

    let db = Database::open(&db_path).expect("Failed to open database");
    tracing::info!(path = %db_path.display(), "Database opened");

    // Env overrides on top of defaults
    let mut config = ServerConfig::default();
    if let Ok(port) = std::env::var("NEWSWIRE_PORT") {
        config.port = port.parse().expect("NEWSWIRE_PORT must be a port number");
    }
    if let Ok(token) = std::env::var("NEWSWIRE_ADMIN_TOKEN") {
        config.admin_token = token;
    }
    if let Ok(ttl) = std::env::var("NEWSWIRE_CACHE_TTL_SECS") {
        config.cache_ttl = Duration::from_secs(
            ttl.parse()
                .expect("NEWSWIRE_CACHE_TTL_SECS must be a number of seconds"),
        );
    }

    // Start server
    let handle = newswire_server::start(
        config,
        Arc::new(NewsRepo::new(db)),
        Arc::new(LoremGenerator),
    )
    .await
    .expect("Failed to start server");

    tracing::info!(port = handle.port, "newswire ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl+c");

    tracing::info!("Shutting down");
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}
