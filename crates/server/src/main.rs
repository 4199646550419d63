//! vidshell host entry point.
//!
//! Boots the offline worker (install, then activate) and serves its
//! lifecycle events as MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;
use vidshell_client::{CacheManager, FetchClient, FetchConfig};
use vidshell_core::{AppConfig, CacheDb};

mod error;
mod handler;
mod platform;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(cache = %config.cache_name(), db = %config.db_path.display(), "starting vidshell host");

    let db = CacheDb::open(&config.db_path).await?;
    let network = Arc::new(FetchClient::new(FetchConfig::from_app(&config))?);
    let platform = Arc::new(platform::HostPlatform::new());
    let manager = CacheManager::new(&config, Arc::new(db.clone()), network, platform.clone())?;

    let state = Arc::new(state::HostState::new(config, db, platform, manager)?);
    state.boot().await;

    let handler = handler::VidshellHost::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
