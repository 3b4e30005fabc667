//! Net-cafe design chat server
//!
//! Entry point for the chat widget application.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use netcafe_chat::config::AppConfig;
use netcafe_chat::server::start_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (M-LOG-STRUCTURED)
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load()?;
    info!(
        name: "config.loaded",
        address = %config.bind_addr(),
        backend = %config.backend.base_url,
        "Configuration loaded"
    );

    start_server(Arc::new(config)).await
}
