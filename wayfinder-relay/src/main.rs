//! Wayfinder Relay entry point

use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wayfinder_relay::config::Args;
use wayfinder_relay::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("wayfinder_relay={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("======================================");
    info!("  Wayfinder Relay");
    info!("======================================");
    info!("Listen: {}", args.listen);
    match args.store_config() {
        Ok(store) => info!(
            "Store: {} (namespace {}, collection {})",
            store.url, store.namespace, store.collection
        ),
        Err(e) => warn!("{} - every request will fail until this is corrected", e),
    }
    info!("======================================");

    let state = Arc::new(AppState::new(args));
    server::run(state).await?;
    Ok(())
}
