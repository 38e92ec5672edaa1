//! Safety Alerting Service - Main Entry Point

use std::sync::Arc;

use api::{init_logging, run_server, AppState};
use history::{FileStore, KeyValueStore};
use pipeline::{LogSmsGateway, Pipeline, Settings};
use tracing::info;

const DEFAULT_HISTORY_PATH: &str = "sentinel_history.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("=== Sentinel Safety Service v{} ===", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load("sentinel")?;
    let history_path = settings
        .history_path
        .clone()
        .unwrap_or_else(|| DEFAULT_HISTORY_PATH.to_string());

    let store: Box<dyn KeyValueStore> = Box::new(FileStore::new(history_path));
    let pipeline = Pipeline::new(settings, store, Box::new(LogSmsGateway));
    let state = Arc::new(AppState::new(pipeline));

    let addr = "0.0.0.0:8080";
    run_server(addr, state).await?;

    Ok(())
}
