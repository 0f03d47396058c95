use anyhow::Result;
use career_compass::chat::WebSearchResponder;
use career_compass::config::Config;
use career_compass::http::{AppState, start_http_server};
use career_compass::open_store;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(config.runtime.log_level.as_str())
        .with_ansi(false)
        .init();

    info!(
        "Starting career-compass API (store={:?}, port={})",
        config.runtime.store_backend, config.server.port
    );

    let store = open_store(&config)?;
    let chat = Arc::new(WebSearchResponder::new(&config.chat)?);

    let state = AppState {
        store,
        chat,
        config: Arc::new(config),
    };
    start_http_server(state).await?;
    Ok(())
}
