use anyhow::Context;
use tokio::net::TcpListener;

use studymate_backend::core::config::{AppConfig, Credentials};
use studymate_backend::state::AppState;
use studymate_backend::{logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    logging::init(&config.logging);

    let credentials = Credentials::from_env()?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::initialize(config, &credentials)?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("STUDYMATE_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);

    let app = server::router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
