//! Application entrypoint.

use anyhow::Context;
use clap::Parser;
use std::path::Path;

use heartbeat_ledger_node::{
    config::{load_env_file, Config, ENV_FILE},
    logging,
    model::Ledger,
    routes, AppState,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 0) config; .env is optional, a missing or invalid PORT exits here
    let env_file = load_env_file(Path::new(ENV_FILE));
    let config = Config::parse();
    logging::init_logging(logging::DEFAULT_FILTER, config.log_format);
    match env_file {
        Ok(true) => tracing::info!(path = ENV_FILE, "environment file loaded"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, path = ENV_FILE, "environment file ignored"),
    }

    // 1) genesis, before any connection is accepted
    let ledger = Ledger::new().context("create genesis block")?;
    tracing::info!(hash = %ledger.tail().hash, "genesis block ready");

    // 2) router
    let state = AppState::new(ledger);
    let app = routes::router(state)
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http());

    // 3) serve
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
