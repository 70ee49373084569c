mod analysis;
mod config;
mod errors;
mod extraction;
mod models;
mod ner;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::ner::EntityExtractor;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize NER (degraded regex-only mode when no endpoint is configured)
    let ner = EntityExtractor::from_config(&config);
    let state = AppState::new(config.clone(), ner);

    // Warm the model on a blocking task so the first request does not pay for the load
    let warmup = state.ner.clone();
    tokio::task::spawn(async move {
        match tokio::task::spawn_blocking(move || warmup.ensure_loaded()).await {
            Ok(true) => info!("NER model ready"),
            Ok(false) => info!("NER unavailable; serving regex-only extraction"),
            Err(e) => warn!("NER warm-up task failed: {e}"),
        }
    });

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict allowed origins once a frontend origin is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
