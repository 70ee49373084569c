use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and whether the NER model is loaded.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let ner = state.ner.clone();
    // Availability may trigger the first model load, which blocks.
    let ner_available = tokio::task::spawn_blocking(move || ner.is_available())
        .await
        .unwrap_or(false);

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "nerAvailable": ner_available
    }))
}
