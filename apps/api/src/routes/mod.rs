pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes/parse", post(handlers::handle_parse_resume))
        .route("/api/v1/jobs/analyze", post(handlers::handle_analyze_job))
        .route("/api/v1/match", post(handlers::handle_match))
        .route("/api/v1/match/skills", post(handlers::handle_match_skills))
        .with_state(state)
}
