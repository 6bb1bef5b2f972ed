pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::analysis::validation::MAX_FILE_BYTES;
use crate::state::AppState;

/// Room for two maximum-size uploads plus form framing. Files above the
/// per-file limit still arrive whole so the validator can report them; a body
/// past this cap is cut off and reported as an oversized upload.
const REQUEST_BODY_LIMIT: usize = (2 * MAX_FILE_BYTES + 1024 * 1024) as usize;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route("/api/v1/analyze/text", post(handlers::handle_analyze_text))
        .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT))
        .with_state(state)
}
