//! Route Definitions

use super::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        // Game start: JSON in the path segment or in the body
        .route("/start_bingo/:params", get(start_from_path_handler))
        .route("/start_bingo", post(start_from_body_handler))
        .fallback(not_found_handler)
        .with_state(state)
}
