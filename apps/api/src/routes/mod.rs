pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Content API
        .route("/api/v1/content", post(handlers::handle_create_content))
        .route(
            "/api/v1/content/safe",
            post(handlers::handle_create_safe_content),
        )
        .with_state(state)
}
