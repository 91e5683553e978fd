//! HTTP API endpoints.

pub mod chat;
pub mod health;
pub mod history;
pub mod resources;

use axum::{Json, Router, http::StatusCode};

use crate::AppState;

/// Create the API router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(chat::router())
        .merge(history::router())
        .merge(resources::router())
        .fallback(not_found)
}

/// JSON 404 for unknown routes.
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "The requested resource was not found"
        })),
    )
}
