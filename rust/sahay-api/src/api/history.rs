//! Mood history and conversation maintenance endpoints.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::domain::MoodRecord;

/// Create the history router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mood_history", get(mood_history))
        .route("/clear_conversation", post(clear_conversation))
}

/// Query parameters naming a session.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    /// Session to look up.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Mood history response body.
#[derive(Debug, Serialize)]
pub struct MoodHistoryResponse {
    /// Recent mood records, oldest first.
    pub moods: Vec<MoodRecord>,
}

/// Recent mood records for a session (at most the last 20).
async fn mood_history(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Json<MoodHistoryResponse> {
    let moods = query
        .session_id
        .as_deref()
        .map(|id| state.sessions.mood_history(id))
        .unwrap_or_default();

    Json(MoodHistoryResponse { moods })
}

/// Clear-conversation request body.
#[derive(Debug, Deserialize)]
pub struct ClearConversationRequest {
    /// Session whose conversation history to drop.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Status response body.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Outcome label.
    pub status: &'static str,
}

/// Drop a session's conversation history. Mood history stays so mood
/// tracking survives a fresh conversation.
async fn clear_conversation(
    State(state): State<AppState>,
    body: Result<Json<ClearConversationRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = body else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "No JSON data provided" })),
        )
            .into_response();
    };

    if let Some(id) = req.session_id.as_deref() {
        state.sessions.clear_conversation(id);
    }

    Json(StatusResponse { status: "success" }).into_response()
}
