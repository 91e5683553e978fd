//! Chat endpoint: the decision pipeline behind `POST /chat`.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::domain::MoodAnalysis;

/// Prompt returned when the message is empty after trimming.
const EMPTY_MESSAGE_PROMPT: &str = "Please say something!";

/// Create the chat router.
pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

/// Chat request body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    #[serde(default)]
    pub message: String,
    /// Session to continue; a new one is allocated when absent or
    /// unknown.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Chat response body.
///
/// `mood_analysis` and `is_crisis` are omitted when the pipeline did
/// not run (empty input).
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Reply text.
    pub reply: String,
    /// Mood judgment for the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_analysis: Option<MoodAnalysis>,
    /// Whether crisis detection fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_crisis: Option<bool>,
    /// The session this exchange belongs to.
    pub session_id: String,
}

/// Handle one chat message.
async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = body else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "No JSON data provided" })),
        )
            .into_response();
    };

    let session_id = state.sessions.resolve(req.session_id.as_deref());
    let message = req.message.trim();

    // Empty input gets a prompt, not a pipeline run; nothing is recorded.
    if message.is_empty() {
        return Json(ChatResponse {
            reply: EMPTY_MESSAGE_PROMPT.to_string(),
            mood_analysis: None,
            is_crisis: None,
            session_id,
        })
        .into_response();
    }

    let result = state.decider.decide(message).await;
    state.sessions.record_exchange(&session_id, message, &result);

    Json(ChatResponse {
        reply: result.reply,
        mood_analysis: Some(result.mood_analysis),
        is_crisis: Some(result.is_crisis),
        session_id,
    })
    .into_response()
}
