use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use newsbot::agent::{ChatReply, HistoryEntry};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    conversation_history: Vec<HistoryEntry>,
}

async fn handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, Json<Value>)> {
    tracing::info!(
        history = request.conversation_history.len(),
        "chat request received"
    );

    match state
        .agent
        .handle(&request.message, &request.conversation_history)
        .await
    {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            tracing::error!("Error processing chat: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": format!("Error processing chat: {}", e) })),
            ))
        }
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(handler))
        .with_state(state)
}
