use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

/// Legacy listing endpoint; articles now only arrive through chat replies
async fn handler() -> Json<Value> {
    Json(json!({
        "news": [],
        "message": "News is now provided through the chat endpoint. Use POST /api/chat."
    }))
}

pub fn routes() -> Router {
    Router::new().route("/api/news", get(handler))
}
