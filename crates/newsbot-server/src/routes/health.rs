use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Newsbot API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
    }))
}

pub fn routes() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}
