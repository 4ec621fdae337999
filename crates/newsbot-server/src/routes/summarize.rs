use axum::{extract::State, routing::post, Json, Router};
use newsbot::models::article::ArticleInput;
use newsbot::summarizer::ArticleSummary;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct SummarizeRequest {
    article: ArticleInput,
}

// Degrades to a fixed summary instead of failing
async fn handler(
    State(state): State<AppState>,
    Json(request): Json<SummarizeRequest>,
) -> Json<ArticleSummary> {
    Json(state.summarizer.summarize(&request.article).await)
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/summarize", post(handler))
        .with_state(state)
}
