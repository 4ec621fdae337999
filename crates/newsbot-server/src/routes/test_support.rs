use anyhow::Result;
use async_trait::async_trait;
use axum::{body::Body, response::Response};
use http_body_util::BodyExt;
use newsbot::{
    agent::NewsAgent,
    models::message::Message,
    news::{ArticleFetcher, NewsQuery, NewsSource, RawArticle, RawSource},
    providers::{base::Provider, mock::MockProvider},
    scraper::ContentFetcher,
    summarizer::SummarizationService,
};
use serde_json::Value;
use std::sync::Arc;

use crate::state::AppState;

pub struct FakeNews;

#[async_trait]
impl NewsSource for FakeNews {
    async fn fetch(&self, _query: &NewsQuery, _page_size: u32) -> Result<Vec<RawArticle>> {
        Ok(vec![RawArticle {
            source: Some(RawSource {
                id: None,
                name: Some("Reuters".to_string()),
            }),
            title: Some("Markets rally".to_string()),
            description: Some("Stocks closed higher.".to_string()),
            url: Some("https://example.com/markets".to_string()),
            published_at: Some("2024-05-01T10:00:00Z".to_string()),
            ..Default::default()
        }])
    }
}

pub struct FakePage(pub Option<String>);

#[async_trait]
impl ContentFetcher for FakePage {
    async fn fetch_full_text(&self, _url: &str) -> Option<String> {
        self.0.clone()
    }
}

/// State whose model replays `responses` in order; `Err` entries fail the call
pub fn state(responses: Vec<Result<Message, String>>, page: Option<String>) -> AppState {
    state_with_provider(&MockProvider::scripted(responses), page)
}

/// State sharing `provider`, so a test can inspect the calls it recorded
pub fn state_with_provider(provider: &MockProvider, page: Option<String>) -> AppState {
    let provider: Arc<dyn Provider> = Arc::new(provider.clone());
    AppState::new(
        NewsAgent::new(provider.clone(), ArticleFetcher::new(Arc::new(FakeNews))),
        SummarizationService::new(provider, Arc::new(FakePage(page))),
    )
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
