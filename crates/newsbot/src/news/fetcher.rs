use std::sync::Arc;
use tracing::{info, warn};

use super::{NewsQuery, NewsSource, RawArticle, PAGE_SIZE};
use crate::models::article::{Article, NewsCategory, PLACEHOLDER_PUBLISHED_AT};

/// Maximum number of articles handed back per lookup
pub const MAX_ARTICLES: usize = 5;

/// Turns news provider lookups into a short, normalized article list.
///
/// `fetch` never fails: an empty result becomes a single `no-news` article
/// and a provider failure becomes a single `error` article.
#[derive(Clone)]
pub struct ArticleFetcher {
    source: Arc<dyn NewsSource>,
}

impl ArticleFetcher {
    pub fn new(source: Arc<dyn NewsSource>) -> Self {
        Self { source }
    }

    pub async fn fetch(
        &self,
        location: &str,
        category: Option<NewsCategory>,
        query: Option<&str>,
    ) -> Vec<Article> {
        let location = location.trim().to_lowercase();
        let news_query = NewsQuery::select(&location, category, query);

        match self.source.fetch(&news_query, PAGE_SIZE).await {
            Ok(raw) if raw.is_empty() => {
                info!(?news_query, "news lookup returned no articles");
                vec![Article::no_news(&location)]
            }
            Ok(raw) => {
                info!(?news_query, found = raw.len(), "news lookup succeeded");
                normalize(&location, raw)
            }
            Err(e) => {
                warn!(?news_query, error = %format!("{:#}", e), "news lookup failed");
                vec![Article::error(&location, &format!("{:#}", e))]
            }
        }
    }
}

fn normalize(location: &str, raw: Vec<RawArticle>) -> Vec<Article> {
    raw.into_iter()
        .take(MAX_ARTICLES)
        .enumerate()
        .map(|(index, article)| Article {
            id: (index + 1).to_string(),
            location: location.to_string(),
            title: or_fallback(article.title, "No title"),
            description: or_fallback(article.description, "No description available"),
            url: or_fallback(article.url, "#"),
            source: or_fallback(article.source.and_then(|s| s.name), "Unknown"),
            published_at: or_fallback(article.published_at, PLACEHOLDER_PUBLISHED_AT),
        })
        .collect()
}

fn or_fallback(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
