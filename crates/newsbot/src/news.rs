pub mod client;
pub mod fetcher;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::article::NewsCategory;

pub use client::{NewsApiClient, NewsApiConfig};
pub use fetcher::ArticleFetcher;

/// How many raw results are requested from the provider per lookup
pub const PAGE_SIZE: u32 = 10;

/// One lookup against the news provider. The variants are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsQuery {
    /// Free text search across all sources, newest first, English only
    Search { query: String },
    /// Top headlines of one category in one country
    Category {
        country: String,
        category: NewsCategory,
    },
    /// Top headlines in one country
    TopHeadlines { country: String },
}

impl NewsQuery {
    /// Pick the lookup strategy: a query wins over a category, which wins
    /// over plain location headlines.
    pub fn select(location: &str, category: Option<NewsCategory>, query: Option<&str>) -> Self {
        let country = location.trim().to_lowercase();
        match (query.map(str::trim).filter(|q| !q.is_empty()), category) {
            (Some(query), _) => NewsQuery::Search {
                query: query.to_string(),
            },
            (None, Some(category)) => NewsQuery::Category { country, category },
            (None, None) => NewsQuery::TopHeadlines { country },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// An article as the provider returns it; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// A news provider the fetcher can query
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch(&self, query: &NewsQuery, page_size: u32) -> Result<Vec<RawArticle>>;
}
