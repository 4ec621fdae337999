use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

pub const NO_NEWS_ID: &str = "no-news";
pub const ERROR_ID: &str = "error";

/// Placeholder used when the provider does not report a publication time
pub const PLACEHOLDER_PUBLISHED_AT: &str = "1970-01-01T00:00:00Z";

/// News categories supported by the headline lookup
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NewsCategory {
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    Technology,
}

/// A normalized news item, as sent to both the client and the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub location: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
}

impl Article {
    /// Stand-in for a valid lookup that matched nothing
    pub fn no_news(location: &str) -> Self {
        Article {
            id: NO_NEWS_ID.to_string(),
            location: location.to_string(),
            title: "No news found".to_string(),
            description: format!("No articles were found for location '{}'.", location),
            url: "#".to_string(),
            source: "System".to_string(),
            published_at: PLACEHOLDER_PUBLISHED_AT.to_string(),
        }
    }

    /// Stand-in for a failed lookup, carrying the failure reason
    pub fn error(location: &str, reason: &str) -> Self {
        Article {
            id: ERROR_ID.to_string(),
            location: location.to_string(),
            title: "Error fetching news".to_string(),
            description: format!("Unable to fetch news: {}", reason),
            url: "#".to_string(),
            source: "System".to_string(),
            published_at: PLACEHOLDER_PUBLISHED_AT.to_string(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.id == NO_NEWS_ID || self.id == ERROR_ID
    }
}

/// The article fields a client sends when asking for a summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}
