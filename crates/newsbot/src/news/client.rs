use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{NewsQuery, NewsSource, RawArticle};

pub const NEWS_API_HOST: &str = "https://newsapi.org";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsApiConfig {
    pub host: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// Client for the newsapi.org v2 REST api
pub struct NewsApiClient {
    client: Client,
    config: NewsApiConfig,
}

impl NewsApiClient {
    pub fn new(config: NewsApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    fn request(&self, query: &NewsQuery, page_size: u32) -> reqwest::RequestBuilder {
        let host = self.config.host.trim_end_matches('/');
        let page_size = page_size.to_string();

        let (endpoint, params): (&str, Vec<(&str, String)>) = match query {
            NewsQuery::Search { query } => (
                "everything",
                vec![
                    ("q", query.clone()),
                    ("language", "en".to_string()),
                    ("sortBy", "publishedAt".to_string()),
                    ("pageSize", page_size),
                ],
            ),
            NewsQuery::Category { country, category } => (
                "top-headlines",
                vec![
                    ("country", country.clone()),
                    ("category", category.to_string()),
                    ("pageSize", page_size),
                ],
            ),
            NewsQuery::TopHeadlines { country } => (
                "top-headlines",
                vec![("country", country.clone()), ("pageSize", page_size)],
            ),
        };

        self.client
            .get(format!("{}/v2/{}", host, endpoint))
            .header("X-Api-Key", &self.config.api_key)
            .query(&params)
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn fetch(&self, query: &NewsQuery, page_size: u32) -> Result<Vec<RawArticle>> {
        debug!(?query, page_size, "requesting articles from newsapi");

        let response = self
            .request(query, page_size)
            .send()
            .await
            .context("news provider unreachable")?;
        let status = response.status();
        let body = response.text().await?;

        // Error responses still carry a json body with a code and a message
        let parsed: NewsApiResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(anyhow!("news provider returned {}", status));
            }
            Err(e) => return Err(anyhow!("invalid news provider response: {}", e)),
        };

        if parsed.status != "ok" {
            return Err(anyhow!(
                "{}: {}",
                parsed.code.unwrap_or_else(|| status.to_string()),
                parsed
                    .message
                    .unwrap_or_else(|| "unknown news provider error".to_string())
            ));
        }

        Ok(parsed.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::article::NewsCategory;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(host: String) -> NewsApiClient {
        NewsApiClient::new(NewsApiConfig {
            host,
            api_key: "news-key".to_string(),
        })
        .unwrap()
    }

    fn ok_body() -> serde_json::Value {
        json!({
            "status": "ok",
            "totalResults": 1,
            "articles": [{
                "source": {"id": null, "name": "The Star"},
                "author": "Reporter",
                "title": "Harimau Malaya win",
                "description": "A late goal.",
                "url": "https://example.com/football",
                "urlToImage": null,
                "publishedAt": "2024-05-01T10:00:00Z",
                "content": "..."
            }]
        })
    }

    #[tokio::test]
    async fn test_category_headlines_request() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(query_param("country", "my"))
            .and(query_param("category", "sports"))
            .and(query_param("pageSize", "10"))
            .and(header("X-Api-Key", "news-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let query = NewsQuery::Category {
            country: "my".to_string(),
            category: NewsCategory::Sports,
        };
        let articles = client(mock_server.uri()).fetch(&query, 10).await?;

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title.as_deref(), Some("Harimau Malaya win"));
        assert_eq!(
            articles[0].source.as_ref().and_then(|s| s.name.as_deref()),
            Some("The Star")
        );
        assert_eq!(
            articles[0].published_at.as_deref(),
            Some("2024-05-01T10:00:00Z")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_search_request() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "electric cars"))
            .and(query_param("language", "en"))
            .and(query_param("sortBy", "publishedAt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let query = NewsQuery::Search {
            query: "electric cars".to_string(),
        };
        let articles = client(mock_server.uri()).fetch(&query, 10).await?;
        assert_eq!(articles.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_provider_error_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "status": "error",
                "code": "rateLimited",
                "message": "You have made too many requests recently."
            })))
            .mount(&mock_server)
            .await;

        let query = NewsQuery::TopHeadlines {
            country: "us".to_string(),
        };
        let error = client(mock_server.uri())
            .fetch(&query, 10)
            .await
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "rateLimited: You have made too many requests recently."
        );
    }

    #[tokio::test]
    async fn test_non_json_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;

        let query = NewsQuery::TopHeadlines {
            country: "us".to_string(),
        };
        let error = client(mock_server.uri())
            .fetch(&query, 10)
            .await
            .unwrap_err();
        assert!(error.to_string().contains("502"));
    }
}
