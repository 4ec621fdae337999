use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::{AgentError, AgentResult};
use crate::models::article::ArticleInput;
use crate::models::message::Message;
use crate::prompt_template::load_prompt_file;
use crate::providers::base::Provider;
use crate::scraper::ContentFetcher;

/// Scraped text shorter than this is treated as unusable
pub const MIN_FULL_TEXT_CHARS: usize = 200;
pub const FULL_SUMMARY_MAX_TOKENS: i32 = 400;
pub const BRIEF_SUMMARY_MAX_TOKENS: i32 = 300;
pub const SUMMARY_UNAVAILABLE: &str =
    "Sorry, I couldn't generate a summary for this article right now.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub summary: String,
    pub used_full_content: bool,
}

/// Summarizes a single article, from its full text when the page can be
/// scraped and from the headline and description otherwise.
pub struct SummarizationService {
    provider: Arc<dyn Provider>,
    fetcher: Arc<dyn ContentFetcher>,
}

impl SummarizationService {
    pub fn new(provider: Arc<dyn Provider>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { provider, fetcher }
    }

    /// Never fails; a failed model call yields a fixed apology.
    pub async fn summarize(&self, article: &ArticleInput) -> ArticleSummary {
        let full_text = match article.url.as_deref() {
            Some(url) if !url.trim().is_empty() => self.fetcher.fetch_full_text(url).await,
            _ => None,
        }
        .filter(|text| text.chars().count() >= MIN_FULL_TEXT_CHARS);

        let used_full_content = full_text.is_some();
        match self.generate(article, full_text.as_deref()).await {
            Ok(summary) => {
                info!(title = %article.title, used_full_content, "article summarized");
                ArticleSummary {
                    summary,
                    used_full_content,
                }
            }
            Err(e) => {
                warn!(title = %article.title, error = %e, "summarization failed");
                ArticleSummary {
                    summary: SUMMARY_UNAVAILABLE.to_string(),
                    used_full_content: false,
                }
            }
        }
    }

    async fn generate(&self, article: &ArticleInput, full_text: Option<&str>) -> AgentResult<String> {
        let (system_file, max_tokens) = match full_text {
            Some(_) => ("summary_full.md", FULL_SUMMARY_MAX_TOKENS),
            None => ("summary_brief.md", BRIEF_SUMMARY_MAX_TOKENS),
        };

        let system = load_prompt_file(system_file, &json!({}))
            .map_err(|e| AgentError::Internal(format!("summary prompt: {}", e)))?;
        let request = load_prompt_file(
            "summary_request.md",
            &json!({
                "title": article.title,
                "source": article.source.as_deref().unwrap_or(""),
                "description": article.description.as_deref().unwrap_or("No description available"),
                "content": full_text.unwrap_or(""),
            }),
        )
        .map_err(|e| AgentError::Internal(format!("summary prompt: {}", e)))?;

        let (response, _) = self
            .provider
            .complete(
                &system,
                &[Message::user().with_text(request)],
                &[],
                Some(max_tokens),
            )
            .await
            .map_err(|e| AgentError::Provider(format!("{:#}", e)))?;

        let summary = response.text().trim().to_string();
        if summary.is_empty() {
            return Err(AgentError::Provider("empty summary".to_string()));
        }
        Ok(summary)
    }
}
