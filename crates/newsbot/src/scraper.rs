use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const SCRAPE_TIMEOUT_SECS: u64 = 10;
/// Longest text handed back from a page, in characters
pub const MAX_TEXT_CHARS: usize = 3000;

/// Elements whose text never belongs to the article body
const SKIPPED_TAGS: [&str; 3] = ["script", "style", "noscript"];

/// A named CSS selector that may locate the article body on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionStrategy {
    pub name: &'static str,
    pub selector: &'static str,
}

/// Tried in order; the first one producing any text wins
pub const EXTRACTION_STRATEGIES: [ExtractionStrategy; 4] = [
    ExtractionStrategy {
        name: "article",
        selector: "article",
    },
    ExtractionStrategy {
        name: "article-body",
        selector: "[class*='article-body'], [class*='article-content'], [itemprop='articleBody']",
    },
    ExtractionStrategy {
        name: "cms-content",
        selector: ".post-content, .entry-content, .story-body, .content-body, [class*='story-content']",
    },
    ExtractionStrategy {
        name: "main-paragraphs",
        selector: "main p",
    },
];

const FALLBACK_SELECTOR: &str = "p";

impl ExtractionStrategy {
    /// Concatenated visible text of every element the selector matches
    pub fn extract(&self, document: &Html) -> Option<String> {
        select_text(document, self.selector)
    }
}

/// Something that can fetch the readable text of a web page
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Best effort; `None` whenever the text could not be obtained
    async fn fetch_full_text(&self, url: &str) -> Option<String>;
}

pub struct ContentScraper {
    client: Client,
}

impl ContentScraper {
    pub fn new() -> Result<Self> {
        Self::with_settings(BROWSER_USER_AGENT, Duration::from_secs(SCRAPE_TIMEOUT_SECS))
    }

    pub fn with_settings(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("failed to build scraping client")?;
        Ok(Self { client })
    }

    async fn download(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).with_context(|| format!("invalid url '{}'", url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("unsupported url scheme '{}'", parsed.scheme()));
        }

        let response = self
            .client
            .get(parsed)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}

#[async_trait]
impl ContentFetcher for ContentScraper {
    async fn fetch_full_text(&self, url: &str) -> Option<String> {
        match self.download(url).await {
            Ok(html) => {
                let text = extract_article_text(&html);
                debug!(
                    url,
                    chars = text.as_ref().map(|t| t.chars().count()).unwrap_or(0),
                    "scraped article page"
                );
                text
            }
            Err(e) => {
                warn!(url, error = %e, "failed to scrape article");
                None
            }
        }
    }
}

/// Pull the readable article text out of an html page
pub fn extract_article_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let text = EXTRACTION_STRATEGIES
        .iter()
        .find_map(|strategy| {
            let text = strategy.extract(&document)?;
            debug!(strategy = strategy.name, "extraction strategy matched");
            Some(text)
        })
        .or_else(|| select_text(&document, FALLBACK_SELECTOR))?;

    Some(truncate_chars(&text, MAX_TEXT_CHARS))
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let joined = document
        .select(&selector)
        .map(visible_text)
        .collect::<Vec<_>>()
        .join(" ");

    let normalized = normalize_whitespace(&joined);
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Text of an element, leaving out anything inside script/style tags
fn visible_text(element: ElementRef) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        if let Some(text) = node.value().as_text() {
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| SKIPPED_TAGS.contains(&el.name()))
            });
            if !hidden {
                out.push_str(text);
                out.push(' ');
            }
        }
    }
    out
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
