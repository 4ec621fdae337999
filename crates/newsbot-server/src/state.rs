use anyhow::Result;
use newsbot::{
    agent::NewsAgent,
    news::{ArticleFetcher, NewsApiClient},
    providers::{base::Provider, factory},
    scraper::ContentScraper,
    summarizer::SummarizationService,
};
use std::sync::Arc;

use crate::configuration::Settings;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<NewsAgent>,
    pub summarizer: Arc<SummarizationService>,
}

impl AppState {
    pub fn new(agent: NewsAgent, summarizer: SummarizationService) -> Self {
        Self {
            agent: Arc::new(agent),
            summarizer: Arc::new(summarizer),
        }
    }

    /// Wire the agent and the summarizer to the configured external services
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let provider: Arc<dyn Provider + Send + Sync> =
            factory::get_provider(settings.provider.into_config())?.into();
        let news = NewsApiClient::new(settings.news.into_config())?;
        let scraper =
            ContentScraper::with_settings(&settings.scraper.user_agent, settings.scraper.timeout())?;

        Ok(Self::new(
            NewsAgent::new(provider.clone(), ArticleFetcher::new(Arc::new(news))),
            SummarizationService::new(provider, Arc::new(scraper)),
        ))
    }
}
