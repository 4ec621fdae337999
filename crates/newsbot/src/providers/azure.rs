use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::base::{Provider, Usage};
use super::configs::AzureOpenAiProviderConfig;
use super::utils::{
    check_openai_context_length_error, create_request_payload, get_usage,
    openai_error_from_response, openai_response_to_message,
};
use crate::models::message::Message;
use crate::models::tool::Tool;

pub const AZURE_API_VERSION: &str = "2024-06-01";

/// OpenAI models served from an Azure OpenAI resource
pub struct AzureOpenAiProvider {
    client: Client,
    config: AzureOpenAiProviderConfig,
}

impl AzureOpenAiProvider {
    pub fn new(config: AzureOpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment
        )
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let response = self
            .client
            .post(self.completions_url())
            .query(&[("api-version", self.config.api_version.as_str())])
            .header("api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(openai_error_from_response(status, &body))
            }
        }
    }
}

#[async_trait]
impl Provider for AzureOpenAiProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        max_tokens: Option<i32>,
    ) -> Result<(Message, Usage)> {
        // The deployment in the url selects the model
        let payload = create_request_payload(
            None,
            system,
            messages,
            tools,
            self.config.temperature,
            max_tokens.or(self.config.max_tokens),
        )?;

        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            if let Some(err) = check_openai_context_length_error(error) {
                return Err(err.into());
            }
            return Err(anyhow!("Azure OpenAI API error: {}", error));
        }

        let message = openai_response_to_message(response.clone())?;
        let usage = get_usage(&response);
        debug!(?usage, deployment = %self.config.deployment, "azure completion finished");

        Ok((message, usage))
    }
}
