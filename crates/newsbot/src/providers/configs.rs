use serde::{Deserialize, Serialize};

// Unified enum to wrap different provider configurations
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    Azure(AzureOpenAiProviderConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureOpenAiProviderConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    /// Azure routes requests by deployment name rather than model name
    pub deployment: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}
