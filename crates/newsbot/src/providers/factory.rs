use super::{
    azure::AzureOpenAiProvider, base::Provider, configs::ProviderConfig, openai::OpenAiProvider,
};
use anyhow::Result;
use strum_macros::{Display, EnumIter};

#[derive(EnumIter, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum ProviderType {
    OpenAi,
    Azure,
}

impl ProviderConfig {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderConfig::OpenAi(_) => ProviderType::OpenAi,
            ProviderConfig::Azure(_) => ProviderType::Azure,
        }
    }
}

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider + Send + Sync>> {
    match config {
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::Azure(azure_config) => {
            Ok(Box::new(AzureOpenAiProvider::new(azure_config)?))
        }
    }
}
