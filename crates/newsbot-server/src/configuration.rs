use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use newsbot::news::client::NEWS_API_HOST;
use newsbot::news::NewsApiConfig;
use newsbot::providers::{
    azure::AZURE_API_VERSION,
    configs::{AzureOpenAiProviderConfig, OpenAiProviderConfig, ProviderConfig},
    factory::ProviderType,
};
use newsbot::scraper::{BROWSER_USER_AGENT, SCRAPE_TIMEOUT_SECS};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// The single browser origin allowed to call the api
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
    Azure {
        endpoint: String,
        api_key: String,
        deployment: String,
        #[serde(default = "default_azure_api_version")]
        api_version: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
}

impl ProviderSettings {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderSettings::OpenAi { .. } => ProviderType::OpenAi,
            ProviderSettings::Azure { .. } => ProviderType::Azure,
        }
    }

    pub fn into_config(self) -> ProviderConfig {
        match self {
            ProviderSettings::OpenAi {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
            ProviderSettings::Azure {
                endpoint,
                api_key,
                deployment,
                api_version,
                temperature,
                max_tokens,
            } => ProviderConfig::Azure(AzureOpenAiProviderConfig {
                endpoint,
                api_key,
                api_version,
                deployment,
                temperature,
                max_tokens,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewsSettings {
    #[serde(default = "default_news_host")]
    pub host: String,
    pub api_key: String,
}

impl NewsSettings {
    pub fn into_config(self) -> NewsApiConfig {
        NewsApiConfig {
            host: self.host,
            api_key: self.api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScraperSettings {
    #[serde(default = "default_scraper_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_scraper_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ScraperSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub news: NewsSettings,
    #[serde(default)]
    pub scraper: ScraperSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("server.cors_origin", default_cors_origin())?
            .set_default("news.host", default_news_host())?
            .set_default("scraper.timeout_secs", default_scraper_timeout())?
            .add_source(
                Environment::with_prefix("NEWSBOT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                if let Some(field) = missing_field_path(&err.to_string()) {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(&field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

/// Dotted path of the field named by a "missing field `x` [for key `y`]" error
fn missing_field_path(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    let (field, rest) = rest.split_once('`')?;
    match rest
        .split_once("for key `")
        .and_then(|(_, key)| key.split_once('`'))
    {
        Some((key, _)) if !key.is_empty() => Some(format!("{}.{}", key, field)),
        _ => Some(field.to_string()),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_host() -> String {
    "https://api.openai.com".to_string()
}

fn default_azure_api_version() -> String {
    AZURE_API_VERSION.to_string()
}

fn default_news_host() -> String {
    NEWS_API_HOST.to_string()
}

fn default_scraper_timeout() -> u64 {
    SCRAPE_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}
