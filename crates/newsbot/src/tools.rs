use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use strum::IntoEnumIterator;

use crate::errors::{AgentError, AgentResult};
use crate::models::article::NewsCategory;
use crate::models::tool::{ParameterType, Tool, ToolParameter};

pub const GET_TOP_NEWS: &str = "get_top_news";
pub const DEFAULT_LOCATION: &str = "us";

/// The single capability the model may call
pub fn get_top_news_tool() -> Tool {
    Tool::new(
        GET_TOP_NEWS,
        "Get the latest news articles. Use `category` for broad topics, `query` for \
         specific subjects, or only `location` for the top headlines of a country.",
        vec![
            ToolParameter::required(
                "location",
                ParameterType::String,
                "The location as a 2-letter country code, e.g. us, my, gb",
            ),
            ToolParameter::optional(
                "category",
                ParameterType::String,
                "The news category to filter by",
            )
            .with_allowed_values(NewsCategory::iter().map(|c| c.to_string())),
            ToolParameter::optional(
                "query",
                ParameterType::String,
                "Keywords for a specific subject, person, company or event",
            ),
        ],
    )
}

/// Every tool declared to the model
pub fn registry() -> Vec<Tool> {
    vec![get_top_news_tool()]
}

#[derive(Debug, Deserialize)]
struct RawTopNewsArgs {
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    query: Option<String>,
}

/// Decoded arguments of a `get_top_news` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetTopNewsArgs {
    pub location: String,
    pub category: Option<NewsCategory>,
    pub query: Option<String>,
}

impl GetTopNewsArgs {
    pub fn from_arguments(arguments: &Value) -> AgentResult<Self> {
        let raw: RawTopNewsArgs = serde_json::from_value(arguments.clone()).map_err(|e| {
            AgentError::InvalidParameters(format!("{} arguments: {}", GET_TOP_NEWS, e))
        })?;

        let location = non_blank(raw.location).unwrap_or_else(|| DEFAULT_LOCATION.to_string());
        let category = non_blank(raw.category)
            .map(|category| {
                NewsCategory::from_str(&category.to_lowercase()).map_err(|_| {
                    AgentError::InvalidParameters(format!("unknown news category '{}'", category))
                })
            })
            .transpose()?;

        Ok(Self {
            location,
            category,
            query: non_blank(raw.query),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
