use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::message::Message;
use crate::models::tool::Tool;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Base trait for AI providers (OpenAI, Azure OpenAI, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next message from the system prompt and transcript.
    ///
    /// When `tools` is non-empty the model decides on its own whether to answer
    /// directly or to request tool calls. `max_tokens` overrides the configured
    /// output limit for this call only.
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        max_tokens: Option<i32>,
    ) -> Result<(Message, Usage)>;
}
