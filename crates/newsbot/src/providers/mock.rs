use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, Usage};

/// What the mock saw on one `complete` call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
    pub max_tokens: Option<i32>,
}

/// A mock provider that returns pre-configured responses for testing
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Result<Message, String>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self::scripted(responses.into_iter().map(Ok).collect())
    }

    /// Create a mock provider where any entry may be a failed call
    pub fn scripted(responses: Vec<Result<Message, String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        max_tokens: Option<i32>,
    ) -> Result<(Message, Usage)> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|tool| tool.name.clone()).collect(),
            max_tokens,
        });

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok((Message::assistant().with_text(""), Usage::default()))
        } else {
            match responses.remove(0) {
                Ok(message) => Ok((message, Usage::default())),
                Err(error) => Err(anyhow!(error)),
            }
        }
    }
}
