use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::errors::{AgentError, AgentResult};
use crate::models::article::{Article, NewsCategory, ERROR_ID};
use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::news::ArticleFetcher;
use crate::prompt_template::load_prompt_file;
use crate::providers::base::Provider;
use crate::tools::{self, GetTopNewsArgs, GET_TOP_NEWS};

/// How many of the most recent history entries reach the model
pub const HISTORY_WINDOW: usize = 10;
pub const ACKNOWLEDGMENT_MAX_TOKENS: i32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    User,
    #[serde(alias = "ai")]
    Assistant,
}

/// One prior turn of the conversation, as supplied by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: EntryType,
    pub content: String,
}

impl HistoryEntry {
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            kind: EntryType::User,
            content: content.into(),
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            kind: EntryType::Assistant,
            content: content.into(),
        }
    }

    fn to_message(&self) -> Message {
        let message = match self.kind {
            EntryType::User => Message::user(),
            EntryType::Assistant => Message::assistant(),
        };
        message.with_text(self.content.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyType {
    TextResponse,
    NewsWithArticles,
}

/// What a chat request produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_message: Option<String>,
    pub articles: Vec<Article>,
    #[serde(rename = "type")]
    pub reply_type: ReplyType,
}

impl ChatReply {
    fn text(message: String) -> Self {
        Self {
            message,
            full_message: None,
            articles: Vec::new(),
            reply_type: ReplyType::TextResponse,
        }
    }

    fn news(message: String, full_message: String, articles: Vec<Article>) -> Self {
        Self {
            message,
            full_message: Some(full_message),
            articles,
            reply_type: ReplyType::NewsWithArticles,
        }
    }
}

/// What the news lookups of a request produced, as told to the acknowledgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum LookupOutcome {
    Found,
    NoResults,
    Failed,
}

impl LookupOutcome {
    fn of(articles: &[Article]) -> Self {
        if articles.iter().any(|a| !a.is_sentinel()) {
            LookupOutcome::Found
        } else if articles.iter().any(|a| a.id == ERROR_ID) {
            LookupOutcome::Failed
        } else {
            LookupOutcome::NoResults
        }
    }
}

/// Progress of a single chat request through the tool-calling loop
#[derive(Debug)]
enum ReplyState {
    FirstModelCall,
    ToolExecution { response: Message },
    SecondModelCall { articles: Vec<Article> },
    Acknowledgment {
        full_message: String,
        articles: Vec<Article>,
    },
    Done(ChatReply),
}

/// Drives one chat request: lets the model decide whether it needs news,
/// runs the requested lookups and turns the result into a short reply.
///
/// The agent holds no conversation state; every request carries its own
/// history.
pub struct NewsAgent {
    provider: Arc<dyn Provider>,
    fetcher: ArticleFetcher,
    tools: Vec<Tool>,
}

impl NewsAgent {
    pub fn new(provider: Arc<dyn Provider>, fetcher: ArticleFetcher) -> Self {
        Self {
            provider,
            fetcher,
            tools: tools::registry(),
        }
    }

    pub async fn handle(&self, message: &str, history: &[HistoryEntry]) -> AgentResult<ChatReply> {
        let system = self.system_prompt()?;
        let mut transcript = build_transcript(message, history);
        let mut state = ReplyState::FirstModelCall;

        loop {
            debug!(?state, "chat reply step");
            state = match state {
                ReplyState::FirstModelCall => {
                    let response = self.complete(&system, &transcript, &self.tools, None).await?;
                    if response.has_tool_requests() {
                        ReplyState::ToolExecution { response }
                    } else {
                        ReplyState::Done(ChatReply::text(response.text()))
                    }
                }
                ReplyState::ToolExecution { response } => {
                    let articles = self.execute_tool_calls(response, &mut transcript).await?;
                    ReplyState::SecondModelCall { articles }
                }
                ReplyState::SecondModelCall { articles } => {
                    let response = self.complete(&system, &transcript, &[], None).await?;
                    ReplyState::Acknowledgment {
                        full_message: response.text(),
                        articles,
                    }
                }
                ReplyState::Acknowledgment {
                    full_message,
                    articles,
                } => {
                    let acknowledgment = self.acknowledge(message, &articles).await?;
                    ReplyState::Done(ChatReply::news(acknowledgment, full_message, articles))
                }
                ReplyState::Done(reply) => {
                    info!(
                        reply_type = ?reply.reply_type,
                        articles = reply.articles.len(),
                        "chat reply ready"
                    );
                    return Ok(reply);
                }
            };
        }
    }

    fn system_prompt(&self) -> AgentResult<String> {
        let categories: Vec<String> = NewsCategory::iter().map(|c| c.to_string()).collect();
        load_prompt_file("system.md", &json!({ "categories": categories }))
            .map_err(|e| AgentError::Internal(format!("system prompt: {}", e)))
    }

    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        max_tokens: Option<i32>,
    ) -> AgentResult<Message> {
        let (response, usage) = self
            .provider
            .complete(system, messages, tools, max_tokens)
            .await
            .map_err(|e| AgentError::Provider(format!("{:#}", e)))?;
        debug!(
            input_tokens = ?usage.input_tokens,
            output_tokens = ?usage.output_tokens,
            "model call finished"
        );
        Ok(response)
    }

    /// Runs every tool call of `response` and appends the call and its results
    /// to the transcript. With several lookups only the last one's articles are
    /// kept.
    async fn execute_tool_calls(
        &self,
        response: Message,
        transcript: &mut Vec<Message>,
    ) -> AgentResult<Vec<Article>> {
        let mut results = Message::tool();
        let mut articles = Vec::new();

        for request in response.tool_requests() {
            let tool_call = request.tool_call.clone()?;

            if tool_call.name != GET_TOP_NEWS {
                info!(tool = %tool_call.name, "model requested an unknown tool");
                results = results.with_tool_response(
                    request.id.clone(),
                    Err(AgentError::ToolNotFound(tool_call.name.clone())),
                );
                continue;
            }

            let args = GetTopNewsArgs::from_arguments(&tool_call.arguments)?;
            info!(
                location = %args.location,
                category = ?args.category,
                query = ?args.query,
                "fetching news for tool call"
            );
            let found = self
                .fetcher
                .fetch(&args.location, args.category, args.query.as_deref())
                .await;
            let serialized = serde_json::to_string(&found)
                .map_err(|e| AgentError::ExecutionError(format!("serializing articles: {}", e)))?;

            results = results.with_tool_response(request.id.clone(), Ok(serialized));
            articles = found;
        }

        transcript.push(response);
        transcript.push(results);
        Ok(articles)
    }

    /// Sentinel articles are not counted as found
    async fn acknowledge(&self, query: &str, articles: &[Article]) -> AgentResult<String> {
        let article_count = articles.iter().filter(|a| !a.is_sentinel()).count();
        let outcome = LookupOutcome::of(articles);
        let render = |name: &str, context: serde_json::Value| {
            load_prompt_file(name, &context)
                .map_err(|e| AgentError::Internal(format!("acknowledgment prompt: {}", e)))
        };
        let system = render("acknowledgment.md", json!({}))?;
        let request = render(
            "acknowledgment_request.md",
            json!({
                "query": query,
                "article_count": article_count,
                "outcome": outcome,
            }),
        )?;

        let response = self
            .complete(
                &system,
                &[Message::user().with_text(request)],
                &[],
                Some(ACKNOWLEDGMENT_MAX_TOKENS),
            )
            .await?;
        Ok(response.text().trim().to_string())
    }
}

/// The recent, non-blank history followed by the new user message
fn build_transcript(message: &str, history: &[HistoryEntry]) -> Vec<Message> {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    history[start..]
        .iter()
        .filter(|entry| !entry.content.trim().is_empty())
        .map(HistoryEntry::to_message)
        .chain(std::iter::once(Message::user().with_text(message)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::MessageContent;
    use crate::models::role::Role;
    use crate::models::tool::ToolCall;
    use crate::news::{NewsQuery, NewsSource, RawArticle, RawSource};
    use crate::providers::mock::MockProvider;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers every lookup with a fixed number of numbered articles
    struct FakeNews {
        count: usize,
        fail: bool,
        seen: Mutex<Vec<NewsQuery>>,
    }

    impl FakeNews {
        fn with_articles(count: usize) -> Arc<Self> {
            Arc::new(Self {
                count,
                fail: false,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                count: 0,
                fail: true,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl NewsSource for FakeNews {
        async fn fetch(&self, query: &NewsQuery, _page_size: u32) -> Result<Vec<RawArticle>> {
            self.seen.lock().unwrap().push(query.clone());
            if self.fail {
                return Err(anyhow!("news provider unreachable"));
            }
            let label = match query {
                NewsQuery::Search { query } => query.clone(),
                NewsQuery::Category { category, .. } => category.to_string(),
                NewsQuery::TopHeadlines { country } => country.clone(),
            };
            Ok((1..=self.count)
                .map(|i| RawArticle {
                    source: Some(RawSource {
                        id: None,
                        name: Some("Bernama".to_string()),
                    }),
                    title: Some(format!("{} story {}", label, i)),
                    url: Some(format!("https://example.com/{}/{}", label, i)),
                    ..Default::default()
                })
                .collect())
        }
    }

    fn agent(provider: &MockProvider, news: Arc<FakeNews>) -> NewsAgent {
        NewsAgent::new(Arc::new(provider.clone()), ArticleFetcher::new(news))
    }

    fn tool_call_response(calls: Vec<(&str, ToolCall)>) -> Message {
        calls
            .into_iter()
            .fold(Message::assistant(), |message, (id, call)| {
                message.with_tool_request(id, Ok(call))
            })
    }

    #[tokio::test]
    async fn test_direct_text_response() -> Result<()> {
        let provider = MockProvider::new(vec![Message::assistant().with_text("Hi! Ask me for news.")]);
        let news = FakeNews::with_articles(3);
        let agent = agent(&provider, news.clone());

        let reply = agent.handle("hello", &[]).await?;

        assert_eq!(reply.message, "Hi! Ask me for news.");
        assert_eq!(reply.reply_type, ReplyType::TextResponse);
        assert!(reply.articles.is_empty());
        assert_eq!(reply.full_message, None);

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_names, vec!["get_top_news".to_string()]);
        assert!(calls[0].system.contains("`sports`"));
        assert!(news.seen.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_single_tool_call_flow() -> Result<()> {
        let provider = MockProvider::new(vec![
            tool_call_response(vec![(
                "call_1",
                ToolCall::new(
                    "get_top_news",
                    json!({"location": "my", "category": "sports"}),
                ),
            )]),
            Message::assistant().with_text("Malaysian sport is busy this week with football and badminton."),
            Message::assistant().with_text("  Here are the latest sports stories from Malaysia!  "),
        ]);
        let news = FakeNews::with_articles(8);
        let agent = agent(&provider, news.clone());

        let reply = agent
            .handle("latest sports news in Malaysia", &[])
            .await?;

        assert_eq!(reply.reply_type, ReplyType::NewsWithArticles);
        assert_eq!(reply.message, "Here are the latest sports stories from Malaysia!");
        assert_eq!(
            reply.full_message.as_deref(),
            Some("Malaysian sport is busy this week with football and badminton.")
        );
        assert_eq!(reply.articles.len(), 5);
        assert!(reply.articles.iter().all(|a| a.location == "my"));
        assert_eq!(
            news.seen.lock().unwrap().as_slice(),
            &[NewsQuery::Category {
                country: "my".to_string(),
                category: NewsCategory::Sports
            }]
        );

        let calls = provider.calls();
        assert_eq!(calls.len(), 3);

        // Second call sees the tool call and its result but no tools
        let second = &calls[1];
        assert!(second.tool_names.is_empty());
        assert_eq!(second.messages.len(), 3);
        assert!(second.messages[1].has_tool_requests());
        assert_eq!(second.messages[2].role, Role::Tool);
        let response = second.messages[2].content[0].as_tool_response().unwrap();
        assert_eq!(response.id, "call_1");
        let sent: Vec<Article> = serde_json::from_str(response.tool_result.as_ref().unwrap())?;
        assert_eq!(sent, reply.articles);

        // Acknowledgment is an independent, capped exchange
        let third = &calls[2];
        assert_eq!(third.max_tokens, Some(ACKNOWLEDGMENT_MAX_TOKENS));
        assert_eq!(third.messages.len(), 1);
        let request = third.messages[0].text();
        assert!(request.contains("latest sports news in Malaysia"));
        assert!(request.contains("I found 5 article(s)"));
        assert!(third.system.contains("40 words"));
        Ok(())
    }

    #[tokio::test]
    async fn test_history_is_windowed() -> Result<()> {
        let provider = MockProvider::new(vec![Message::assistant().with_text("ok")]);
        let agent = agent(&provider, FakeNews::with_articles(1));

        let history: Vec<HistoryEntry> = (0..12)
            .map(|i| {
                if i % 2 == 0 {
                    HistoryEntry::user(format!("turn {}", i))
                } else {
                    HistoryEntry::assistant(format!("turn {}", i))
                }
            })
            .collect();

        agent.handle("and now?", &history).await?;

        let messages = &provider.calls()[0].messages;
        let texts: Vec<String> = messages.iter().map(Message::text).collect();
        assert_eq!(messages.len(), HISTORY_WINDOW + 1);
        assert!(!texts.contains(&"turn 0".to_string()));
        assert!(!texts.contains(&"turn 1".to_string()));
        assert_eq!(texts[0], "turn 2");
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(texts.last().map(String::as_str), Some("and now?"));
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_history_entries_are_dropped() -> Result<()> {
        let provider = MockProvider::new(vec![Message::assistant().with_text("ok")]);
        let agent = agent(&provider, FakeNews::with_articles(1));
        let history = vec![
            HistoryEntry::user("news in japan"),
            HistoryEntry::assistant("   "),
            HistoryEntry::assistant("Here you go"),
        ];

        agent.handle("thanks", &history).await?;

        let texts: Vec<String> = provider.calls()[0].messages.iter().map(Message::text).collect();
        assert_eq!(texts, vec!["news in japan", "Here you go", "thanks"]);
        Ok(())
    }

    #[test]
    fn test_history_entry_accepts_ai_alias() {
        let entry: HistoryEntry =
            serde_json::from_value(json!({"type": "ai", "content": "Hello"})).unwrap();
        assert_eq!(entry, HistoryEntry::assistant("Hello"));
        assert!(serde_json::from_value::<HistoryEntry>(json!({"type": "system", "content": "x"})).is_err());
    }

    #[tokio::test]
    async fn test_invalid_arguments_stop_the_request() {
        let provider = MockProvider::new(vec![tool_call_response(vec![(
            "call_1",
            ToolCall::new("get_top_news", json!({"location": "us", "category": "weather"})),
        )])]);
        let news = FakeNews::with_articles(3);
        let agent = agent(&provider, news.clone());

        let result = agent.handle("weather news", &[]).await;

        assert!(matches!(result, Err(AgentError::InvalidParameters(_))));
        assert_eq!(provider.calls().len(), 1);
        assert!(news.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_tool_call_stops_the_request() {
        let provider = MockProvider::new(vec![Message::assistant().with_tool_request(
            "call_1",
            Err(AgentError::InvalidParameters("not json".to_string())),
        )]);
        let agent = agent(&provider, FakeNews::with_articles(3));

        let result = agent.handle("news", &[]).await;
        assert_eq!(
            result,
            Err(AgentError::InvalidParameters("not json".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_gets_error_result() -> Result<()> {
        let provider = MockProvider::new(vec![
            tool_call_response(vec![(
                "call_9",
                ToolCall::new("get_weather", json!({"city": "Paris"})),
            )]),
            Message::assistant().with_text("I can only look up news."),
            Message::assistant().with_text("Sorry, no weather here."),
        ]);
        let agent = agent(&provider, FakeNews::with_articles(3));

        let reply = agent.handle("weather in paris", &[]).await?;

        assert_eq!(reply.reply_type, ReplyType::NewsWithArticles);
        assert!(reply.articles.is_empty());

        let second = &provider.calls()[1];
        match &second.messages[2].content[0] {
            MessageContent::ToolResponse(response) => {
                assert_eq!(response.id, "call_9");
                assert_eq!(
                    response.tool_result,
                    Err(AgentError::ToolNotFound("get_weather".to_string()))
                );
            }
            other => panic!("expected a tool response, got {:?}", other),
        }

        let acknowledgment = provider.calls()[2].messages[0].text();
        assert!(acknowledgment.contains("No articles were found"));
        Ok(())
    }

    #[tokio::test]
    async fn test_multiple_tool_calls_keep_last_articles() -> Result<()> {
        let provider = MockProvider::new(vec![
            tool_call_response(vec![
                (
                    "call_1",
                    ToolCall::new("get_top_news", json!({"location": "us", "category": "business"})),
                ),
                (
                    "call_2",
                    ToolCall::new("get_top_news", json!({"location": "gb", "query": "tesla"})),
                ),
            ]),
            Message::assistant().with_text("Business and Tesla coverage."),
            Message::assistant().with_text("Found some stories for you."),
        ]);
        let news = FakeNews::with_articles(2);
        let agent = agent(&provider, news.clone());

        let reply = agent.handle("business news and tesla", &[]).await?;

        assert_eq!(news.seen.lock().unwrap().len(), 2);
        assert_eq!(reply.articles.len(), 2);
        assert_eq!(reply.articles[0].title, "tesla story 1");
        assert_eq!(reply.articles[0].location, "gb");

        let tool_message = &provider.calls()[1].messages[2];
        assert_eq!(tool_message.content.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_degraded_fetch_still_replies() -> Result<()> {
        let provider = MockProvider::new(vec![
            tool_call_response(vec![("call_1", ToolCall::new("get_top_news", json!({})))]),
            Message::assistant().with_text("The news service is unavailable."),
            Message::assistant().with_text("I couldn't reach the news service."),
        ]);
        let news = FakeNews::failing();
        let agent = agent(&provider, news.clone());

        let reply = agent.handle("top headlines", &[]).await?;

        assert_eq!(reply.articles.len(), 1);
        assert_eq!(reply.articles[0].id, ERROR_ID);
        assert_eq!(
            news.seen.lock().unwrap()[0],
            NewsQuery::TopHeadlines {
                country: "us".to_string()
            }
        );

        let acknowledgment = provider.calls()[2].messages[0].text();
        assert!(acknowledgment.contains("lookup failed"));
        assert!(!acknowledgment.contains("I found"));
        Ok(())
    }

    #[tokio::test]
    async fn test_provider_failure_is_reported() {
        let provider = MockProvider::scripted(vec![
            Ok(tool_call_response(vec![(
                "call_1",
                ToolCall::new("get_top_news", json!({"location": "us"})),
            )])),
            Err("Request failed with status: 500 Internal Server Error".to_string()),
        ]);
        let agent = agent(&provider, FakeNews::with_articles(1));

        let result = agent.handle("news", &[]).await;

        match result {
            Err(AgentError::Provider(reason)) => assert!(reason.contains("500")),
            other => panic!("expected a provider error, got {:?}", other),
        }
        assert_eq!(provider.calls().len(), 2);
    }

    #[test]
    fn test_lookup_outcome_ignores_sentinels() {
        assert_eq!(LookupOutcome::of(&[]), LookupOutcome::NoResults);
        assert_eq!(
            LookupOutcome::of(&[Article::no_news("us")]),
            LookupOutcome::NoResults
        );
        assert_eq!(
            LookupOutcome::of(&[Article::error("us", "timeout")]),
            LookupOutcome::Failed
        );
        assert_eq!(
            serde_json::to_value(LookupOutcome::NoResults).unwrap(),
            json!("no_results")
        );
    }

    #[test]
    fn test_chat_reply_wire_format() {
        let text = serde_json::to_value(ChatReply::text("hi".to_string())).unwrap();
        assert_eq!(text, json!({"message": "hi", "articles": [], "type": "text_response"}));

        let news = serde_json::to_value(ChatReply::news(
            "short".to_string(),
            "long".to_string(),
            vec![],
        ))
        .unwrap();
        assert_eq!(news["type"], "news_with_articles");
        assert_eq!(news["full_message"], "long");
    }
}
