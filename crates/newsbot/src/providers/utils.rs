use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::base::Usage;
use crate::errors::AgentError;
use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

lazy_static! {
    static ref INVALID_NAME_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    static ref VALID_NAME: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role
        });

        let mut output = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.text.is_empty() {
                        converted["content"] = json!(text.text);
                    }
                }
                MessageContent::ToolRequest(request) => match &request.tool_call {
                    Ok(tool_call) => {
                        let sanitized_name = sanitize_function_name(&tool_call.name);
                        let tool_calls = converted
                            .as_object_mut()
                            .unwrap()
                            .entry("tool_calls")
                            .or_insert(json!([]));

                        tool_calls.as_array_mut().unwrap().push(json!({
                            "id": request.id,
                            "type": "function",
                            "function": {
                                "name": sanitized_name,
                                "arguments": tool_call.arguments.to_string(),
                            }
                        }));
                    }
                    Err(e) => {
                        output.push(json!({
                            "role": "tool",
                            "content": format!("Error: {}", e),
                            "tool_call_id": request.id
                        }));
                    }
                },
                MessageContent::ToolResponse(response) => match &response.tool_result {
                    Ok(result) => {
                        output.push(json!({
                            "role": "tool",
                            "content": result,
                            "tool_call_id": response.id
                        }));
                    }
                    Err(e) => {
                        // A tool result error is shown as output so the model can interpret the error message
                        output.push(json!({
                            "role": "tool",
                            "content": format!("The tool call returned the following error:\n{}", e),
                            "tool_call_id": response.id
                        }));
                    }
                },
            }
        }

        if converted.get("content").is_some() || converted.get("tool_calls").is_some() {
            output.insert(0, converted);
        }
        messages_spec.extend(output);
    }

    messages_spec
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema(),
            }
        }));
    }

    Ok(result)
}

/// Build a chat completion payload. The system prompt always comes first.
pub fn create_request_payload(
    model: Option<&str>,
    system: &str,
    messages: &[Message],
    tools: &[Tool],
    temperature: Option<f32>,
    max_tokens: Option<i32>,
) -> Result<Value> {
    let mut messages_array = vec![json!({
        "role": "system",
        "content": system
    })];
    messages_array.extend(messages_to_openai_spec(messages));

    let mut payload = json!({
        "messages": messages_array
    });
    let object = payload
        .as_object_mut()
        .ok_or_else(|| anyhow!("payload is not an object"))?;

    if let Some(model) = model {
        object.insert("model".to_string(), json!(model));
    }
    if !tools.is_empty() {
        object.insert("tools".to_string(), json!(tools_to_openai_spec(tools)?));
        object.insert("tool_choice".to_string(), json!("auto"));
    }
    if let Some(temp) = temperature {
        object.insert("temperature".to_string(), json!(temp));
    }
    if let Some(tokens) = max_tokens {
        object.insert("max_tokens".to_string(), json!(tokens));
    }

    Ok(payload)
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: Value) -> Result<Message> {
    let original = response["choices"][0]["message"].clone();
    if original.is_null() {
        return Err(anyhow!("No message in completion response: {}", response));
    }
    let mut content = Vec::new();

    if let Some(text) = original.get("content") {
        if let Some(text_str) = text.as_str() {
            content.push(MessageContent::text(text_str));
        }
    }

    if let Some(tool_calls) = original.get("tool_calls") {
        if let Some(tool_calls_array) = tool_calls.as_array() {
            for tool_call in tool_calls_array {
                let id = tool_call["id"].as_str().unwrap_or_default().to_string();
                let function_name = tool_call["function"]["name"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let arguments = tool_call["function"]["arguments"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();

                if !is_valid_function_name(&function_name) {
                    let error = AgentError::ToolNotFound(format!(
                        "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
                        function_name
                    ));
                    content.push(MessageContent::tool_request(id, Err(error)));
                } else {
                    match serde_json::from_str::<Value>(&arguments) {
                        Ok(params) => {
                            content.push(MessageContent::tool_request(
                                id,
                                Ok(ToolCall::new(&function_name, params)),
                            ));
                        }
                        Err(e) => {
                            let error = AgentError::InvalidParameters(format!(
                                "Could not interpret tool use parameters for id {}: {}",
                                id, e
                            ));
                            content.push(MessageContent::tool_request(id, Err(error)));
                        }
                    }
                }
            }
        }
    }

    Ok(Message {
        role: Role::Assistant,
        created: chrono::Utc::now().timestamp(),
        content,
    })
}

/// Read token usage from a completion response; absent fields stay `None`
pub fn get_usage(data: &Value) -> Usage {
    let Some(usage) = data.get("usage") else {
        return Usage::default();
    };

    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

fn sanitize_function_name(name: &str) -> String {
    INVALID_NAME_CHARS.replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    VALID_NAME.is_match(name)
}

#[derive(Debug, thiserror::Error)]
#[error("Context length exceeded. Message: {0}")]
pub struct ContextLengthExceededError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<ContextLengthExceededError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(ContextLengthExceededError(message))
    } else {
        None
    }
}

/// Error for a non-success completion response. A context length failure in
/// the body keeps its own type so callers can downcast to it.
pub fn openai_error_from_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(err) = check_openai_context_length_error(&value["error"]) {
            return err.into();
        }
    }

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        anyhow!("Server error: {}", status)
    } else {
        anyhow!("Request failed: {}\nResponse: {}", status, body)
    }
}
