use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON schema type of a tool parameter. Every argument the model sends is a string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
}

/// A single named argument a tool accepts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolParameter {
    pub name: String,
    pub kind: ParameterType,
    pub description: String,
    /// When set, the model may only pass one of these values
    pub allowed_values: Option<Vec<String>>,
    pub required: bool,
}

impl ToolParameter {
    pub fn required<N, D>(name: N, kind: ParameterType, description: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        ToolParameter {
            name: name.into(),
            kind,
            description: description.into(),
            allowed_values: None,
            required: true,
        }
    }

    pub fn optional<N, D>(name: N, kind: ParameterType, description: D) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        ToolParameter {
            required: false,
            ..Self::required(name, kind, description)
        }
    }

    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// A tool that can be used by a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// Parameters that the tool accepts
    pub parameters: Vec<ToolParameter>,
}

impl Tool {
    /// Create a new tool with the given name and description
    pub fn new<N, D>(name: N, description: D, parameters: Vec<ToolParameter>) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// The JSON schema object describing the parameters
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for parameter in &self.parameters {
            let mut property = json!({
                "type": parameter.kind,
                "description": parameter.description,
            });
            if let Some(values) = &parameter.allowed_values {
                property["enum"] = json!(values);
            }
            properties.insert(parameter.name.clone(), property);
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|parameter| parameter.required)
            .map(|parameter| parameter.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// A tool call request issued by the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// The name of the tool to execute
    pub name: String,
    /// The decoded arguments for the execution
    pub arguments: Value,
}

impl ToolCall {
    pub fn new<S: Into<String>>(name: S, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}
