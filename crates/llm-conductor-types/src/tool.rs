use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Tool definition sent to the provider (serializable subset, no execute handler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the arguments object.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Validate the tool name (`[a-zA-Z][a-zA-Z0-9_-]{0,63}`) and that the
    /// parameter schema is an object schema.
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.is_empty() || self.name.len() > 64 {
            return Err(Error::invalid_input(format!(
                "Tool name '{}' must be 1-64 characters",
                self.name
            )));
        }
        let valid = self.name.chars().enumerate().all(|(i, c)| {
            if i == 0 {
                c.is_ascii_alphabetic()
            } else {
                c.is_ascii_alphanumeric() || c == '_' || c == '-'
            }
        });
        if !valid {
            return Err(Error::invalid_input(format!(
                "Tool name '{}' must match [a-zA-Z][a-zA-Z0-9_-]{{0,63}}",
                self.name
            )));
        }

        match self.parameters.as_object() {
            Some(obj) if obj.get("type").and_then(|v| v.as_str()) == Some("object") => Ok(()),
            Some(_) => Err(Error::invalid_input(format!(
                "Tool '{}' parameters must have \"type\": \"object\" at root",
                self.name
            ))),
            None => Err(Error::invalid_input(format!(
                "Tool '{}' parameters must be a JSON object",
                self.name
            ))),
        }
    }
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Outcome of a single tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { value: serde_json::Value },
    Error { message: String },
}

/// Result of a tool execution, sent back to the provider in a `tool` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn success(tool_call_id: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            outcome: ToolOutcome::Success { value },
        }
    }

    pub fn error(tool_call_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            outcome: ToolOutcome::Error {
                message: message.into(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Error { .. })
    }
}
