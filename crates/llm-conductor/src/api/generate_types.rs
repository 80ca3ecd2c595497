// api/generate_types.rs — GenerateTextResult and GenerationStep (Layer 4).
//
// These live in the engine crate, not the types crate, because they change
// with the high-level API rather than with the provider contract.

use serde::{Deserialize, Serialize};

use llm_conductor_types::{Error, FinishReason, Message, ToolCall, ToolResult, Usage};

/// One provider request/response round in a multi-step generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStep {
    pub index: usize,
    pub text: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// Filled in after the step's tool calls have run.
    #[serde(default)]
    pub tool_results: Vec<ToolResult>,
    pub usage: Usage,
    pub finish_reason: FinishReason,
}

/// Result of `generate_text()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateTextResult {
    /// Text of the last step.
    pub text: String,
    /// Sum of every step's usage.
    pub usage: Usage,
    /// Finish reason of the last step.
    pub finish_reason: FinishReason,
    pub steps: Vec<GenerationStep>,
    /// Full history: the input messages plus every assistant and tool message appended.
    pub messages: Vec<Message>,
}

impl GenerateTextResult {
    /// Build the result from the step list. Fails if `steps` is empty.
    #[allow(clippy::result_large_err)]
    pub fn from_steps(steps: Vec<GenerationStep>, messages: Vec<Message>) -> Result<Self, Error> {
        let Some(last) = steps.last() else {
            return Err(Error::invalid_input("from_steps requires at least one step"));
        };
        Ok(Self {
            text: last.text.clone(),
            finish_reason: last.finish_reason,
            usage: steps.iter().map(|s| s.usage).sum(),
            steps,
            messages,
        })
    }

    /// Every tool result across all steps, in execution order.
    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.steps.iter().flat_map(|s| s.tool_results.iter())
    }
}

/// Result of `generate_object()`: the decoded object plus the underlying text result.
#[derive(Debug, Clone)]
pub struct GenerateObjectResult<T> {
    pub object: T,
    pub usage: Usage,
    pub finish_reason: FinishReason,
    pub text: GenerateTextResult,
}
