// api/tool_loop.rs — tool execution for one generation step (Layer 4).
//
// Calls run strictly sequentially in issuing order. Failures never escape:
// argument validation errors and handler errors become error ToolResults.
// Calls naming an unknown tool are skipped and produce no result.

use llm_conductor_types::{Error, ToolCall, ToolResult};
use serde_json::Value;

use super::types::Tool;

/// Validate arguments against a tool's parameter schema.
/// Returns Ok(()) if valid, Err(error_message) if invalid.
fn validate_arguments(schema: &Value, args: &Value) -> Result<(), String> {
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| format!("invalid parameter schema: {e}"))?;
    let first_error = validator.iter_errors(args).next().map(|e| e.to_string());
    match first_error {
        None => Ok(()),
        Some(error) => Err(format!("invalid arguments: {error}")),
    }
}

/// Execute a single call against its tool. Never fails.
async fn execute_one(tool: &Tool, call: &ToolCall) -> ToolResult {
    let args = Value::Object(call.arguments.clone());
    let outcome = match validate_arguments(&tool.definition.parameters, &args) {
        Ok(()) => (tool.execute)(call.arguments.clone())
            .await
            .map_err(|e| Error::tool_execution(&call.name, e.to_string())),
        Err(message) => Err(Error::tool_execution(&call.name, message)),
    };

    match outcome {
        Ok(value) => ToolResult::success(&call.id, value),
        Err(error) => {
            tracing::warn!(
                tool = %call.name,
                call_id = %call.id,
                error = %error,
                "tool call failed"
            );
            ToolResult::error(&call.id, error.message())
        }
    }
}

/// Execute every call in order, returning one result per call that named a known tool.
pub async fn execute_tool_calls(tools: &[Tool], calls: &[ToolCall]) -> Vec<ToolResult> {
    let mut results = Vec::with_capacity(calls.len());
    for call in calls {
        let Some(tool) = tools.iter().find(|t| t.definition.name == call.name) else {
            tracing::debug!(tool = %call.name, call_id = %call.id, "skipping call to unknown tool");
            continue;
        };
        results.push(execute_one(tool, call).await);
    }
    results
}
