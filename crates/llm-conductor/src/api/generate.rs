// api/generate.rs — generate_text() multi-step orchestrator (Layer 4).
//
// Issues a request, executes requested tools, folds their results into the
// history and decides whether to continue, up to `max_steps` requests.

use llm_conductor_types::*;

use crate::usage::UsageSession;

use super::generate_types::{GenerateTextResult, GenerationStep};
use super::tool_loop::execute_tool_calls;
use super::types::GenerateOptions;

/// The non-streaming multi-step generation function.
///
/// Each iteration sends the running history to `provider`, appends the
/// assistant message, executes any requested tool calls in order and appends
/// one `tool` message per result. The loop ends when a step requests no tool
/// calls, when a step's finish reason is neither `stop` nor `tool_calls`, or
/// after `max_steps` requests. Exhausting `max_steps` is not an error.
///
/// Provider errors abort the loop and propagate unchanged. Tool failures are
/// folded into the history as error results.
///
/// # Errors
/// `InvalidInput` if `max_steps` is 0 or a tool definition is invalid, plus
/// whatever the provider returns.
pub async fn generate_text(
    provider: &dyn Provider,
    options: GenerateOptions,
) -> Result<GenerateTextResult, Error> {
    if options.max_steps == 0 {
        return Err(Error::invalid_input("max_steps must be at least 1"));
    }
    options.validate_tools()?;

    let tool_definitions = options.tool_definitions();
    let has_images = options.messages.iter().any(Message::has_images);
    let GenerateOptions {
        messages,
        tools,
        settings,
        max_steps,
        usage_tracker,
    } = options;

    let mut session = UsageSession::start(usage_tracker, provider.model_id());
    let mut conversation = messages;
    let mut steps: Vec<GenerationStep> = Vec::new();
    let mut total_usage = Usage::default();
    let mut executed_tools = false;

    for index in 0..max_steps {
        let request = ProviderRequest::new(conversation.clone())
            .tools(tool_definitions.clone())
            .settings(settings.clone());

        let response = match provider.generate(request).await {
            Ok(response) => response,
            Err(e) => {
                if !steps.is_empty() {
                    session.record(&total_usage, operation_kind(executed_tools, has_images));
                }
                return Err(e);
            }
        };

        let finish_reason = response.effective_finish_reason();
        let usage = response.usage.unwrap_or_default();
        let tool_calls = response.tool_calls.unwrap_or_default();
        total_usage += usage;

        tracing::debug!(
            step = index,
            finish_reason = ?finish_reason,
            tool_calls = tool_calls.len(),
            "generation step completed"
        );

        conversation.push(Message::assistant_with_tool_calls(
            response.text.clone(),
            tool_calls.clone(),
        ));
        steps.push(GenerationStep {
            index,
            text: response.text,
            tool_calls: tool_calls.clone(),
            tool_results: Vec::new(),
            usage,
            finish_reason,
        });

        if tool_calls.is_empty() {
            break;
        }

        let results = execute_tool_calls(&tools, &tool_calls).await;
        executed_tools |= !results.is_empty();
        conversation.extend(results.iter().cloned().map(Message::tool_result));
        if let Some(step) = steps.last_mut() {
            step.tool_results = results;
        }

        if !finish_reason.is_continuable() {
            break;
        }
    }

    session.record(&total_usage, operation_kind(executed_tools, has_images));

    let result = GenerateTextResult::from_steps(steps, conversation)?;
    tracing::info!(
        steps = result.steps.len(),
        total_tokens = result.usage.total_tokens(),
        finish_reason = ?result.finish_reason,
        "generation finished"
    );
    Ok(result)
}

fn operation_kind(executed_tools: bool, has_images: bool) -> OperationKind {
    if executed_tools {
        OperationKind::ToolCall
    } else if has_images {
        OperationKind::ImageAnalysis
    } else {
        OperationKind::TextGeneration
    }
}
