// Message normalization against a provider profile.
//
// Order is fixed: check tool-result correlation, fold system messages, merge
// same-role runs, then strip or validate images. Input messages are never mutated.

use std::collections::HashSet;

use llm_conductor_types::{ContentPart, Error, Message, ProviderConfiguration, Role};

use super::image::validate_image;

/// Prefix applied to system text folded into a user message.
pub const SYSTEM_PREFIX: &str = "System: ";

/// Normalize a conversation for a backend described by `config`.
pub fn normalize_messages(
    messages: &[Message],
    config: &ProviderConfiguration,
    supports_vision: bool,
) -> Result<Vec<Message>, Error> {
    check_tool_results(messages)?;

    let mut normalized: Vec<Message> = if config.supports_system_role {
        messages.to_vec()
    } else {
        messages.iter().map(fold_system_message).collect()
    };

    if config.requires_alternating_roles {
        normalized = merge_consecutive_roles(normalized);
    }

    if supports_vision {
        for message in &normalized {
            for part in &message.content {
                if let ContentPart::Image { image } = part {
                    validate_image(image, config)?;
                }
            }
        }
    } else {
        for message in &mut normalized {
            message.content.retain(|part| !part.is_image());
        }
    }

    Ok(normalized)
}

/// Every tool result must answer a tool call issued by an earlier assistant message.
fn check_tool_results(messages: &[Message]) -> Result<(), Error> {
    let mut issued: HashSet<&str> = HashSet::new();
    for message in messages {
        for result in message.tool_results() {
            if !issued.contains(result.tool_call_id.as_str()) {
                return Err(Error::invalid_input(format!(
                    "tool result '{}' does not match any earlier tool call",
                    result.tool_call_id
                )));
            }
        }
        if message.role == Role::Assistant {
            issued.extend(message.tool_calls().into_iter().map(|c| c.id.as_str()));
        }
    }
    Ok(())
}

/// A system message becomes a user message whose text carries the `System: ` prefix.
fn fold_system_message(message: &Message) -> Message {
    if message.role != Role::System {
        return message.clone();
    }
    let mut content = vec![ContentPart::text(format!("{SYSTEM_PREFIX}{}", message.text()))];
    content.extend(
        message
            .content
            .iter()
            .filter(|p| !matches!(p, ContentPart::Text { .. }))
            .cloned(),
    );
    Message {
        role: Role::User,
        content,
        ..message.clone()
    }
}

/// Merge runs of same-role messages, keeping the first message's id, timestamp and metadata.
fn merge_consecutive_roles(messages: Vec<Message>) -> Vec<Message> {
    let mut merged: Vec<Message> = Vec::with_capacity(messages.len());
    for message in messages {
        match merged.last_mut() {
            Some(previous) if previous.role == message.role => {
                previous.content.extend(message.content);
            }
            _ => merged.push(message),
        }
    }
    merged
}
