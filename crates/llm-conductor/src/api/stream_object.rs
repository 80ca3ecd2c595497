// api/stream_object.rs — stream_object() function (Layer 4).
//
// Structured streaming: accumulates text deltas from stream_text() and emits
// a decoded partial object whenever the repaired buffer yields a new value.

use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;

use llm_conductor_types::*;

use crate::util::partial_json::{parse_complete_value, parse_partial_value};

use super::stream::stream_text;
use super::types::GenerateOptions;

/// Stream of object deltas produced by [`stream_object`].
pub type ObjectStream<'a, T> = BoxStream<'a, Result<ObjectStreamDelta<T>, Error>>;

/// Stream a structured object.
///
/// Emits `Start` on the first text, then `Partial` each time the repaired
/// buffer decodes to a value different from the previous partial, then
/// `Complete` and `Done` once the underlying stream finishes. Usage is
/// accrued exactly as in `stream_text()`.
///
/// Tool-call deltas are ignored. Deltas after `Done` are still buffered.
///
/// # Errors
/// Returns `InvalidInput` immediately if a tool definition is invalid. The
/// stream yields `InvalidInput` if no object can be decoded at the end, and
/// propagates provider stream errors.
pub fn stream_object<'a, T>(
    provider: &'a dyn Provider,
    options: GenerateOptions,
    schema: Option<Value>,
) -> Result<ObjectStream<'a, T>, Error>
where
    T: DeserializeOwned + Send + 'a,
{
    let format = match schema {
        Some(schema) => OutputFormat::json_schema(schema),
        None => OutputFormat::json(),
    };
    let mut deltas = stream_text(provider, options.output_format(format))?;

    Ok(Box::pin(async_stream::stream! {
        let mut buffer = String::new();
        let mut started = false;
        let mut last_partial: Option<Value> = None;
        let mut finish: Option<(Option<Usage>, FinishReason)> = None;

        while let Some(item) = deltas.next().await {
            match item {
                Err(e) => {
                    yield Err(e);
                    return;
                }
                Ok(TextStreamDelta::TextDelta { text }) => {
                    if text.is_empty() {
                        continue;
                    }
                    if !started {
                        started = true;
                        yield Ok(ObjectStreamDelta::Start);
                    }
                    buffer.push_str(&text);

                    let Some(value) = parse_partial_value(&buffer) else {
                        continue;
                    };
                    if last_partial.as_ref() == Some(&value) {
                        continue;
                    }
                    if let Ok(object) = serde_json::from_value::<T>(value.clone()) {
                        last_partial = Some(value);
                        yield Ok(ObjectStreamDelta::Partial { object });
                    }
                }
                Ok(TextStreamDelta::ToolCall { .. }) => {}
                Ok(TextStreamDelta::Done { usage, finish_reason }) => {
                    if finish.is_none() {
                        finish = Some((usage, finish_reason));
                    }
                }
            }
        }

        let complete = parse_complete_value(&buffer)
            .and_then(|value| serde_json::from_value::<T>(value).ok())
            .or_else(|| last_partial.and_then(|value| serde_json::from_value::<T>(value).ok()));
        match complete {
            Some(object) => {
                yield Ok(ObjectStreamDelta::Complete { object });
                let (usage, finish_reason) = finish.unwrap_or((None, FinishReason::Other));
                yield Ok(ObjectStreamDelta::Done { usage, finish_reason });
            }
            None => {
                tracing::warn!(buffered = buffer.len(), "object stream ended without a decodable object");
                yield Err(Error::invalid_input("failed to parse complete object from stream"));
            }
        }
    }))
}
