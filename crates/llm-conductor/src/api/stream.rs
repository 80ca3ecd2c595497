// api/stream.rs — stream_text() + StreamResult (Layer 4).
//
// Wraps a provider's delta stream with usage accrual. Deltas are forwarded
// immediately, unmodified and in producer order.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::StreamExt;
use futures_core::Stream;
use llm_conductor_types::*;

use crate::usage::UsageSession;
use crate::util::stream_lifecycle::StreamLifecycle;

use super::types::GenerateOptions;

/// Approximate token count for streamed output: `ceil(chars / 4)`, at least 1
/// for non-empty text.
pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count();
    if chars == 0 {
        return 0;
    }
    u32::try_from(chars.div_ceil(4)).unwrap_or(u32::MAX).max(1)
}

/// The streaming generation function. Single request, no tool loop.
///
/// Tool definitions are sent to the provider and tool calls surface as
/// `ToolCall` deltas, but nothing is executed. On `Done` one usage record is
/// written with the estimated output tokens and the reported input tokens
/// and cost. A stream error ends the usage session and is yielded as the
/// final item.
///
/// Dropping the returned stream drops the provider stream and closes the
/// usage session.
///
/// # Errors
/// `InvalidInput` if a tool definition is invalid. Nothing is sent in that case.
pub fn stream_text<'a>(
    provider: &'a dyn Provider,
    options: GenerateOptions,
) -> Result<StreamResult<'a>, Error> {
    options.validate_tools()?;

    let request = ProviderRequest::new(options.messages.clone())
        .tools(options.tool_definitions())
        .settings(options.settings.clone());
    let tracker = options.usage_tracker.clone();
    let model = provider.model_id().to_string();

    let deltas = async_stream::stream! {
        let mut session = UsageSession::start(tracker, model);
        let mut lifecycle = StreamLifecycle::new();
        let mut estimated_output: u32 = 0;
        let mut raw = provider.stream(request);

        while let Some(item) = raw.next().await {
            let delta = match item {
                Ok(delta) => delta,
                Err(e) => {
                    tracing::warn!(session = %session.id(), error = %e, "text stream failed");
                    session.end();
                    yield Err(e);
                    return;
                }
            };

            lifecycle.observe(&delta);
            match &delta {
                TextStreamDelta::TextDelta { text } => {
                    estimated_output = estimated_output.saturating_add(estimate_tokens(text));
                }
                TextStreamDelta::ToolCall { tool_call } => {
                    let arguments = serde_json::to_string(&tool_call.arguments).unwrap_or_default();
                    estimated_output = estimated_output.saturating_add(estimate_tokens(&arguments));
                }
                TextStreamDelta::Done { usage, .. } => {
                    if !session.is_recorded() {
                        let reported = usage.unwrap_or_default();
                        let usage = Usage {
                            input_tokens: reported.input_tokens,
                            output_tokens: estimated_output,
                            cost: reported.cost,
                        };
                        tracing::debug!(
                            session = %session.id(),
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            "stream finished"
                        );
                        session.record(&usage, OperationKind::TextStreaming);
                    }
                }
            }
            yield Ok(delta);
        }

        lifecycle.end();
        tracing::debug!(
            session = %session.id(),
            finished = lifecycle.is_finished(),
            late_deltas = lifecycle.late_deltas(),
            "text stream closed"
        );
    };

    Ok(StreamResult::new(Box::pin(deltas)))
}

/// Result of a streaming generation.
///
/// Implements `Stream<Item = Result<TextStreamDelta, Error>>`. Accessors
/// report what has been observed so far.
pub struct StreamResult<'a> {
    inner: BoxStream<'a, Result<TextStreamDelta, Error>>,
    text: String,
    tool_calls: Vec<ToolCall>,
    usage: Option<Usage>,
    finish_reason: Option<FinishReason>,
    finished: bool,
}

impl<'a> StreamResult<'a> {
    pub(crate) fn new(inner: BoxStream<'a, Result<TextStreamDelta, Error>>) -> Self {
        Self {
            inner,
            text: String::new(),
            tool_calls: Vec::new(),
            usage: None,
            finish_reason: None,
            finished: false,
        }
    }

    /// Concatenated text deltas.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.tool_calls
    }

    /// Usage carried by the `Done` delta, as reported by the provider.
    pub fn usage(&self) -> Option<Usage> {
        self.usage
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    /// Whether `Done` was observed or the stream ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// A filtered stream that yields only text delta strings.
    ///
    /// Borrows `self` mutably, so the accessors stay available afterwards.
    pub fn text_stream(&mut self) -> TextDeltaStream<'_, 'a> {
        TextDeltaStream { inner: self }
    }

    fn observe(&mut self, delta: &TextStreamDelta) {
        match delta {
            TextStreamDelta::TextDelta { text } => self.text.push_str(text),
            TextStreamDelta::ToolCall { tool_call } => self.tool_calls.push(tool_call.clone()),
            TextStreamDelta::Done {
                usage,
                finish_reason,
            } => {
                if !self.finished {
                    self.usage = *usage;
                    self.finish_reason = Some(*finish_reason);
                    self.finished = true;
                }
            }
        }
    }
}

impl std::fmt::Debug for StreamResult<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamResult")
            .field("text", &self.text)
            .field("tool_calls", &self.tool_calls)
            .field("usage", &self.usage)
            .field("finish_reason", &self.finish_reason)
            .field("finished", &self.finished)
            .finish()
    }
}

// StreamResult is Unpin: every field is Unpin, including the boxed stream.
impl Stream for StreamResult<'_> {
    type Item = Result<TextStreamDelta, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(delta))) => {
                this.observe(&delta);
                Poll::Ready(Some(Ok(delta)))
            }
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
            Poll::Ready(None) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Text-only view over a [`StreamResult`].
pub struct TextDeltaStream<'b, 'a: 'b> {
    inner: &'b mut StreamResult<'a>,
}

impl<'b, 'a: 'b> Stream for TextDeltaStream<'b, 'a> {
    type Item = Result<String, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match Pin::new(&mut *this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(TextStreamDelta::TextDelta { text }))) => {
                    return Poll::Ready(Some(Ok(text)));
                }
                Poll::Ready(Some(Ok(_))) => continue,
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
