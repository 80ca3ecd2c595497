// MockProvider — scripted provider for unit tests and downstream test suites.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use llm_conductor_types::{
    BoxFuture, BoxStream, Error, FinishReason, Provider, ProviderCapabilities, ProviderRequest,
    ProviderResponse, TextStreamDelta, ToolCall, Usage,
};

/// A stopping response with the given text and usage.
pub fn text_response(text: &str, usage: Usage) -> ProviderResponse {
    ProviderResponse::text(text)
        .with_usage(usage)
        .with_finish_reason(FinishReason::Stop)
}

/// A response requesting the given tool calls.
pub fn tool_call_response(tool_calls: Vec<ToolCall>, usage: Usage) -> ProviderResponse {
    ProviderResponse::text("")
        .with_usage(usage)
        .with_tool_calls(tool_calls)
        .with_finish_reason(FinishReason::ToolCalls)
}

/// A tool call with JSON-object arguments. Non-object values yield empty arguments.
pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
    let arguments = match arguments {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    ToolCall::new(id, name, arguments)
}

/// Split text into one `TextDelta` per piece followed by `Done`.
pub fn text_deltas(pieces: &[&str], usage: Option<Usage>) -> Vec<TextStreamDelta> {
    let mut deltas: Vec<TextStreamDelta> = pieces.iter().map(|p| TextStreamDelta::text(*p)).collect();
    deltas.push(TextStreamDelta::done(usage, FinishReason::Stop));
    deltas
}

/// A provider that replays queued responses and delta streams in FIFO order.
pub struct MockProvider {
    model_id: String,
    base_url: Option<String>,
    capabilities: ProviderCapabilities,
    responses: Mutex<VecDeque<Result<ProviderResponse, Error>>>,
    streams: Mutex<VecDeque<Vec<Result<TextStreamDelta, Error>>>>,
    recorded: Mutex<Vec<ProviderRequest>>,
    call_count: AtomicUsize,
    stream_delay: Option<Duration>,
}

impl MockProvider {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            base_url: None,
            capabilities: ProviderCapabilities::all(),
            responses: Mutex::new(VecDeque::new()),
            streams: Mutex::new(VecDeque::new()),
            recorded: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            stream_delay: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_capabilities(mut self, capabilities: ProviderCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Queue a response for the next `generate()` call.
    pub fn with_response(self, response: ProviderResponse) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue an error for the next `generate()` call.
    pub fn with_error(self, error: Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queue a delta sequence for the next `stream()` call.
    pub fn with_stream(self, deltas: Vec<TextStreamDelta>) -> Self {
        let items = deltas.into_iter().map(Ok).collect();
        self.streams.lock().unwrap().push_back(items);
        self
    }

    /// Queue a raw item sequence (may include errors) for the next `stream()` call.
    pub fn with_stream_items(self, items: Vec<Result<TextStreamDelta, Error>>) -> Self {
        self.streams.lock().unwrap().push_back(items);
        self
    }

    /// Sleep before each streamed item. Pair with `tokio::time::pause()`.
    pub fn with_stream_delay(mut self, delay: Duration) -> Self {
        self.stream_delay = Some(delay);
        self
    }

    /// Number of `generate()` calls so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every request seen by `generate()` or `stream()`, in order.
    pub fn recorded_requests(&self) -> Vec<ProviderRequest> {
        self.recorded.lock().unwrap().clone()
    }
}

impl Provider for MockProvider {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    fn generate(&self, request: ProviderRequest) -> BoxFuture<'_, Result<ProviderResponse, Error>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.recorded.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        Box::pin(async move {
            next.unwrap_or_else(|| Err(Error::invalid_input("MockProvider: no responses queued")))
        })
    }

    fn stream(&self, request: ProviderRequest) -> BoxStream<'_, Result<TextStreamDelta, Error>> {
        self.recorded.lock().unwrap().push(request);
        let items = self.streams.lock().unwrap().pop_front().unwrap_or_default();
        let delay = self.stream_delay;
        Box::pin(async_stream::stream! {
            for item in items {
                if let Some(d) = delay {
                    tokio::time::sleep(d).await;
                }
                yield item;
            }
        })
    }
}
