//! Shared fixtures for the integration tests: a scripted provider and tool builders.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use llm_conductor::{
    BoxFuture, BoxStream, Error, FinishReason, Provider, ProviderCapabilities, ProviderRequest,
    ProviderResponse, TextStreamDelta, Tool, ToolCall, Usage,
};
use serde_json::{json, Value};

/// Replays scripted responses and delta streams in order and records every request.
pub struct ScriptedProvider {
    model_id: String,
    capabilities: ProviderCapabilities,
    responses: Mutex<VecDeque<Result<ProviderResponse, Error>>>,
    streams: Mutex<VecDeque<Vec<Result<TextStreamDelta, Error>>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            capabilities: ProviderCapabilities::all(),
            responses: Mutex::new(VecDeque::new()),
            streams: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn capabilities(mut self, capabilities: ProviderCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn respond(self, response: ProviderResponse) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail(self, error: Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn stream_script(self, items: Vec<Result<TextStreamDelta, Error>>) -> Self {
        self.streams.lock().unwrap().push_back(items);
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Provider for ScriptedProvider {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    fn generate(&self, request: ProviderRequest) -> BoxFuture<'_, Result<ProviderResponse, Error>> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        Box::pin(async move { next.unwrap_or_else(|| Err(Error::invalid_input("script exhausted"))) })
    }

    fn stream(&self, request: ProviderRequest) -> BoxStream<'_, Result<TextStreamDelta, Error>> {
        self.requests.lock().unwrap().push(request);
        let items = self.streams.lock().unwrap().pop_front().unwrap_or_default();
        Box::pin(futures::stream::iter(items))
    }
}

pub fn say(text: &str, usage: Usage) -> ProviderResponse {
    ProviderResponse::text(text)
        .with_usage(usage)
        .with_finish_reason(FinishReason::Stop)
}

pub fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
    let arguments = match arguments {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    ToolCall::new(id, name, arguments)
}

pub fn request_tools(calls: Vec<ToolCall>, usage: Usage) -> ProviderResponse {
    ProviderResponse::text("")
        .with_usage(usage)
        .with_tool_calls(calls)
        .with_finish_reason(FinishReason::ToolCalls)
}

/// `get_weather(city)` returning a fixed forecast.
pub fn weather_tool() -> Tool {
    Tool::new(
        "get_weather",
        "Current weather for a city",
        json!({
            "type": "object",
            "properties": {"city": {"type": "string"}},
            "required": ["city"]
        }),
        |args| {
            Box::pin(async move {
                let city = args
                    .get("city")
                    .and_then(Value::as_str)
                    .unwrap_or("nowhere")
                    .to_string();
                Ok(json!({"city": city, "forecast": "sunny", "celsius": 21}))
            })
        },
    )
}

/// A tool whose handler always fails.
pub fn broken_tool() -> Tool {
    Tool::new("broken", "Always fails", json!({"type": "object"}), |_| {
        Box::pin(async { Err("database unavailable".into()) })
    })
}

pub fn shared(provider: ScriptedProvider) -> Arc<ScriptedProvider> {
    Arc::new(provider)
}
