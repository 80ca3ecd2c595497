// Provider trait — the capability-typed contract every backend satisfies.

use std::future::Future;
use std::pin::Pin;

use futures_core::Stream;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::request::ProviderRequest;
use crate::response::ProviderResponse;
use crate::stream::TextStreamDelta;

/// A boxed future that is Send.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A boxed stream that is Send.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Static boolean facts about a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    pub supports_streaming: bool,
    pub supports_tools: bool,
    pub supports_vision: bool,
    pub supports_json_mode: bool,
}

impl ProviderCapabilities {
    /// Everything on.
    pub fn all() -> Self {
        Self {
            supports_streaming: true,
            supports_tools: true,
            supports_vision: true,
            supports_json_mode: true,
        }
    }

    /// Plain text generation only.
    pub fn text_only() -> Self {
        Self {
            supports_streaming: false,
            supports_tools: false,
            supports_vision: false,
            supports_json_mode: false,
        }
    }
}

impl Default for ProviderCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

/// The contract every backend must implement.
///
/// Uses explicit BoxFuture/BoxStream return types instead of the `async-trait`
/// macro, so lifetimes stay visible at the boundary.
pub trait Provider: Send + Sync {
    /// Model identifier (e.g. "gpt-4o", "claude-sonnet-4").
    fn model_id(&self) -> &str;

    fn base_url(&self) -> Option<&str> {
        None
    }

    fn api_key(&self) -> Option<&SecretString> {
        None
    }

    fn capabilities(&self) -> ProviderCapabilities;

    /// Send a request, return the full response.
    fn generate(&self, request: ProviderRequest) -> BoxFuture<'_, Result<ProviderResponse, Error>>;

    /// Send a request, return a stream of deltas terminated by `Done`.
    fn stream(&self, request: ProviderRequest) -> BoxStream<'_, Result<TextStreamDelta, Error>>;
}
