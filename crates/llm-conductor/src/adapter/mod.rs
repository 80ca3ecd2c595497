// adapter/ — provider adaptation layer (Layer 2).
//
// Wraps a raw Provider behind the same contract while enforcing a
// ProviderConfiguration: message normalization, tool limits, token clamping,
// JSON-hint gating and simulated streaming.

pub mod fallback;
pub mod features;
pub mod image;
pub mod messages;

use std::sync::Arc;

use futures::stream;
use llm_conductor_types::*;
use secrecy::SecretString;

pub use features::Feature;

/// A provider wrapped with a configuration profile.
pub struct AdaptedProvider {
    inner: Arc<dyn Provider>,
    configuration: ProviderConfiguration,
    simulated_stream: SimulatedStreamConfig,
}

impl AdaptedProvider {
    /// Wrap `inner` with an explicit profile. Simulated-stream chunking is read
    /// from the environment.
    pub fn new(inner: Arc<dyn Provider>, configuration: ProviderConfiguration) -> Self {
        Self {
            inner,
            configuration,
            simulated_stream: SimulatedStreamConfig::from_env(),
        }
    }

    /// Wrap `inner` with a profile detected from its model id and base URL.
    pub fn detect(inner: Arc<dyn Provider>) -> Self {
        let configuration = ProviderConfiguration::detect(inner.model_id(), inner.base_url());
        tracing::debug!(
            model = inner.model_id(),
            max_tokens = configuration.max_tokens,
            "detected provider configuration"
        );
        Self::new(inner, configuration)
    }

    pub fn with_simulated_stream(mut self, config: SimulatedStreamConfig) -> Self {
        self.simulated_stream = config;
        self
    }

    pub fn configuration(&self) -> &ProviderConfiguration {
        &self.configuration
    }

    pub fn inner(&self) -> &Arc<dyn Provider> {
        &self.inner
    }

    pub fn supports(&self, feature: Feature) -> bool {
        feature.is_supported(&self.inner.capabilities(), &self.configuration)
    }

    /// Produce the request the backend actually receives. The input is not modified.
    pub fn normalize_request(&self, request: &ProviderRequest) -> Result<ProviderRequest, Error> {
        let capabilities = self.inner.capabilities();
        let config = &self.configuration;

        let messages =
            messages::normalize_messages(&request.messages, config, capabilities.supports_vision)?;

        let tools = if request.has_tools() {
            if !capabilities.supports_tools {
                return Err(Error::unsupported("tool calling").with_provider(self.model_id()));
            }
            let mut tools = request.tools.clone().unwrap_or_default();
            if tools.len() > config.max_tool_calls {
                tracing::debug!(
                    requested = tools.len(),
                    limit = config.max_tool_calls,
                    "truncating tool list to provider limit"
                );
                tools.truncate(config.max_tool_calls);
            }
            Some(tools)
        } else {
            None
        };

        let mut settings = request.settings.clone();
        if let Some(max_tokens) = settings.max_tokens {
            settings.max_tokens = Some(max_tokens.min(config.max_tokens));
        }

        let mut output_format = request.output_format.clone();
        if !capabilities.supports_json_mode {
            if request.effective_output_format().is_some_and(OutputFormat::is_json) {
                tracing::debug!(model = self.model_id(), "dropping JSON output hint");
            }
            output_format = output_format.filter(|f| !f.is_json());
            settings.output_format = settings.output_format.filter(|f| !f.is_json());
        }

        Ok(ProviderRequest {
            messages,
            tools,
            settings,
            output_format,
        })
    }
}

impl std::fmt::Debug for AdaptedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptedProvider")
            .field("model_id", &self.inner.model_id())
            .field("configuration", &self.configuration)
            .field("simulated_stream", &self.simulated_stream)
            .finish()
    }
}

impl Provider for AdaptedProvider {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn base_url(&self) -> Option<&str> {
        self.inner.base_url()
    }

    fn api_key(&self) -> Option<&SecretString> {
        self.inner.api_key()
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.inner.capabilities()
    }

    fn generate(&self, request: ProviderRequest) -> BoxFuture<'_, Result<ProviderResponse, Error>> {
        Box::pin(async move {
            let request = self.normalize_request(&request)?;
            self.inner.generate(request).await
        })
    }

    fn stream(&self, request: ProviderRequest) -> BoxStream<'_, Result<TextStreamDelta, Error>> {
        let request = match self.normalize_request(&request) {
            Ok(request) => request,
            Err(e) => return Box::pin(stream::once(async move { Err::<TextStreamDelta, _>(e) })),
        };
        if self.inner.capabilities().supports_streaming {
            self.inner.stream(request)
        } else {
            tracing::debug!(
                model = self.model_id(),
                words_per_chunk = self.simulated_stream.words_per_chunk,
                "backend lacks streaming, simulating"
            );
            fallback::simulated_stream(self.inner.as_ref(), request, self.simulated_stream)
        }
    }
}
