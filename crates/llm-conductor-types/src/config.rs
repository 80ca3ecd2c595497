use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Per-backend normalization rules and limits. Constructed once, read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfiguration {
    pub max_tokens: u32,
    pub max_context_length: u32,
    /// Lowercase image subtypes accepted in data URLs (`png`, `jpeg`, ...).
    pub supported_image_formats: Vec<String>,
    /// Maximum decoded image size in bytes. `None` disables the check.
    pub max_image_size: Option<usize>,
    pub max_tool_calls: usize,
    pub supports_system_role: bool,
    pub requires_alternating_roles: bool,
    pub custom_headers: HashMap<String, String>,
}

const MB: usize = 1024 * 1024;

fn formats(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl ProviderConfiguration {
    pub fn openai() -> Self {
        Self {
            max_tokens: 4096,
            max_context_length: 128_000,
            supported_image_formats: formats(&["png", "jpeg", "jpg", "gif", "webp"]),
            max_image_size: Some(20 * MB),
            max_tool_calls: 128,
            supports_system_role: true,
            requires_alternating_roles: false,
            custom_headers: HashMap::new(),
        }
    }

    pub fn anthropic() -> Self {
        Self {
            max_tokens: 8192,
            max_context_length: 200_000,
            supported_image_formats: formats(&["png", "jpeg", "jpg", "gif", "webp"]),
            max_image_size: Some(5 * MB),
            max_tool_calls: 64,
            supports_system_role: true,
            requires_alternating_roles: true,
            custom_headers: HashMap::new(),
        }
    }

    pub fn google() -> Self {
        Self {
            max_tokens: 8192,
            max_context_length: 1_000_000,
            supported_image_formats: formats(&["png", "jpeg", "jpg", "webp", "heic", "heif"]),
            max_image_size: Some(20 * MB),
            max_tool_calls: 64,
            supports_system_role: false,
            requires_alternating_roles: true,
            custom_headers: HashMap::new(),
        }
    }

    pub fn ollama() -> Self {
        Self {
            max_tokens: 4096,
            max_context_length: 8192,
            supported_image_formats: formats(&["png", "jpeg", "jpg"]),
            max_image_size: Some(10 * MB),
            max_tool_calls: 1,
            supports_system_role: true,
            requires_alternating_roles: false,
            custom_headers: HashMap::new(),
        }
    }

    pub fn generic() -> Self {
        Self {
            max_tokens: 4096,
            max_context_length: 8192,
            supported_image_formats: formats(&["png", "jpeg", "jpg"]),
            max_image_size: None,
            max_tool_calls: 10,
            supports_system_role: true,
            requires_alternating_roles: false,
            custom_headers: HashMap::new(),
        }
    }

    /// Best-effort profile selection from the model id and base URL.
    ///
    /// Case-insensitive substring match, checked in order: OpenAI, Anthropic,
    /// Google, Ollama. Anything else gets the generic profile.
    pub fn detect(model_id: &str, base_url: Option<&str>) -> Self {
        let model = model_id.to_lowercase();
        let url = base_url.map(str::to_lowercase).unwrap_or_default();
        let matches = |needles: &[&str]| {
            needles
                .iter()
                .any(|n| model.contains(n) || url.contains(n))
        };

        if matches(&["gpt", "openai"]) {
            Self::openai()
        } else if matches(&["claude", "anthropic"]) {
            Self::anthropic()
        } else if matches(&["gemini", "google"]) {
            Self::google()
        } else if matches(&["localhost", "ollama"]) {
            Self::ollama()
        } else {
            Self::generic()
        }
    }

    /// Load a profile from JSON. Missing fields take the generic defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json)
            .map_err(|e| Error::invalid_input(format!("invalid provider configuration: {e}")))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(name.into(), value.into());
        self
    }

    /// Whether `format` (case-insensitive) is an accepted image subtype.
    pub fn supports_image_format(&self, format: &str) -> bool {
        self.supported_image_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }
}

impl Default for ProviderConfiguration {
    fn default() -> Self {
        Self::generic()
    }
}

/// Environment variable overriding [`SimulatedStreamConfig::words_per_chunk`].
pub const SIMULATED_CHUNK_WORDS_ENV: &str = "LLM_CONDUCTOR_SIMULATED_CHUNK_WORDS";
/// Environment variable overriding [`SimulatedStreamConfig::chunk_delay`], in milliseconds.
pub const SIMULATED_CHUNK_DELAY_MS_ENV: &str = "LLM_CONDUCTOR_SIMULATED_CHUNK_DELAY_MS";

/// Chunking used when streaming is simulated on top of a one-shot generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedStreamConfig {
    pub words_per_chunk: usize,
    pub chunk_delay: Duration,
}

impl Default for SimulatedStreamConfig {
    fn default() -> Self {
        Self {
            words_per_chunk: 20,
            chunk_delay: Duration::from_millis(50),
        }
    }
}

impl SimulatedStreamConfig {
    /// Defaults, overridden by `LLM_CONDUCTOR_SIMULATED_CHUNK_WORDS` and
    /// `LLM_CONDUCTOR_SIMULATED_CHUNK_DELAY_MS` when set to valid numbers.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(words) = lookup(SIMULATED_CHUNK_WORDS_ENV)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|w| *w > 0)
        {
            config.words_per_chunk = words;
        }
        if let Some(ms) = lookup(SIMULATED_CHUNK_DELAY_MS_ENV).and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.chunk_delay = Duration::from_millis(ms);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_model_id() {
        assert_eq!(ProviderConfiguration::detect("gpt-4o", None), ProviderConfiguration::openai());
        assert_eq!(
            ProviderConfiguration::detect("Claude-Sonnet-4", None),
            ProviderConfiguration::anthropic()
        );
        assert_eq!(
            ProviderConfiguration::detect("gemini-2.0-flash", None),
            ProviderConfiguration::google()
        );
        assert_eq!(
            ProviderConfiguration::detect("mistral-7b", None),
            ProviderConfiguration::generic()
        );
    }

    #[test]
    fn test_detect_by_base_url() {
        assert_eq!(
            ProviderConfiguration::detect("llama3", Some("http://localhost:11434")),
            ProviderConfiguration::ollama()
        );
        assert_eq!(
            ProviderConfiguration::detect("my-model", Some("https://API.ANTHROPIC.com/v1")),
            ProviderConfiguration::anthropic()
        );
    }

    #[test]
    fn test_detect_order_prefers_openai() {
        // Matches both "gpt" and "localhost"; OpenAI is checked first.
        assert_eq!(
            ProviderConfiguration::detect("gpt-oss", Some("http://localhost:8080")),
            ProviderConfiguration::openai()
        );
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            ProviderConfiguration::from_json(r#"{"max_tokens": 1024, "supports_system_role": false}"#)
                .unwrap();
        assert_eq!(config.max_tokens, 1024);
        assert!(!config.supports_system_role);
        assert_eq!(config.max_context_length, ProviderConfiguration::generic().max_context_length);
        assert_eq!(config.max_tool_calls, 10);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = ProviderConfiguration::from_json("{not json").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_supports_image_format_case_insensitive() {
        let config = ProviderConfiguration::openai();
        assert!(config.supports_image_format("PNG"));
        assert!(!config.supports_image_format("tiff"));
    }

    #[test]
    fn test_simulated_stream_defaults() {
        let config = SimulatedStreamConfig::from_lookup(|_| None);
        assert_eq!(config, SimulatedStreamConfig::default());
        assert_eq!(config.words_per_chunk, 20);
        assert_eq!(config.chunk_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_simulated_stream_overrides() {
        let config = SimulatedStreamConfig::from_lookup(|key| match key {
            SIMULATED_CHUNK_WORDS_ENV => Some("5".into()),
            SIMULATED_CHUNK_DELAY_MS_ENV => Some(" 0 ".into()),
            _ => None,
        });
        assert_eq!(config.words_per_chunk, 5);
        assert_eq!(config.chunk_delay, Duration::ZERO);
    }

    #[test]
    fn test_simulated_stream_ignores_invalid_overrides() {
        let config = SimulatedStreamConfig::from_lookup(|key| match key {
            SIMULATED_CHUNK_WORDS_ENV => Some("0".into()),
            SIMULATED_CHUNK_DELAY_MS_ENV => Some("soon".into()),
            _ => None,
        });
        assert_eq!(config, SimulatedStreamConfig::default());
    }
}
