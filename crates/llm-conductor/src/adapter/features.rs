// Feature query surface for adapted providers.

use std::fmt;
use std::str::FromStr;

use llm_conductor_types::{Error, ProviderCapabilities, ProviderConfiguration};
use serde::{Deserialize, Serialize};

/// A named capability a caller can ask an adapted provider about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Streaming,
    ToolCalling,
    SystemMessages,
    VisionInputs,
    MultiModal,
    JsonMode,
    FunctionCalling,
    ParallelToolCalls,
    ContextCaching,
    LongContext,
}

/// Context windows above this count as long context.
pub const LONG_CONTEXT_THRESHOLD: u32 = 100_000;

impl Feature {
    pub const ALL: [Feature; 10] = [
        Feature::Streaming,
        Feature::ToolCalling,
        Feature::SystemMessages,
        Feature::VisionInputs,
        Feature::MultiModal,
        Feature::JsonMode,
        Feature::FunctionCalling,
        Feature::ParallelToolCalls,
        Feature::ContextCaching,
        Feature::LongContext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Streaming => "streaming",
            Feature::ToolCalling => "toolCalling",
            Feature::SystemMessages => "systemMessages",
            Feature::VisionInputs => "visionInputs",
            Feature::MultiModal => "multiModal",
            Feature::JsonMode => "jsonMode",
            Feature::FunctionCalling => "functionCalling",
            Feature::ParallelToolCalls => "parallelToolCalls",
            Feature::ContextCaching => "contextCaching",
            Feature::LongContext => "longContext",
        }
    }

    /// Pure function of the capability/profile pair.
    pub fn is_supported(
        &self,
        capabilities: &ProviderCapabilities,
        configuration: &ProviderConfiguration,
    ) -> bool {
        match self {
            Feature::Streaming => capabilities.supports_streaming,
            Feature::ToolCalling | Feature::FunctionCalling => capabilities.supports_tools,
            Feature::SystemMessages => configuration.supports_system_role,
            Feature::VisionInputs | Feature::MultiModal => capabilities.supports_vision,
            Feature::JsonMode => capabilities.supports_json_mode,
            Feature::ParallelToolCalls => {
                capabilities.supports_tools && configuration.max_tool_calls > 1
            }
            Feature::ContextCaching => false,
            Feature::LongContext => configuration.max_context_length > LONG_CONTEXT_THRESHOLD,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| Error::invalid_input(format!("unknown feature '{s}'")))
    }
}
