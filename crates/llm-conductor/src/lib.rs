// llm-conductor: Layers 2–4 — provider adaptation, usage accounting, high-level API
#![allow(clippy::result_large_err)]

pub mod adapter;
pub mod api;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod usage;
pub mod util;

// --- Curated re-exports from llm-conductor-types (Layer 1) ---
pub use llm_conductor_types::{
    // Type aliases
    BoxFuture,
    BoxStream,
    // Messages and content
    ContentKind,
    ContentPart,
    // Errors
    Error,
    ErrorKind,
    // Request/Response
    FinishReason,
    GenerationSettings,
    ImageData,
    Message,
    // Streaming
    ObjectStreamDelta,
    // Usage
    OperationKind,
    OutputFormat,
    // Provider contract
    Provider,
    ProviderCapabilities,
    // Configuration
    ProviderConfiguration,
    ProviderRequest,
    ProviderResponse,
    Role,
    SimulatedStreamConfig,
    TextStreamDelta,
    // Tools
    ToolCall,
    ToolDefinition,
    ToolOutcome,
    ToolResult,
    Usage,
    UsageTracker,
};

// --- Provider adaptation (Layer 2) ---
pub use adapter::{AdaptedProvider, Feature};

// --- Usage accounting (Layer 3) ---
pub use usage::{InMemoryUsageTracker, UsageRecord, UsageSession};

// --- High-level API (Layer 4) ---
pub use api::generate::generate_text;
pub use api::generate_object::generate_object;
pub use api::generate_types::{GenerateObjectResult, GenerateTextResult, GenerationStep};
pub use api::stream::{stream_text, StreamResult, TextDeltaStream};
pub use api::stream_object::{stream_object, ObjectStream};
pub use api::types::{GenerateOptions, Tool, ToolError, ToolExecuteFn};
