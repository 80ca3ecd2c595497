// api/types.rs — Tool and GenerateOptions for the high-level API (Layer 4).

use std::sync::Arc;

use llm_conductor_types::*;

/// Any error a tool handler may return.
pub type ToolError = Box<dyn std::error::Error + Send + Sync>;

/// Handler function type for tool execution.
/// Takes the call's argument object, returns a JSON value.
pub type ToolExecuteFn = Arc<
    dyn Fn(serde_json::Map<String, serde_json::Value>) -> BoxFuture<'static, Result<serde_json::Value, ToolError>>
        + Send
        + Sync,
>;

/// A tool the orchestrator can execute: a definition plus its handler.
#[derive(Clone)]
pub struct Tool {
    /// The serializable definition sent to the provider.
    pub definition: ToolDefinition,
    pub execute: ToolExecuteFn,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
        execute: impl Fn(
                serde_json::Map<String, serde_json::Value>,
            ) -> BoxFuture<'static, Result<serde_json::Value, ToolError>>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            definition: ToolDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
            execute: Arc::new(execute),
        }
    }

    pub fn from_definition(definition: ToolDefinition, execute: ToolExecuteFn) -> Self {
        Self {
            definition,
            execute,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Validate the tool definition (name format + parameter schema).
    ///
    /// Called by `generate_text()` and `stream_text()` before any request.
    pub fn validate(&self) -> Result<(), Error> {
        self.definition.validate()
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("definition", &self.definition)
            .field("execute", &"...")
            .finish()
    }
}

/// Options for `generate_text()`, `generate_object()`, `stream_text()` and `stream_object()`.
///
/// Use the builder pattern:
/// ```ignore
/// let opts = GenerateOptions::new(vec![Message::user("What's the weather?")])
///     .tools(vec![weather_tool])
///     .max_steps(3)
///     .max_tokens(500);
/// ```
pub struct GenerateOptions {
    /// Conversation so far. Never mutated; the orchestrator works on a copy.
    pub messages: Vec<Message>,
    pub tools: Vec<Tool>,
    pub settings: GenerationSettings,
    /// Upper bound on provider requests for `generate_text()` (default: 1).
    /// Streaming calls are single-step and ignore it.
    pub max_steps: usize,
    pub usage_tracker: Option<Arc<dyn UsageTracker>>,
}

impl GenerateOptions {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            settings: GenerationSettings::default(),
            max_steps: 1,
            usage_tracker: None,
        }
    }

    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    pub fn settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.settings.max_tokens = Some(tokens);
        self
    }

    pub fn temperature(mut self, t: f64) -> Self {
        self.settings.temperature = Some(t);
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.settings.output_format = Some(format);
        self
    }

    pub fn max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    pub fn usage_tracker(mut self, tracker: Arc<dyn UsageTracker>) -> Self {
        self.usage_tracker = Some(tracker);
        self
    }

    pub(crate) fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }

    pub(crate) fn validate_tools(&self) -> Result<(), Error> {
        self.tools.iter().try_for_each(Tool::validate)
    }
}

impl std::fmt::Debug for GenerateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateOptions")
            .field("messages", &self.messages)
            .field("tools", &self.tools)
            .field("settings", &self.settings)
            .field("max_steps", &self.max_steps)
            .field("usage_tracker", &self.usage_tracker.as_ref().map(|_| "..."))
            .finish()
    }
}
