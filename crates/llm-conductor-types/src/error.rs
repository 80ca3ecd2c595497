// Error taxonomy — one closed error type for the whole workspace.

use serde::{Deserialize, Serialize};

/// Discriminator for [`Error`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    UnsupportedOperation,
    Api,
    Network,
    ToolExecution,
}

/// The single error type for the library.
///
/// Provider, network and backend errors propagate unchanged to the caller.
/// `ToolExecution` never escapes the orchestrator: it is folded into an error
/// `ToolResult` and logged.
#[derive(Debug)]
pub enum Error {
    /// Malformed or oversized input, or structured output that could not be decoded.
    InvalidInput { message: String },
    /// A feature was requested that the backend does not support.
    UnsupportedOperation {
        operation: String,
        provider: Option<String>,
    },
    /// Non-2xx backend response.
    Api {
        status: u16,
        body: String,
        provider: Option<String>,
    },
    /// Transport-level failure.
    Network {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// A tool handler failed or its arguments did not validate.
    ToolExecution { tool: String, message: String },
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            provider: None,
        }
    }

    /// Construct from a non-2xx HTTP status (for transport collaborators).
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
            provider: None,
        }
    }

    /// Network error with an underlying cause.
    pub fn network(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn tool_execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Attach the originating provider to provider-scoped variants.
    /// Other variants are returned unchanged.
    pub fn with_provider(mut self, name: impl Into<String>) -> Self {
        match &mut self {
            Self::UnsupportedOperation { provider, .. } | Self::Api { provider, .. } => {
                *provider = Some(name.into());
            }
            _ => {}
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Self::Api { .. } => ErrorKind::Api,
            Self::Network { .. } => ErrorKind::Network,
            Self::ToolExecution { .. } => ErrorKind::ToolExecution,
        }
    }

    /// Whether a transport could reasonably retry the failed call.
    ///
    /// The core never retries; this is a hint for transport collaborators.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Api { status, .. } => matches!(status, 408 | 429 | 500..=599),
            _ => false,
        }
    }

    /// The human-readable message without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput { message } => message.clone(),
            Self::UnsupportedOperation { operation, .. } => {
                format!("{operation} is not supported")
            }
            Self::Api { status, body, .. } => format!("HTTP {status}: {body}"),
            Self::Network { message, .. } => message.clone(),
            Self::ToolExecution { tool, message } => format!("tool '{tool}' failed: {message}"),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedOperation {
                provider: Some(p), ..
            }
            | Self::Api {
                provider: Some(p), ..
            } => write!(f, "{:?} ({p}): {}", self.kind(), self.message()),
            _ => write!(f, "{:?}: {}", self.kind(), self.message()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network {
                source: Some(source),
                ..
            } => Some(source.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}
