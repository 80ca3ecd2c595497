use serde::{Deserialize, Serialize};

use crate::response::{FinishReason, Usage};
use crate::tool::ToolCall;

/// One incremental unit of a text stream. `Done` is always the last delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextStreamDelta {
    TextDelta {
        text: String,
    },
    ToolCall {
        tool_call: ToolCall,
    },
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
        finish_reason: FinishReason,
    },
}

impl TextStreamDelta {
    pub fn text(text: impl Into<String>) -> Self {
        TextStreamDelta::TextDelta { text: text.into() }
    }

    pub fn done(usage: Option<Usage>, finish_reason: FinishReason) -> Self {
        TextStreamDelta::Done {
            usage,
            finish_reason,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TextStreamDelta::Done { .. })
    }
}

/// One incremental unit of a structured-object stream.
///
/// Order: `Start` once, any number of `Partial`, exactly one `Complete`, then `Done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectStreamDelta<T> {
    Start,
    Partial {
        object: T,
    },
    Complete {
        object: T,
    },
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
        finish_reason: FinishReason,
    },
}

impl<T> ObjectStreamDelta<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, ObjectStreamDelta::Done { .. })
    }
}
