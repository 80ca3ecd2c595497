use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::tool::{ToolCall, ToolResult};

/// Discriminator for content part variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Image,
    ToolCall,
    ToolResult,
}

/// A single content part within a message. Tagged union on `"kind"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image { image: ImageData },
    ToolCall { tool_call: ToolCall },
    ToolResult { tool_result: ToolResult },
}

impl ContentPart {
    /// Convenience: create a text content part.
    pub fn text(s: impl Into<String>) -> Self {
        ContentPart::Text { text: s.into() }
    }

    /// Convenience: create an image part from a URL or data URL.
    pub fn image(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        ContentPart::Image {
            image: ImageData {
                data: data.into(),
                mime_type: mime_type.into(),
            },
        }
    }

    /// Convenience: create an image part from raw bytes, encoded as a base64 data URL.
    pub fn image_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        ContentPart::Image {
            image: ImageData {
                data: format!("data:{mime_type};base64,{encoded}"),
                mime_type,
            },
        }
    }

    pub fn tool_call(tool_call: ToolCall) -> Self {
        ContentPart::ToolCall { tool_call }
    }

    pub fn tool_result(tool_result: ToolResult) -> Self {
        ContentPart::ToolResult { tool_result }
    }

    /// Return the discriminant kind of this content part.
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentPart::Text { .. } => ContentKind::Text,
            ContentPart::Image { .. } => ContentKind::Image,
            ContentPart::ToolCall { .. } => ContentKind::ToolCall,
            ContentPart::ToolResult { .. } => ContentKind::ToolResult,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentPart::Image { .. })
    }
}

/// Image payload: either a remote URL or a `data:` URL with base64 content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub data: String,
    pub mime_type: String,
}

impl ImageData {
    pub fn is_data_url(&self) -> bool {
        self.data.starts_with("data:")
    }
}
