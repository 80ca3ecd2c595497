// Usage-tracking contract. Storage lives outside this crate.

use serde::{Deserialize, Serialize};

use crate::response::Usage;

/// What kind of call produced a usage record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    TextGeneration,
    ToolCall,
    TextStreaming,
    ImageAnalysis,
}

/// Session-scoped sink for usage records.
///
/// Every call opens a uniquely identified session, writes at most one record,
/// and closes the session on every exit path.
pub trait UsageTracker: Send + Sync {
    fn start_session(&self, session_id: &str);

    fn record_usage(&self, session_id: &str, model: &str, usage: &Usage, kind: OperationKind);

    fn end_session(&self, session_id: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_serde() {
        assert_eq!(
            serde_json::to_string(&OperationKind::TextStreaming).unwrap(),
            "\"text_streaming\""
        );
        let kind: OperationKind = serde_json::from_str("\"image_analysis\"").unwrap();
        assert_eq!(kind, OperationKind::ImageAnalysis);
    }
}
