// usage.rs — session guard and an in-memory tracker (Layer 3).

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use llm_conductor_types::{OperationKind, Usage, UsageTracker};

/// One open usage session. Ends the session on drop.
///
/// Records at most once; later `record` calls are ignored with a warning.
/// Without a tracker every operation is a no-op.
pub struct UsageSession {
    tracker: Option<Arc<dyn UsageTracker>>,
    id: String,
    model: String,
    recorded: bool,
    ended: bool,
}

impl UsageSession {
    /// Open a session with a fresh UUID v4 id.
    pub fn start(tracker: Option<Arc<dyn UsageTracker>>, model: impl Into<String>) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        if let Some(tracker) = &tracker {
            tracker.start_session(&id);
        }
        Self {
            tracker,
            id,
            model: model.into(),
            recorded: false,
            ended: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_recorded(&self) -> bool {
        self.recorded
    }

    pub fn record(&mut self, usage: &Usage, kind: OperationKind) {
        if self.recorded {
            tracing::warn!(session = %self.id, "usage already recorded for session");
            return;
        }
        self.recorded = true;
        if let Some(tracker) = &self.tracker {
            tracker.record_usage(&self.id, &self.model, usage, kind);
        }
    }

    /// End the session now. Idempotent; `Drop` calls it too.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        if let Some(tracker) = &self.tracker {
            tracker.end_session(&self.id);
        }
    }
}

impl Drop for UsageSession {
    fn drop(&mut self) {
        self.end();
    }
}

impl std::fmt::Debug for UsageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageSession")
            .field("id", &self.id)
            .field("model", &self.model)
            .field("tracked", &self.tracker.is_some())
            .field("recorded", &self.recorded)
            .field("ended", &self.ended)
            .finish()
    }
}

/// One stored usage record.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub session_id: String,
    pub model: String,
    pub usage: Usage,
    pub kind: OperationKind,
}

#[derive(Debug, Default)]
struct TrackerState {
    records: Vec<UsageRecord>,
    open: HashSet<String>,
    started: usize,
}

/// A [`UsageTracker`] that keeps everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryUsageTracker {
    state: Mutex<TrackerState>,
}

impl InMemoryUsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn records(&self) -> Vec<UsageRecord> {
        self.state().records.clone()
    }

    /// Sessions started but not yet ended.
    pub fn open_sessions(&self) -> Vec<String> {
        self.state().open.iter().cloned().collect()
    }

    /// Total sessions ever started.
    pub fn sessions_started(&self) -> usize {
        self.state().started
    }

    /// Sum of every recorded usage.
    pub fn total_usage(&self) -> Usage {
        self.state().records.iter().map(|r| r.usage).sum()
    }
}

impl UsageTracker for InMemoryUsageTracker {
    fn start_session(&self, session_id: &str) {
        let mut state = self.state();
        state.started += 1;
        state.open.insert(session_id.to_string());
    }

    fn record_usage(&self, session_id: &str, model: &str, usage: &Usage, kind: OperationKind) {
        let mut state = self.state();
        if !state.open.contains(session_id) {
            tracing::warn!(session = session_id, "usage recorded for unknown session");
        }
        state.records.push(UsageRecord {
            session_id: session_id.to_string(),
            model: model.to_string(),
            usage: *usage,
            kind,
        });
    }

    fn end_session(&self, session_id: &str) {
        self.state().open.remove(session_id);
    }
}
