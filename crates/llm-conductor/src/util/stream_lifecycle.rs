// stream_lifecycle.rs — delta ordering observer for text streams.
//
// Warns when deltas arrive in unexpected order without failing the stream:
// `Done` must be the last delta, and must arrive exactly once.

use llm_conductor_types::TextStreamDelta;

/// Tracks delta ordering and logs violations via `tracing::warn!`.
#[derive(Debug, Default)]
pub struct StreamLifecycle {
    deltas: usize,
    finished: bool,
    late_deltas: usize,
}

impl StreamLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one delta. Logs a warning for anything observed after `Done`.
    pub fn observe(&mut self, delta: &TextStreamDelta) {
        self.deltas += 1;
        if self.finished {
            self.late_deltas += 1;
            if delta.is_done() {
                tracing::warn!("duplicate Done delta in text stream");
            } else {
                tracing::warn!(delta = ?delta, "delta received after Done");
            }
            return;
        }
        if delta.is_done() {
            self.finished = true;
        }
    }

    /// Called when the underlying stream is exhausted.
    pub fn end(&self) {
        if !self.finished {
            tracing::warn!(deltas = self.deltas, "text stream ended without a Done delta");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Deltas observed after `Done`.
    pub fn late_deltas(&self) -> usize {
        self.late_deltas
    }
}
