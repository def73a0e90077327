//! Notifications delivered to the caller while a search runs.

use crossbeam_channel::Sender;

use crate::error::KeyError;

use super::MatchResult;

/// Receives session notifications on the coordinator's aggregator thread.
///
/// Implementations should return quickly; the aggregator processes worker
/// events one at a time. Calling `start` or `stop` on the coordinator from a
/// callback deadlocks, since both join the aggregator.
pub trait SearchObserver: Send + Sync {
    /// The running total after a progress event.
    fn on_progress(&self, _total_generated: u64) {}

    /// The session's single match.
    fn on_match(&self, _result: &MatchResult) {}

    fn on_worker_failed(&self, _worker_id: usize, _error: &KeyError) {}

    /// Every worker aborted; the session is over.
    fn on_exhausted(&self) {}
}

/// Ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Channel form of the observer callbacks.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    Progress { total_generated: u64 },
    Matched(MatchResult),
    WorkerFailed { worker_id: usize, reason: String },
    Exhausted,
}

impl SearchObserver for Sender<SearchEvent> {
    fn on_progress(&self, total_generated: u64) {
        let _ = self.send(SearchEvent::Progress { total_generated });
    }

    fn on_match(&self, result: &MatchResult) {
        let _ = self.send(SearchEvent::Matched(result.clone()));
    }

    fn on_worker_failed(&self, worker_id: usize, error: &KeyError) {
        let _ = self.send(SearchEvent::WorkerFailed {
            worker_id,
            reason: error.to_string(),
        });
    }

    fn on_exhausted(&self) {
        let _ = self.send(SearchEvent::Exhausted);
    }
}
