//! Aggregate state of one search session.

use std::time::{Duration, Instant};

use crate::crypto::{Address, Candidate, PrivateKey};
use crate::matcher::Prefix;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No search has been started yet
    #[default]
    Idle,
    Running,
    /// Stopped by the caller before a match
    Stopped,
    Matched,
    /// Every worker aborted
    Exhausted,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "idle"),
            SessionStatus::Running => write!(f, "running"),
            SessionStatus::Stopped => write!(f, "stopped"),
            SessionStatus::Matched => write!(f, "matched"),
            SessionStatus::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// The winning candidate of a search.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub address: Address,
    pub private_key: PrivateKey,
    /// Candidates generated by all workers up to and including the match
    pub total_generated: u64,
    /// Time from session start to the match
    pub elapsed: Duration,
    /// Worker that found the match
    pub worker_id: usize,
}

impl MatchResult {
    /// Lowercase address with `0x` marker.
    pub fn address_hex(&self) -> String {
        self.address.to_hex_prefixed()
    }

    /// EIP-55 checksummed address.
    pub fn address_checksum(&self) -> String {
        self.address.to_checksum()
    }

    /// Private key as `0x`-prefixed hex. Handle with care.
    pub fn private_key_hex(&self) -> String {
        self.private_key.to_hex_prefixed()
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

/// Point-in-time copy of a session for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Increments with every `start`
    pub session_id: u64,
    pub status: SessionStatus,
    pub prefix: Option<String>,
    pub total_generated: u64,
    pub elapsed: Duration,
    pub workers: usize,
    /// Workers still searching; 0 once the session leaves `Running`
    pub live_workers: usize,
}

impl SessionSnapshot {
    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

/// Session state mutated only by the coordinator.
#[derive(Debug, Default)]
pub(crate) struct SearchSession {
    pub(crate) id: u64,
    pub(crate) status: SessionStatus,
    prefix: Option<Prefix>,
    total_generated: u64,
    started_at: Option<Instant>,
    /// Frozen when the session leaves `Running`
    elapsed: Duration,
    result: Option<MatchResult>,
    workers: usize,
    live_workers: usize,
    /// Progress already counted per worker
    reported: Vec<u64>,
}

impl SearchSession {
    /// Resets all counters and enters `Running` under a new id.
    pub(crate) fn begin(&mut self, prefix: Prefix, workers: usize) -> u64 {
        *self = Self {
            id: self.id + 1,
            status: SessionStatus::Running,
            prefix: Some(prefix),
            started_at: Some(Instant::now()),
            workers,
            live_workers: workers,
            reported: vec![0; workers],
            ..Self::default()
        };
        self.id
    }

    pub(crate) fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub(crate) fn elapsed(&self) -> Duration {
        match (self.status, self.started_at) {
            (SessionStatus::Running, Some(started)) => started.elapsed(),
            _ => self.elapsed,
        }
    }

    pub(crate) fn total_generated(&self) -> u64 {
        self.total_generated
    }

    pub(crate) fn workers(&self) -> usize {
        self.workers
    }

    pub(crate) fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    /// Adds a progress delta. Returns the new total, or `None` if the
    /// session no longer accepts events.
    pub(crate) fn record_progress(&mut self, worker_id: usize, delta: u64) -> Option<u64> {
        if !self.is_running() {
            return None;
        }
        self.total_generated += delta;
        if let Some(reported) = self.reported.get_mut(worker_id) {
            *reported += delta;
        }
        Some(self.total_generated)
    }

    /// Records the first match of the session. Later matches return `None`.
    ///
    /// `count` is the worker's local counter; the part of it not yet
    /// reported through progress events is added to the total.
    pub(crate) fn record_match(
        &mut self,
        worker_id: usize,
        candidate: &Candidate,
        count: u64,
    ) -> Option<MatchResult> {
        if !self.is_running() {
            return None;
        }

        let reported = self.reported.get(worker_id).copied().unwrap_or(0);
        self.total_generated += count.saturating_sub(reported);
        if let Some(slot) = self.reported.get_mut(worker_id) {
            *slot = count.max(reported);
        }

        self.freeze(SessionStatus::Matched);
        let result = MatchResult {
            address: *candidate.address(),
            private_key: *candidate.private_key(),
            total_generated: self.total_generated,
            elapsed: self.elapsed,
            worker_id,
        };
        self.result = Some(result.clone());
        Some(result)
    }

    /// Counts an aborted worker. Returns true if it was the last live one
    /// and the session became `Exhausted`.
    pub(crate) fn record_failure(&mut self) -> bool {
        self.live_workers = self.live_workers.saturating_sub(1);
        if self.live_workers == 0 && self.is_running() {
            self.freeze(SessionStatus::Exhausted);
            return true;
        }
        false
    }

    /// `Running -> Stopped`. Returns false if the session was not running.
    pub(crate) fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.freeze(SessionStatus::Stopped);
        true
    }

    fn freeze(&mut self, status: SessionStatus) {
        self.elapsed = self.elapsed();
        self.status = status;
        self.live_workers = 0;
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            status: self.status,
            prefix: self.prefix.as_ref().map(|p| p.as_str().to_string()),
            total_generated: self.total_generated,
            elapsed: self.elapsed(),
            workers: self.workers,
            live_workers: self.live_workers,
        }
    }
}
