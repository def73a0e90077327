//! The generate-derive-match loop run by each worker thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use rand::RngCore;

use crate::crypto::{Candidate, KeyDeriver};
use crate::error::KeyError;
use crate::matcher::Prefix;

/// Events a worker pushes to the coordinator.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Candidates generated since the worker's previous event.
    Progress { worker_id: usize, delta: u64 },
    /// A matching candidate and the worker's local counter when it was found.
    Found {
        worker_id: usize,
        candidate: Candidate,
        count: u64,
    },
    /// The worker aborted and will send nothing else.
    Failed { worker_id: usize, error: KeyError },
}

/// Lifecycle of a single worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Matched,
    Stopped,
    Failed,
}

/// A worker that generates and tests candidates until it matches or is stopped.
pub struct SearchWorker<R> {
    id: usize,
    prefix: Prefix,
    batch_size: u64,
    deriver: KeyDeriver<R>,
    events: Sender<WorkerEvent>,
    stop_flag: Arc<AtomicBool>,
    state: WorkerState,
    generated: u64,
}

impl<R: RngCore> SearchWorker<R> {
    pub fn new(
        id: usize,
        prefix: Prefix,
        batch_size: u64,
        deriver: KeyDeriver<R>,
        events: Sender<WorkerEvent>,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            prefix,
            batch_size: batch_size.max(1),
            deriver,
            events,
            stop_flag,
            state: WorkerState::Idle,
            generated: 0,
        }
    }

    /// Runs the worker loop and returns the state it ended in.
    ///
    /// The stop flag is checked before and after each candidate is derived,
    /// so nothing is sent once a stop has been observed. A closed event
    /// channel is treated like a stop signal.
    pub fn run(&mut self) -> WorkerState {
        self.state = WorkerState::Running;
        tracing::debug!(worker_id = self.id, prefix = %self.prefix, "worker started");

        let mut unreported = 0u64;

        self.state = loop {
            if self.stop_flag.load(Ordering::Acquire) {
                break WorkerState::Stopped;
            }

            let drawn = self.deriver.next_candidate();

            // A stop raised while deriving discards the in-flight candidate.
            if self.stop_flag.load(Ordering::Acquire) {
                break WorkerState::Stopped;
            }

            let candidate = match drawn {
                Ok(candidate) => candidate,
                Err(error) => {
                    let _ = self.events.send(WorkerEvent::Failed {
                        worker_id: self.id,
                        error,
                    });
                    break WorkerState::Failed;
                }
            };

            self.generated += 1;
            unreported += 1;

            if self.prefix.matches(candidate.address()) {
                let _ = self.events.send(WorkerEvent::Found {
                    worker_id: self.id,
                    candidate,
                    count: self.generated,
                });
                break WorkerState::Matched;
            }

            if unreported == self.batch_size {
                let progress = WorkerEvent::Progress {
                    worker_id: self.id,
                    delta: unreported,
                };
                if self.events.send(progress).is_err() {
                    break WorkerState::Stopped;
                }
                unreported = 0;
            }
        };

        tracing::debug!(
            worker_id = self.id,
            state = ?self.state,
            generated = self.generated,
            "worker finished"
        );
        self.state
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Candidates generated so far.
    pub fn generated(&self) -> u64 {
        self.generated
    }
}
