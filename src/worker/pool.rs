//! Worker thread management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use rand::rngs::{OsRng, StdRng};
use rand::SeedableRng;

use crate::crypto::{EntropySource, KeyDeriver};
use crate::error::{KeyError, SearchError};
use crate::matcher::Prefix;

use super::search::{SearchWorker, WorkerEvent, WorkerState};

/// Builds the entropy source of one worker. Called on the worker's own thread.
pub type EntropyFactory =
    Arc<dyn Fn() -> Result<Box<dyn EntropySource>, rand::Error> + Send + Sync>;

/// Each worker gets its own `StdRng` seeded from the operating system.
pub fn os_entropy() -> EntropyFactory {
    Arc::new(|| -> Result<Box<dyn EntropySource>, rand::Error> {
        let rng = StdRng::from_rng(OsRng)?;
        Ok(Box::new(rng) as Box<dyn EntropySource>)
    })
}

/// A set of running worker threads sharing one stop flag.
pub struct WorkerPool {
    /// Worker thread handles
    handles: Vec<JoinHandle<WorkerState>>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Spawns `num_workers` threads searching for `prefix`.
    ///
    /// Every worker gets its own clone of `events`. If a thread cannot be
    /// spawned, the workers already running are stopped and joined.
    pub fn spawn(
        num_workers: usize,
        prefix: &Prefix,
        batch_size: u64,
        entropy: &EntropyFactory,
        events: Sender<WorkerEvent>,
        stop_flag: Arc<AtomicBool>,
    ) -> Result<Self, SearchError> {
        let mut pool = Self {
            handles: Vec::with_capacity(num_workers),
            stop_flag,
        };

        for id in 0..num_workers {
            let prefix = prefix.clone();
            let entropy = entropy.clone();
            let events = events.clone();
            let stop_flag = pool.stop_flag.clone();

            let handle = thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || {
                    let rng = match entropy() {
                        Ok(rng) => rng,
                        Err(e) => {
                            let _ = events.send(WorkerEvent::Failed {
                                worker_id: id,
                                error: KeyError::from(e),
                            });
                            return WorkerState::Failed;
                        }
                    };
                    let deriver = KeyDeriver::from_boxed(rng);
                    SearchWorker::new(id, prefix, batch_size, deriver, events, stop_flag).run()
                })?;
            pool.handles.push(handle);
        }

        Ok(pool)
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
    }

    /// Stops and joins every worker, returning the states they ended in.
    ///
    /// A worker that panicked is reported as [`WorkerState::Failed`].
    pub fn shutdown(&mut self) -> Vec<WorkerState> {
        self.stop();
        self.handles
            .drain(..)
            .map(|handle| handle.join().unwrap_or(WorkerState::Failed))
            .collect()
    }

    /// Number of threads not yet joined.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
