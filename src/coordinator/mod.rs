//! Search session orchestration.
//!
//! The coordinator owns at most one worker pool at a time. All worker events
//! of a session flow through one channel into a single aggregator thread,
//! which is the only writer of progress and match state. That makes the
//! running total and the first-match-wins decision race-free without any
//! shared state between workers.

mod observer;
mod session;

pub use observer::{NoopObserver, SearchEvent, SearchObserver};
pub use session::{MatchResult, SessionSnapshot, SessionStatus};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::matcher::Prefix;
use crate::worker::{os_entropy, EntropyFactory, WorkerEvent, WorkerPool};

use session::SearchSession;

/// Capacity of the worker → aggregator channel.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Session state shared with the aggregator thread.
struct Shared {
    session: Mutex<SearchSession>,
    /// Signalled whenever the session leaves `Running`
    changed: Condvar,
}

impl Shared {
    fn session(&self) -> MutexGuard<'_, SearchSession> {
        lock(&self.session)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Threads belonging to one session.
struct ActiveSearch {
    pool: WorkerPool,
    aggregator: Option<JoinHandle<()>>,
}

impl ActiveSearch {
    /// Stops and joins the workers, then the aggregator once it has drained
    /// the channel.
    fn shutdown(&mut self) {
        self.pool.shutdown();
        if let Some(handle) = self.aggregator.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ActiveSearch {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runs vanity searches on a pool of worker threads.
pub struct SearchCoordinator {
    config: SearchConfig,
    entropy: EntropyFactory,
    observer: Arc<dyn SearchObserver>,
    shared: Arc<Shared>,
    /// The live pool, if any. Held across start/stop so lifecycle calls
    /// from different threads are serialized.
    active: Mutex<Option<ActiveSearch>>,
}

impl SearchCoordinator {
    /// Creates a coordinator whose workers seed from the operating system.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            entropy: os_entropy(),
            observer: Arc::new(NoopObserver),
            shared: Arc::new(Shared {
                session: Mutex::new(SearchSession::default()),
                changed: Condvar::new(),
            }),
            active: Mutex::new(None),
        }
    }

    /// Replaces the per-worker entropy source.
    pub fn with_entropy(mut self, entropy: EntropyFactory) -> Self {
        self.entropy = entropy;
        self
    }

    /// Subscribes `observer` to progress, match and failure notifications.
    pub fn with_observer(mut self, observer: impl SearchObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Starts a new search for `prefix`.
    ///
    /// An invalid prefix fails before anything is spawned. A previous search
    /// is stopped and its threads joined before the new workers start.
    pub fn start(&self, prefix: &str) -> Result<()> {
        let prefix = Prefix::parse(prefix)?;
        self.config.validate()?;

        let mut active = lock(&self.active);
        if let Some(mut previous) = active.take() {
            if self.shared.session().stop() {
                self.shared.changed.notify_all();
                tracing::info!("stopping previous search before restart");
            }
            previous.shutdown();
        }

        let session_id = self.shared.session().begin(prefix.clone(), self.config.workers);
        tracing::info!(
            session = session_id,
            prefix = %prefix,
            workers = self.config.workers,
            batch_size = self.config.batch_size,
            "search started"
        );

        match self.launch(session_id, &prefix) {
            Ok(search) => {
                *active = Some(search);
                Ok(())
            }
            Err(e) => {
                self.shared.session().stop();
                self.shared.changed.notify_all();
                tracing::error!(session = session_id, error = %e, "failed to start search");
                Err(e)
            }
        }
    }

    fn launch(&self, session_id: u64, prefix: &Prefix) -> Result<ActiveSearch> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let (events_tx, events_rx) = bounded(EVENT_CHANNEL_CAPACITY);

        let aggregator = {
            let shared = self.shared.clone();
            let observer = self.observer.clone();
            let stop_flag = stop_flag.clone();
            thread::Builder::new()
                .name("vanity-aggregator".into())
                .spawn(move || aggregate(session_id, events_rx, &shared, &*observer, &stop_flag))?
        };

        match WorkerPool::spawn(
            self.config.workers,
            prefix,
            self.config.batch_size,
            &self.entropy,
            events_tx,
            stop_flag,
        ) {
            Ok(pool) => Ok(ActiveSearch {
                pool,
                aggregator: Some(aggregator),
            }),
            Err(e) => {
                // All senders are gone once the partial pool is joined.
                let _ = aggregator.join();
                Err(e)
            }
        }
    }

    /// Stops a running search and joins its threads.
    ///
    /// The total and elapsed time keep their last values. Does nothing to the
    /// session if it is not running.
    pub fn stop(&self) {
        let mut active = lock(&self.active);
        {
            let mut session = self.shared.session();
            if session.stop() {
                tracing::info!(
                    session = session.id,
                    total_generated = session.total_generated(),
                    elapsed_ms = session.elapsed().as_millis() as u64,
                    "search stopped"
                );
                self.shared.changed.notify_all();
            }
        }
        if let Some(mut search) = active.take() {
            search.shutdown();
        }
    }

    /// Current session state.
    pub fn status(&self) -> SessionSnapshot {
        self.shared.session().snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.shared.session().is_running()
    }

    pub fn total_generated(&self) -> u64 {
        self.shared.session().total_generated()
    }

    /// The match of the current session, if it has one.
    pub fn result(&self) -> Option<MatchResult> {
        self.shared.session().result().cloned()
    }

    /// Blocks until the session leaves `Running` or `timeout` expires.
    ///
    /// Returns `Ok(Some(_))` on a match, `Ok(None)` on timeout or when the
    /// session was stopped (or never started), and
    /// [`SearchError::SearchExhausted`] if every worker failed.
    pub fn wait_for_result(&self, timeout: Duration) -> Result<Option<MatchResult>> {
        let deadline = Instant::now() + timeout;
        let mut session = self.shared.session();
        loop {
            match session.status {
                SessionStatus::Matched => return Ok(session.result().cloned()),
                SessionStatus::Exhausted => {
                    return Err(SearchError::SearchExhausted {
                        workers: session.workers(),
                    })
                }
                SessionStatus::Idle | SessionStatus::Stopped => return Ok(None),
                SessionStatus::Running => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            session = self
                .shared
                .changed
                .wait_timeout(session, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Average generation rate of the current session.
    pub fn keys_per_second(&self) -> f64 {
        let snapshot = self.status();
        let elapsed = snapshot.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            snapshot.total_generated as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Consumes worker events until every worker has dropped its sender.
///
/// Events are applied only while session `session_id` is running; anything
/// arriving after a stop, a match or a restart is discarded.
fn aggregate(
    session_id: u64,
    events: Receiver<WorkerEvent>,
    shared: &Shared,
    observer: &dyn SearchObserver,
    stop_flag: &AtomicBool,
) {
    for event in events.iter() {
        match event {
            WorkerEvent::Progress { worker_id, delta } => {
                let total = {
                    let mut session = shared.session();
                    if session.id != session_id {
                        continue;
                    }
                    session.record_progress(worker_id, delta)
                };
                if let Some(total) = total {
                    observer.on_progress(total);
                }
            }
            WorkerEvent::Found {
                worker_id,
                candidate,
                count,
            } => {
                let result = {
                    let mut session = shared.session();
                    if session.id != session_id {
                        continue;
                    }
                    let result = session.record_match(worker_id, &candidate, count);
                    if result.is_some() {
                        stop_flag.store(true, Ordering::Release);
                        shared.changed.notify_all();
                    }
                    result
                };
                match result {
                    Some(result) => {
                        tracing::info!(
                            session = session_id,
                            worker_id,
                            address = %result.address,
                            total_generated = result.total_generated,
                            elapsed_ms = result.elapsed_millis(),
                            "match found"
                        );
                        observer.on_match(&result);
                    }
                    None => {
                        tracing::debug!(session = session_id, worker_id, "discarding late match");
                    }
                }
            }
            WorkerEvent::Failed { worker_id, error } => {
                tracing::warn!(session = session_id, worker_id, %error, "worker aborted");
                let exhausted = {
                    let mut session = shared.session();
                    if session.id != session_id {
                        continue;
                    }
                    let exhausted = session.record_failure();
                    if exhausted {
                        shared.changed.notify_all();
                    }
                    exhausted
                };
                observer.on_worker_failed(worker_id, &error);
                if exhausted {
                    tracing::error!(session = session_id, "all workers failed, search exhausted");
                    observer.on_exhausted();
                }
            }
        }
    }
    tracing::debug!(session = session_id, "aggregator finished");
}
