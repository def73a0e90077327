use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::unbounded;
use rand::rngs::{OsRng, StdRng};
use rand::{CryptoRng, RngCore, SeedableRng};

use ens_vanity::crypto::EntropySource;
use ens_vanity::worker::EntropyFactory;
use ens_vanity::{
    derive_address, SearchConfig, SearchCoordinator, SearchError, SearchEvent, SessionStatus,
};

/// A prefix no address will plausibly match during a test.
const NEVER: &str = "ffffffffffffffffffffffffffffffffffffffff";

/// Wraps a seeded `StdRng` and tracks how many are alive.
///
/// A gated source blocks every draw until its gate opens.
struct TrackedRng {
    inner: StdRng,
    live: Arc<AtomicUsize>,
    gate: Option<Arc<AtomicBool>>,
}

impl TrackedRng {
    fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            while !gate.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
        }
    }
}

impl RngCore for TrackedRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.wait_for_gate();
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.wait_for_gate();
        self.inner.try_fill_bytes(dest)
    }
}

impl CryptoRng for TrackedRng {}

impl Drop for TrackedRng {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The first `free` sources draw freely, later ones wait on `gate`.
fn tracked_entropy(
    live: Arc<AtomicUsize>,
    free: usize,
    gate: Arc<AtomicBool>,
) -> EntropyFactory {
    let built = Arc::new(AtomicUsize::new(0));
    Arc::new(move || -> Result<Box<dyn EntropySource>, rand::Error> {
        live.fetch_add(1, Ordering::SeqCst);
        let gated = built.fetch_add(1, Ordering::SeqCst) >= free;
        Ok(Box::new(TrackedRng {
            inner: StdRng::from_rng(OsRng)?,
            live: live.clone(),
            gate: gated.then(|| gate.clone()),
        }))
    })
}

#[test]
fn test_found_key_derives_matching_address() {
    let coordinator = SearchCoordinator::new(SearchConfig::default());
    coordinator.start("DEA").unwrap();

    let result = coordinator
        .wait_for_result(Duration::from_secs(60))
        .unwrap()
        .expect("three-digit prefix should be found");

    let address = result.address_hex();
    assert_eq!(address.len(), 42);
    assert!(address.starts_with("0xdea"));
    assert!(derive_address(&result.private_key)
        .to_hex()
        .starts_with("dea"));
    assert!(result.total_generated >= 1);
    assert_eq!(result.private_key_hex().len(), 66);
    assert_eq!(coordinator.status().status, SessionStatus::Matched);
}

#[test]
fn test_total_matches_delivered_progress() {
    let (tx, rx) = unbounded();
    let coordinator = SearchCoordinator::new(SearchConfig::new(4, 50)).with_observer(tx);
    coordinator.start(NEVER).unwrap();
    thread::sleep(Duration::from_millis(200));
    coordinator.stop();

    let last_reported = rx
        .try_iter()
        .filter_map(|event| match event {
            SearchEvent::Progress { total_generated } => Some(total_generated),
            _ => None,
        })
        .last()
        .expect("progress should be reported");

    let status = coordinator.status();
    assert_eq!(status.status, SessionStatus::Stopped);
    assert_eq!(status.total_generated, last_reported);
    assert_eq!(status.total_generated % 50, 0);
}

#[test]
fn test_progress_totals_are_monotonic() {
    let (tx, rx) = unbounded();
    let coordinator = SearchCoordinator::new(SearchConfig::new(3, 10)).with_observer(tx);
    coordinator.start(NEVER).unwrap();
    thread::sleep(Duration::from_millis(100));
    coordinator.stop();

    let totals: Vec<u64> = rx
        .try_iter()
        .filter_map(|event| match event {
            SearchEvent::Progress { total_generated } => Some(total_generated),
            _ => None,
        })
        .collect();
    assert!(!totals.is_empty());
    assert!(totals.windows(2).all(|w| w[1] == w[0] + 10));
}

#[test]
fn test_exactly_one_match_reported() {
    // Every worker matches on its first candidate.
    let (tx, rx) = unbounded();
    let coordinator = SearchCoordinator::new(SearchConfig::new(8, 100)).with_observer(tx);
    coordinator.start("").unwrap();

    let result = coordinator
        .wait_for_result(Duration::from_secs(10))
        .unwrap()
        .expect("empty prefix always matches");
    coordinator.stop();

    let matches: Vec<_> = rx
        .try_iter()
        .filter_map(|event| match event {
            SearchEvent::Matched(result) => Some(result),
            _ => None,
        })
        .collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].address, result.address);
    assert_eq!(coordinator.result().unwrap().address, result.address);
    assert_eq!(coordinator.status().status, SessionStatus::Matched);
}

#[test]
fn test_restart_disposes_previous_pool() {
    let live = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(AtomicBool::new(false));
    let (tx, rx) = unbounded();
    let coordinator = SearchCoordinator::new(SearchConfig::new(4, 100))
        .with_entropy(tracked_entropy(live.clone(), 4, gate.clone()))
        .with_observer(tx);

    coordinator.start(NEVER).unwrap();
    thread::sleep(Duration::from_millis(100));
    let first = coordinator.status();
    assert_eq!(live.load(Ordering::SeqCst), 4);

    // The second session's workers are held at their first draw, so every
    // event delivered so far belongs to the first session.
    coordinator.start(NEVER).unwrap();
    let second = coordinator.status();
    assert_eq!(second.session_id, first.session_id + 1);
    assert_eq!(second.status, SessionStatus::Running);
    assert_eq!(second.total_generated, 0);
    assert!(live.load(Ordering::SeqCst) <= 4);
    rx.try_iter().for_each(drop);

    gate.store(true, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(500));
    assert_eq!(live.load(Ordering::SeqCst), 4);

    coordinator.stop();
    assert_eq!(live.load(Ordering::SeqCst), 0);

    let totals: Vec<u64> = rx
        .try_iter()
        .filter_map(|event| match event {
            SearchEvent::Progress { total_generated } => Some(total_generated),
            _ => None,
        })
        .collect();
    assert!(!totals.is_empty());
    let expected: Vec<u64> = (1..=totals.len() as u64).map(|n| n * 100).collect();
    assert_eq!(totals, expected);
    assert_eq!(coordinator.status().total_generated, *totals.last().unwrap());
}

#[test]
fn test_restart_after_match() {
    let coordinator = SearchCoordinator::new(SearchConfig::new(2, 100));
    coordinator.start("").unwrap();
    assert!(coordinator
        .wait_for_result(Duration::from_secs(10))
        .unwrap()
        .is_some());

    coordinator.start(NEVER).unwrap();
    assert!(coordinator.result().is_none());
    assert_eq!(coordinator.status().status, SessionStatus::Running);
    coordinator.stop();
    assert_eq!(coordinator.status().status, SessionStatus::Stopped);
}

#[test]
fn test_stop_is_final() {
    let (tx, rx) = unbounded();
    let coordinator = SearchCoordinator::new(SearchConfig::new(2, 100)).with_observer(tx);
    coordinator.start("00").unwrap();
    coordinator.stop();

    let status = coordinator.status();
    if status.status == SessionStatus::Stopped {
        thread::sleep(Duration::from_millis(50));
        assert!(coordinator.result().is_none());
        assert!(rx
            .try_iter()
            .all(|event| !matches!(event, SearchEvent::Matched(_))));
        assert_eq!(coordinator.status(), status);
    } else {
        // The match won the race against stop; it must still be the only one.
        assert_eq!(status.status, SessionStatus::Matched);
        assert!(coordinator.result().is_some());
    }
}

#[test]
fn test_invalid_prefix_keeps_running_session() {
    let coordinator = SearchCoordinator::new(SearchConfig::new(1, 100));
    coordinator.start(NEVER).unwrap();
    assert!(matches!(
        coordinator.start("0xnope"),
        Err(SearchError::InvalidPrefix(_))
    ));
    assert_eq!(coordinator.status().status, SessionStatus::Running);
    coordinator.stop();
}

#[test]
fn test_partial_failure_keeps_searching() {
    let calls = Arc::new(AtomicUsize::new(0));
    let factory: EntropyFactory = {
        let calls = calls.clone();
        Arc::new(move || -> Result<Box<dyn EntropySource>, rand::Error> {
            // The first worker to ask for entropy gets none.
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(rand::Error::new("seed unavailable"));
            }
            Ok(Box::new(StdRng::from_rng(OsRng)?))
        })
    };
    let (tx, rx) = unbounded();
    let coordinator = SearchCoordinator::new(SearchConfig::new(3, 100))
        .with_entropy(factory)
        .with_observer(tx);
    coordinator.start("a").unwrap();

    let result = coordinator
        .wait_for_result(Duration::from_secs(30))
        .unwrap()
        .expect("remaining workers still find a match");
    assert!(result.address_hex().starts_with("0xa"));
    coordinator.stop();

    let failures = rx
        .try_iter()
        .filter(|event| matches!(event, SearchEvent::WorkerFailed { .. }))
        .count();
    assert_eq!(failures, 1);
    let status = coordinator.status();
    assert_eq!(status.workers, 3);
    assert_eq!(status.live_workers, 0);
}
