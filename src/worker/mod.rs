//! Parallel candidate generation.
//!
//! This module provides:
//! - The per-thread search loop (`SearchWorker`)
//! - Typed events workers send to the coordinator
//! - Thread spawning, cancellation and joining (`WorkerPool`)

mod pool;
mod search;

pub use pool::{os_entropy, EntropyFactory, WorkerPool};
pub use search::{SearchWorker, WorkerEvent, WorkerState};
