//! Error types for key derivation and search sessions.

use crate::config::ConfigError;

/// Errors raised while producing a candidate key.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// The random source failed to produce bytes.
    #[error("Entropy source unavailable: {0}")]
    EntropyUnavailable(#[from] rand::Error),

    /// The bytes are zero or not below the secp256k1 group order.
    #[error("Invalid secp256k1 scalar")]
    InvalidScalar,
}

/// Errors surfaced to the caller of a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    /// Every worker of the session aborted.
    #[error("Search exhausted: all {workers} worker(s) failed")]
    SearchExhausted { workers: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to spawn search thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
