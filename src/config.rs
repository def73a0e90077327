//! Runtime configuration for the vanity address search.

use clap::Parser;

use crate::matcher::Prefix;

/// Worker threads started per search unless configured otherwise.
pub const DEFAULT_WORKERS: usize = 8;

/// Candidates a worker generates between two progress reports.
pub const DEFAULT_BATCH_SIZE: u64 = 100;

/// ENS Vanity Address Search
///
/// Searches for a private key whose Ethereum address starts with the given
/// hex prefix, typically the hex spelling of an ENS name.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Prefix to search for (hex characters only: 0-9, a-f; a pasted leading 0x is dropped)
    #[arg(short, long)]
    pub prefix: String,

    /// Number of worker threads (0 = one per CPU core)
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Candidates each worker generates between progress reports
    #[arg(short = 'b', long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: u64,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "1")]
    pub report_interval: u64,

    /// Log filter used when RUST_LOG is not set (e.g. "info", "ens_vanity=debug")
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Config {
    /// Returns the number of workers, resolving 0 to the CPU count.
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }

    /// The prefix digits with a pasted `0x`/`0X` marker removed.
    pub fn prefix_digits(&self) -> &str {
        self.prefix
            .strip_prefix("0x")
            .or_else(|| self.prefix.strip_prefix("0X"))
            .unwrap_or(&self.prefix)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Prefix::parse(self.prefix_digits()).map_err(|e| ConfigError::InvalidPrefix(e.to_string()))?;

        if self.report_interval == 0 {
            return Err(ConfigError::InvalidValue(
                "Report interval must be at least one second".into(),
            ));
        }

        self.search_config().validate()
    }

    /// Engine settings derived from the command line.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            workers: self.worker_count(),
            batch_size: self.batch_size,
        }
    }
}

/// Tuning knobs of the search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Worker threads per search session
    pub workers: usize,
    /// Candidates between progress events of one worker
    pub batch_size: u64,
}

impl SearchConfig {
    pub fn new(workers: usize, batch_size: u64) -> Self {
        Self {
            workers,
            batch_size,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidValue(
                "At least one worker is required".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue(
                "Batch size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS, DEFAULT_BATCH_SIZE)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
