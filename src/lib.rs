//! # ens_vanity
//!
//! Parallel search for Ethereum vanity addresses, meant to pair an address
//! with an ENS name spelled in hex.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation and address derivation
//! - `matcher`: Hex prefix matching
//! - `worker`: Search loop and worker threads
//! - `coordinator`: Session lifecycle, progress aggregation, first-match-wins
//! - `registry`: ENS name availability rule
//! - `config`: Runtime configuration

pub mod config;
pub mod coordinator;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod registry;
pub mod worker;

pub use config::{Config, SearchConfig};
pub use coordinator::{
    MatchResult, SearchCoordinator, SearchEvent, SearchObserver, SessionSnapshot, SessionStatus,
};
pub use crypto::{derive_address, Address, Candidate, KeyDeriver, PrivateKey};
pub use error::{KeyError, SearchError};
pub use matcher::Prefix;
pub use registry::{check_availability, namehash, Availability, NameRegistry};
