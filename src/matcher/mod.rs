//! Prefix matching for Ethereum addresses.
//!
//! Matching is case-insensitive and works directly on address nibbles, so the
//! search loop never allocates a hex string per candidate.

mod prefix;

pub use prefix::{matches, Prefix, MAX_PREFIX_LEN};
