//! Key generation and Ethereum address derivation.
//!
//! - Private keys are drawn from a caller-supplied CSPRNG and checked against
//!   the secp256k1 group order
//! - Addresses are the last 20 bytes of Keccak-256 over the public key

mod address;
mod deriver;

pub use address::{Address, ParseAddressError};
pub use deriver::{derive_address, Candidate, EntropySource, KeyDeriver, PrivateKey};
