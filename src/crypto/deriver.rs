//! Private key generation and address derivation.

use std::fmt;

use rand::{CryptoRng, RngCore};
use secp256k1::{PublicKey, Secp256k1, SecretKey, SignOnly, Signing};
use tiny_keccak::{Hasher, Keccak};

use super::Address;
use crate::error::KeyError;

/// A cryptographically secure random source private keys are drawn from.
pub trait EntropySource: RngCore + CryptoRng {}

impl<T: RngCore + CryptoRng> EntropySource for T {}

/// A valid secp256k1 private key.
///
/// `Debug` never prints the key material; use [`PrivateKey::to_hex_prefixed`]
/// when the key has to be shown to its owner.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PrivateKey(SecretKey);

impl PrivateKey {
    /// Validates 32 big-endian bytes as a scalar in `1..n`.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        SecretKey::from_slice(&bytes)
            .map(Self)
            .map_err(|_| KeyError::InvalidScalar)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.secret_bytes()
    }

    /// Lowercase hex with the `0x` marker.
    pub fn to_hex_prefixed(&self) -> String {
        format!("0x{}", hex::encode(self.0.secret_bytes()))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// A generated private key together with its address.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    private_key: PrivateKey,
    address: Address,
}

impl Candidate {
    #[inline]
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// Draws private keys from an entropy source and derives their addresses.
///
/// The deriver keeps a signing-only secp256k1 context so that the tight
/// search loop does not rebuild precomputed tables per key.
pub struct KeyDeriver<R> {
    secp: Secp256k1<SignOnly>,
    rng: R,
}

impl<R: RngCore + CryptoRng> KeyDeriver<R> {
    pub fn new(rng: R) -> Self {
        Self {
            secp: Secp256k1::signing_only(),
            rng,
        }
    }
}

impl KeyDeriver<Box<dyn EntropySource>> {
    /// Builds a deriver around a type-erased entropy source.
    pub fn from_boxed(rng: Box<dyn EntropySource>) -> Self {
        Self {
            secp: Secp256k1::signing_only(),
            rng,
        }
    }
}

impl<R: RngCore> KeyDeriver<R> {
    /// Draws a fresh private key.
    ///
    /// Draws that are zero or not below the curve order are discarded and
    /// redrawn; only a failing entropy source is reported.
    pub fn generate_key(&mut self) -> Result<PrivateKey, KeyError> {
        let mut bytes = [0u8; 32];
        loop {
            self.rng.try_fill_bytes(&mut bytes)?;
            match PrivateKey::from_bytes(bytes) {
                Err(KeyError::InvalidScalar) => continue,
                result => return result,
            }
        }
    }

    /// Derives the address of `key` using this deriver's context.
    #[inline]
    pub fn derive_address(&self, key: &PrivateKey) -> Address {
        address_with(&self.secp, key)
    }

    /// Generates a key and derives its address in one step.
    #[inline]
    pub fn next_candidate(&mut self) -> Result<Candidate, KeyError> {
        let private_key = self.generate_key()?;
        let address = self.derive_address(&private_key);
        Ok(Candidate {
            private_key,
            address,
        })
    }
}

/// Derives the Ethereum address of `key`.
///
/// Builds a one-off secp256k1 context; hot loops should go through
/// [`KeyDeriver::derive_address`] instead.
pub fn derive_address(key: &PrivateKey) -> Address {
    address_with(&Secp256k1::signing_only(), key)
}

/// Keccak-256 over the 64-byte uncompressed public key (without the 0x04
/// tag), keeping the last 20 bytes.
#[inline]
fn address_with<C: Signing>(secp: &Secp256k1<C>, key: &PrivateKey) -> Address {
    let public_key = PublicKey::from_secret_key(secp, &key.0);
    let serialized = public_key.serialize_uncompressed();

    let mut hasher = Keccak::v256();
    hasher.update(&serialized[1..]);
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Address::from_bytes(address)
}
