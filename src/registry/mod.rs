//! ENS name availability.
//!
//! The search engine never talks to the registry itself. Callers confirm a
//! name is free through a [`NameRegistry`] implementation (for example an RPC
//! client reading `owner(bytes32)` of the registry contract) before they
//! start searching for the matching address.

mod namehash;

pub use namehash::namehash;

use std::collections::HashMap;

use crate::crypto::Address;

/// The ENS registry contract on Ethereum mainnet.
pub const ENS_REGISTRY_ADDRESS: &str = "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e";

/// Top-level domain searched names are registered under.
pub const TLD: &str = "eth";

/// Names need at least this many UTF-16 code units to be registrable.
pub const MIN_NAME_LEN: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Registry lookup failed: {0}")]
    Lookup(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Read access to the owner records of a name registry.
pub trait NameRegistry {
    /// Owner recorded for `node`; the zero address when unowned.
    fn owner(&self, node: &[u8; 32]) -> Result<Address, RegistryError>;
}

/// An in-memory registry; nodes without an entry are unowned.
impl NameRegistry for HashMap<[u8; 32], Address> {
    fn owner(&self, node: &[u8; 32]) -> Result<Address, RegistryError> {
        Ok(self.get(node).copied().unwrap_or(Address::ZERO))
    }
}

/// Outcome of an availability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
    pub message: String,
}

/// Checks whether `label` (without the `.eth` suffix) can be registered.
///
/// A name is available when it has at least [`MIN_NAME_LEN`] UTF-16 code
/// units (an emoji outside the BMP counts twice) and
/// the registry records no owner for `namehash(label + ".eth")`. Names that
/// are too short are rejected without a lookup.
pub fn check_availability<R>(registry: &R, label: &str) -> Result<Availability, RegistryError>
where
    R: NameRegistry + ?Sized,
{
    let available = if label.encode_utf16().count() < MIN_NAME_LEN {
        false
    } else {
        let node = namehash(&format!("{}.{}", label, TLD));
        let owner = registry.owner(&node)?;
        tracing::debug!(label, owner = %owner, "registry owner lookup");
        owner.is_zero()
    };

    let message = if available {
        "ENS name is available!"
    } else {
        "ENS name is not available."
    };

    Ok(Availability {
        available,
        message: message.into(),
    })
}
