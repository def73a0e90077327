//! EIP-137 name hashing.

use tiny_keccak::{Hasher, Keccak};

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);
    hash
}

/// Computes the registry node of a dotted name such as `"dead.eth"`.
///
/// Labels are folded to ASCII lowercase; full UTS-46 normalisation is left to
/// the caller. The empty name hashes to the zero node.
pub fn namehash(name: &str) -> [u8; 32] {
    let mut node = [0u8; 32];
    if name.is_empty() {
        return node;
    }

    for label in name.rsplit('.') {
        let label_hash = keccak256(label.to_ascii_lowercase().as_bytes());
        let mut hasher = Keccak::v256();
        hasher.update(&node);
        hasher.update(&label_hash);
        hasher.finalize(&mut node);
    }
    node
}
