//! Ethereum address representation.

use std::fmt;
use std::str::FromStr;

use tiny_keccak::{Hasher, Keccak};

/// A 20-byte Ethereum address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// The all-zero address, used by registries to mean "no owner".
    pub const ZERO: Address = Address([0u8; 20]);

    #[inline]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the `index`-th hex digit (0..40) of the address as a value 0..16.
    #[inline]
    pub fn nibble(&self, index: usize) -> u8 {
        let byte = self.0[index / 2];
        if index % 2 == 0 {
            byte >> 4
        } else {
            byte & 0x0f
        }
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Lowercase hex, 40 characters, no `0x` marker.
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Lowercase hex with the `0x` marker.
    pub fn to_hex_prefixed(&self) -> String {
        format!("0x{}", self.to_hex())
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn to_checksum(&self) -> String {
        let hex_addr = self.to_hex();
        let mut hasher = Keccak::v256();
        hasher.update(hex_addr.as_bytes());
        let mut hash = [0u8; 32];
        hasher.finalize(&mut hash);

        let mut checksum = String::with_capacity(42);
        checksum.push_str("0x");

        for (i, c) in hex_addr.chars().enumerate() {
            let hash_nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };

            if c.is_ascii_alphabetic() && hash_nibble >= 8 {
                checksum.push(c.to_ascii_uppercase());
            } else {
                checksum.push(c);
            }
        }

        checksum
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseAddressError {
    #[error("address must be 40 hex characters, got {0}")]
    Length(usize),

    #[error("invalid hex in address: {0}")]
    Hex(#[from] hex::FromHexError),
}

impl FromStr for Address {
    type Err = ParseAddressError;

    /// Parses 40 hex digits with or without a `0x` marker, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != 40 {
            return Err(ParseAddressError::Length(digits.len()));
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_address() {
        // EIP-55 test vector
        let addr: Address = "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        assert_eq!(addr.to_checksum(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn test_hex_output() {
        assert_eq!(Address::ZERO.to_hex(), "0000000000000000000000000000000000000000");
        assert_eq!(
            Address::ZERO.to_hex_prefixed(),
            "0x0000000000000000000000000000000000000000"
        );
        assert!(Address::ZERO.is_zero());
    }

    #[test]
    fn test_nibbles() {
        let addr: Address = "0xDEadbeef00000000000000000000000000000001".parse().unwrap();
        assert_eq!(addr.nibble(0), 0xd);
        assert_eq!(addr.nibble(1), 0xe);
        assert_eq!(addr.nibble(7), 0xf);
        assert_eq!(addr.nibble(39), 0x1);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "0xdead".parse::<Address>(),
            Err(ParseAddressError::Length(4))
        ));
        assert!(matches!(
            "zz00000000000000000000000000000000000000".parse::<Address>(),
            Err(ParseAddressError::Hex(_))
        ));
    }
}
