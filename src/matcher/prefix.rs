//! Hex prefix matching.

use std::fmt;
use std::str::FromStr;

use crate::crypto::Address;
use crate::error::SearchError;

/// Number of hex digits in an address.
pub const MAX_PREFIX_LEN: usize = 40;

/// A validated, lowercase hex prefix of at most 40 digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    /// Normalized text, lowercase
    text: String,
    /// One value per hex digit, 0..16
    nibbles: Vec<u8>,
}

impl Prefix {
    /// Validates `digits` as a hex prefix.
    ///
    /// Every character must be a hex digit, so a `0x` marker is rejected.
    /// Digits are case-insensitive.
    pub fn parse(digits: &str) -> Result<Self, SearchError> {
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(SearchError::InvalidPrefix(format!(
                "{:?} is not a hex digit (0-9, a-f)",
                bad
            )));
        }

        if digits.len() > MAX_PREFIX_LEN {
            return Err(SearchError::InvalidPrefix(format!(
                "prefix has {} digits, an address only has {}",
                digits.len(),
                MAX_PREFIX_LEN
            )));
        }

        let text = digits.to_ascii_lowercase();
        let nibbles = text
            .bytes()
            .map(|b| match b {
                b'0'..=b'9' => b - b'0',
                _ => b - b'a' + 10,
            })
            .collect();

        Ok(Self { text, nibbles })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.nibbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nibbles.is_empty()
    }

    /// Returns true if the lowercase hex form of `address` starts with this prefix.
    #[inline]
    pub fn matches(&self, address: &Address) -> bool {
        self.nibbles
            .iter()
            .enumerate()
            .all(|(i, &nibble)| address.nibble(i) == nibble)
    }
}

impl FromStr for Prefix {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Case-insensitive prefix test on the hex form of `address`.
///
/// An empty prefix always matches; a prefix that is not valid hex never does.
pub fn matches(address: &Address, prefix: &str) -> bool {
    address
        .to_hex()
        .starts_with(prefix.to_ascii_lowercase().as_str())
}
