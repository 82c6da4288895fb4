//! Checksummed account addresses (EIP-55).
//!
//! Wallet providers hand back account identifiers in whatever case they
//! like. Everything the session layer persists or sends to the hub goes
//! through [`Address::parse`] first, so the stored form is always the
//! mixed-case checksum encoding.
//!
//! # Encoding
//!
//! ```text
//! hash = keccak256(lowercase hex digits, without "0x")
//! for each hex letter at position i: uppercase iff nibble i of hash >= 8
//! ```

use std::sync::OnceLock;

use regex::Regex;
use sha3::{Digest, Keccak256};
use thiserror::Error;

/// Errors that can occur when parsing an account address.
#[derive(Debug, Error, PartialEq)]
pub enum AddressError {
    #[error("address must start with '0x': '{0}'")]
    MissingPrefix(String),

    #[error("address must be 40 hex digits after '0x': '{0}'")]
    InvalidFormat(String),
}

/// A 20-byte account address held in its checksummed string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

fn hex_body() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{40}$").expect("static regex"))
}

impl Address {
    /// Parse an address in any letter case and normalise it to EIP-55.
    ///
    /// The input checksum is not verified; providers are trusted to return
    /// the account they were asked for.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressError::MissingPrefix(s.to_string()))?;

        if !hex_body().is_match(body) {
            return Err(AddressError::InvalidFormat(s.to_string()));
        }

        Ok(Self(checksum_body(&body.to_ascii_lowercase())))
    }

    /// The checksummed `0x…` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Convenience wrapper: parse `s` and return the checksummed string.
pub fn to_checksum_address(s: &str) -> Result<String, AddressError> {
    Address::parse(s).map(Address::into_string)
}

/// `true` if `s` is already in its exact EIP-55 form.
pub fn is_checksummed(s: &str) -> bool {
    matches!(Address::parse(s), Ok(a) if a.as_str() == s)
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn checksum_body(lower: &str) -> String {
    let mut hasher = Keccak256::new();
    hasher.update(lower.as_bytes());
    let digest = hex::encode(hasher.finalize());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (c, h) in lower.chars().zip(digest.chars()) {
        let nibble = h.to_digit(16).unwrap_or(0);
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // Vectors from EIP-55.
    const VECTORS: &[&str] = &[
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn lowercase_input_is_checksummed() {
        for v in VECTORS {
            let lower = v.to_ascii_lowercase();
            assert_eq!(to_checksum_address(&lower).unwrap(), *v);
        }
    }

    #[test]
    fn uppercase_input_is_checksummed() {
        for v in VECTORS {
            let upper = format!("0x{}", v[2..].to_ascii_uppercase());
            assert_eq!(Address::parse(&upper).unwrap().as_str(), *v);
        }
    }

    #[test]
    fn is_checksummed_detects_exact_form() {
        assert!(is_checksummed(VECTORS[0]));
        assert!(!is_checksummed(&VECTORS[0].to_ascii_lowercase()));
    }

    #[test]
    fn missing_prefix() {
        let raw = "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
        assert_eq!(
            Address::parse(raw),
            Err(AddressError::MissingPrefix(raw.into()))
        );
    }

    #[test]
    fn wrong_length() {
        assert!(matches!(
            Address::parse("0xABC"),
            Err(AddressError::InvalidFormat(_))
        ));
    }

    #[test]
    fn non_hex_digit() {
        assert!(matches!(
            Address::parse("0xzaaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
            Err(AddressError::InvalidFormat(_))
        ));
    }

    #[test]
    fn surrounding_whitespace_ignored() {
        let padded = format!("  {}\n", VECTORS[1].to_ascii_lowercase());
        assert_eq!(Address::parse(&padded).unwrap().as_str(), VECTORS[1]);
    }
}
