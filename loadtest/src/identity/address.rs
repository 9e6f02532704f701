//! # Account Addresses
//!
//! An address is derived from an Ed25519 public key the same way the chain
//! derives it, then Bech32-encoded with the chain's prefix:
//!
//! ```text
//! public_key (32 bytes)
//!     -> SHA-256(public_key)[..20]
//!     -> Bech32("manifest", hash) -> manifest1qw508d6qe...
//! ```
//!
//! Addresses serialize as their Bech32 string, which is what the transfer
//! message carries on the wire.

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{ADDRESS_HRP, ADDRESS_LENGTH};
use crate::crypto::hash::sha256_array;
use crate::crypto::keys::PublicKey;

/// Errors that can occur while parsing an address.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The Bech32 string could not be decoded.
    #[error("bech32 decode error: {0}")]
    Bech32Decode(String),

    /// The decoded address has an unexpected human-readable prefix.
    #[error("invalid HRP: expected '{expected}', got '{got}'")]
    InvalidHrp { expected: String, got: String },

    /// The decoded data has an unexpected length.
    #[error("invalid address data length: expected {expected} bytes, got {got}")]
    InvalidDataLength { expected: usize, got: usize },
}

/// A chain account address.
///
/// # Examples
///
/// ```
/// use ledger_loadtest::crypto::Keypair;
/// use ledger_loadtest::identity::Address;
///
/// let kp = Keypair::generate();
/// let address = Address::from_public_key(&kp.public_key());
/// let encoded = address.to_string();
/// assert!(encoded.starts_with("manifest1"));
/// assert_eq!(encoded.parse::<Address>().unwrap(), address);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    bytes: [u8; ADDRESS_LENGTH],
}

impl Address {
    /// Derive the address owned by a public key.
    pub fn from_public_key(pk: &PublicKey) -> Self {
        let digest = sha256_array(pk.as_bytes());
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest[..ADDRESS_LENGTH]);
        Self { bytes }
    }

    /// Wrap raw address bytes.
    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.bytes
    }

    /// Parse a Bech32 address, checking prefix, checksum and length.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let (hrp, data) =
            bech32::decode(s).map_err(|e| AddressError::Bech32Decode(e.to_string()))?;

        if hrp != hrp_prefix() {
            return Err(AddressError::InvalidHrp {
                expected: ADDRESS_HRP.to_string(),
                got: hrp.to_string(),
            });
        }

        let bytes: [u8; ADDRESS_LENGTH] =
            data.as_slice()
                .try_into()
                .map_err(|_| AddressError::InvalidDataLength {
                    expected: ADDRESS_LENGTH,
                    got: data.len(),
                })?;

        Ok(Self { bytes })
    }
}

fn hrp_prefix() -> Hrp {
    Hrp::parse_unchecked(ADDRESS_HRP)
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        bech32::encode_to_fmt::<Bech32, _>(f, hrp_prefix(), &self.bytes).map_err(|_| fmt::Error)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
