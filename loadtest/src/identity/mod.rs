//! # Identity Module
//!
//! Who signs and who receives. Two layers:
//!
//! 1. **Address** — SHA-256-truncated public key, Bech32-encoded with the
//!    chain prefix. This is what the transfer message carries.
//! 2. **Key store** — resolves an alias such as `user1` to an [`Identity`]:
//!    address, public key, and a [`SigningCapability`]. The private key
//!    itself never leaves the capability.

pub mod address;
pub mod keyring;

pub use address::{Address, AddressError};
pub use keyring::{dev_keypair, Identity, KeyLookupError, KeyStore, MemoryKeyStore, SigningCapability};
