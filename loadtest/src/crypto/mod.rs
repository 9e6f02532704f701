//! # Cryptographic Primitives
//!
//! Everything the generator needs to prove a transfer came from its sender:
//!
//! - **Ed25519** for signatures. Deterministic: a seeded run signs the
//!   same bytes the same way every time.
//! - **SHA-256** for address derivation and transaction hashes.
//!
//! Everything here is a thin, type-safe wrapper around `ed25519-dalek` and
//! `sha2`. Private key bytes never leave [`keys::Keypair`].

pub mod hash;
pub mod keys;

pub use hash::{sha256, sha256_array, sha256_multi};
pub use keys::{Keypair, PublicKey, Signature};
