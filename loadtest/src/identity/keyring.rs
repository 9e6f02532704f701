//! Key store seam: alias -> [`Identity`].
//!
//! The generator never touches raw private keys. It asks a [`KeyStore`] for
//! an identity by alias and receives an address, a public key, and a
//! [`SigningCapability`] that can sign payloads on the key's behalf. Local
//! Ed25519 keys, a remote signer, or a hardware wallet all fit behind the
//! same trait.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::address::Address;
use crate::crypto::hash::sha256_multi;
use crate::crypto::keys::{Keypair, PublicKey, Signature};
use crate::transaction::signing::SigningError;

/// Domain tag for deterministic development keys.
const DEV_KEY_TAG: &[u8] = b"ledger-loadtest/dev-key/";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while resolving an identity.
#[derive(Debug, Error)]
pub enum KeyLookupError {
    /// No key is stored under the alias.
    #[error("no key found for alias '{alias}'")]
    NotFound { alias: String },

    /// The stored public key does not belong to the stored signing key.
    #[error("public key for alias '{alias}' does not match its signing key")]
    KeyMismatch { alias: String },

    /// The backing store failed (remote keyring unreachable, locked, ...).
    #[error("key store backend failed for alias '{alias}': {reason}")]
    Backend { alias: String, reason: String },
}

// ---------------------------------------------------------------------------
// SigningCapability
// ---------------------------------------------------------------------------

/// Something that can sign on behalf of exactly one key pair.
///
/// Implementations must be safe to call from several threads at once.
pub trait SigningCapability: Send + Sync {
    /// The public key whose private half produces the signatures.
    fn public_key(&self) -> PublicKey;

    /// Sign an opaque payload.
    fn sign(&self, payload: &[u8]) -> Result<Signature, SigningError>;
}

impl SigningCapability for Keypair {
    fn public_key(&self) -> PublicKey {
        Keypair::public_key(self)
    }

    fn sign(&self, payload: &[u8]) -> Result<Signature, SigningError> {
        Ok(Keypair::sign(self, payload))
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A resolved alias: address, public key, and the capability to sign.
#[derive(Clone)]
pub struct Identity {
    alias: String,
    address: Address,
    public_key: PublicKey,
    signer: Arc<dyn SigningCapability>,
}

impl Identity {
    /// Build an identity whose public key and address are taken from the
    /// signer itself, so the pair always matches.
    pub fn new(alias: &str, signer: Arc<dyn SigningCapability>) -> Self {
        let public_key = signer.public_key();
        Self {
            alias: alias.to_string(),
            address: Address::from_public_key(&public_key),
            public_key,
            signer,
        }
    }

    /// Build an identity from a separately stored public key.
    ///
    /// Fails with [`KeyLookupError::KeyMismatch`] if the key does not
    /// belong to `signer`.
    pub fn with_public_key(
        alias: &str,
        public_key: PublicKey,
        signer: Arc<dyn SigningCapability>,
    ) -> Result<Self, KeyLookupError> {
        if signer.public_key() != public_key {
            return Err(KeyLookupError::KeyMismatch {
                alias: alias.to_string(),
            });
        }
        Ok(Self {
            alias: alias.to_string(),
            address: Address::from_public_key(&public_key),
            public_key,
            signer,
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The signing capability bound to this identity.
    pub fn signer(&self) -> &dyn SigningCapability {
        self.signer.as_ref()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("alias", &self.alias)
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// KeyStore
// ---------------------------------------------------------------------------

/// Resolves named identities. Shared read-only across all clients.
pub trait KeyStore: Send + Sync {
    fn resolve(&self, alias: &str) -> Result<Identity, KeyLookupError>;
}

/// In-memory key store.
///
/// Populated up front, then frozen behind an `Arc` and shared by every
/// client of a run.
#[derive(Default)]
pub struct MemoryKeyStore {
    identities: HashMap<String, Identity>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding one deterministic development key per alias.
    ///
    /// The same alias always yields the same key, so separate processes
    /// (or a genesis file generated earlier) agree on the addresses.
    pub fn with_dev_keys<S: AsRef<str>>(aliases: &[S]) -> Self {
        let mut store = Self::new();
        for alias in aliases {
            let alias = alias.as_ref();
            store.insert_keypair(alias, dev_keypair(alias));
        }
        store
    }

    /// Store a local keypair under `alias`, replacing any previous entry.
    pub fn insert_keypair(&mut self, alias: &str, keypair: Keypair) {
        self.insert(Identity::new(alias, Arc::new(keypair)));
    }

    /// Store a prepared identity under its own alias.
    pub fn insert(&mut self, identity: Identity) {
        self.identities.insert(identity.alias.clone(), identity);
    }

    /// Stored aliases, sorted.
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.identities.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl KeyStore for MemoryKeyStore {
    fn resolve(&self, alias: &str) -> Result<Identity, KeyLookupError> {
        self.identities
            .get(alias)
            .cloned()
            .ok_or_else(|| KeyLookupError::NotFound {
                alias: alias.to_string(),
            })
    }
}

/// Deterministic keypair for a development alias.
///
/// `seed = SHA-256("ledger-loadtest/dev-key/" || alias)`. Never use these
/// keys anywhere funds matter.
pub fn dev_keypair(alias: &str) -> Keypair {
    Keypair::from_seed(&sha256_multi(&[DEV_KEY_TAG, alias.as_bytes()]))
}
