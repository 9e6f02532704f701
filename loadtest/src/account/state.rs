//! Account number and sequence lookup.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::identity::Address;

// ---------------------------------------------------------------------------
// AccountState
// ---------------------------------------------------------------------------

/// On-chain account metadata relevant to signing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Assigned on the account's first on-chain appearance; never changes.
    pub account_number: u64,
    /// Count of confirmed transactions from this account. The next
    /// transaction must be signed with exactly this value.
    pub sequence: u64,
}

impl AccountState {
    pub fn new(account_number: u64, sequence: u64) -> Self {
        Self {
            account_number,
            sequence,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while fetching account state.
#[derive(Debug, Error)]
pub enum AccountLookupError {
    /// The chain has never seen the address.
    #[error("account {address} not found")]
    NotFound { address: String },

    /// The backing query failed.
    #[error("account state for {address} unavailable: {reason}")]
    Unavailable { address: String, reason: String },
}

pub(crate) fn sequence_exhausted(address: &Address) -> AccountLookupError {
    AccountLookupError::Unavailable {
        address: address.to_string(),
        reason: "sequence exhausted at u64::MAX".to_string(),
    }
}

// ---------------------------------------------------------------------------
// AccountStateProvider
// ---------------------------------------------------------------------------

/// Resolves an address to its current account state.
///
/// Timeouts and retries, if any, belong to the implementation. The
/// generator calls `fetch` once per transaction and reports any failure
/// upward unchanged.
pub trait AccountStateProvider: Send + Sync {
    fn fetch(&self, address: &Address) -> Result<AccountState, AccountLookupError>;

    /// Hand back a sequence obtained from `fetch` that never made it into
    /// an encoded transaction.
    ///
    /// Plain lookups hold nothing per call, so the default does nothing.
    /// Providers that reserve sequences must undo the reservation.
    fn release(&self, _address: &Address, _sequence: u64) {}
}

/// In-memory account table.
///
/// Stands in for the chain's auth module in tests and offline runs.
/// Interior locking lets a test advance a sequence while clients hold an
/// `Arc` to the store.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<Address, AccountState>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the state for `address`.
    pub fn set(&self, address: Address, state: AccountState) {
        self.accounts.write().insert(address, state);
    }

    /// Record one confirmed transaction from `address`.
    ///
    /// Returns the new sequence. Fails for an unknown account, or when the
    /// sequence is already `u64::MAX`.
    pub fn increment_sequence(&self, address: &Address) -> Result<u64, AccountLookupError> {
        let mut accounts = self.accounts.write();
        let state = accounts
            .get_mut(address)
            .ok_or_else(|| AccountLookupError::NotFound {
                address: address.to_string(),
            })?;
        state.sequence = state
            .sequence
            .checked_add(1)
            .ok_or_else(|| sequence_exhausted(address))?;
        Ok(state.sequence)
    }

    pub fn remove(&self, address: &Address) -> Option<AccountState> {
        self.accounts.write().remove(address)
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

impl AccountStateProvider for MemoryAccountStore {
    fn fetch(&self, address: &Address) -> Result<AccountState, AccountLookupError> {
        self.accounts
            .read()
            .get(address)
            .copied()
            .ok_or_else(|| AccountLookupError::NotFound {
                address: address.to_string(),
            })
    }
}
