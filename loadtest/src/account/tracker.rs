//! Local sequence tracking.
//!
//! The chain only advances an account's sequence once a transaction is
//! committed. A generator producing transactions faster than blocks land
//! would otherwise sign every one of them with the same sequence, and all
//! but the first would be rejected. [`SequenceTracker`] fetches the chain's
//! view once per address and then hands out `n, n+1, n+2, ...` itself.
//!
//! A reservation whose transaction is never produced must come back
//! through [`AccountStateProvider::release`], otherwise every later
//! transaction from that address is signed one ahead of the chain.

use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::state::{sequence_exhausted, AccountLookupError, AccountState, AccountStateProvider};
use crate::identity::Address;

/// An [`AccountStateProvider`] that reserves a fresh sequence per fetch.
///
/// All reservations for all addresses go through a single mutex, so two
/// concurrent `fetch` calls can never be handed the same sequence. The
/// lock is held across the first upstream lookup for an address.
pub struct SequenceTracker {
    upstream: Arc<dyn AccountStateProvider>,
    next: Mutex<HashMap<Address, AccountState>>,
}

impl SequenceTracker {
    pub fn new(upstream: Arc<dyn AccountStateProvider>) -> Self {
        Self {
            upstream,
            next: Mutex::new(HashMap::new()),
        }
    }

    /// Next sequence that would be handed out for `address`, if cached.
    pub fn peek(&self, address: &Address) -> Option<u64> {
        self.next.lock().get(address).map(|state| state.sequence)
    }

    /// Forget the cached state for `address`; the next fetch resyncs
    /// from upstream. Call after a generated transaction was rejected.
    pub fn reset(&self, address: &Address) {
        self.next.lock().remove(address);
    }

    /// Forget every cached address.
    pub fn reset_all(&self) {
        self.next.lock().clear();
    }
}

impl AccountStateProvider for SequenceTracker {
    fn fetch(&self, address: &Address) -> Result<AccountState, AccountLookupError> {
        let mut next = self.next.lock();
        let state = match next.entry(*address) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let fetched = self.upstream.fetch(address)?;
                debug!(
                    %address,
                    account_number = fetched.account_number,
                    sequence = fetched.sequence,
                    "sequence tracker synced from upstream"
                );
                entry.insert(fetched)
            }
        };

        let reserved = *state;
        state.sequence = reserved
            .sequence
            .checked_add(1)
            .ok_or_else(|| sequence_exhausted(address))?;
        Ok(reserved)
    }

    /// Rewinds when `sequence` is the latest reservation. If later ones
    /// were already handed out the gap cannot be closed locally, so the
    /// cached entry is dropped and the next fetch resyncs from upstream.
    fn release(&self, address: &Address, sequence: u64) {
        let mut next = self.next.lock();
        let latest = match next.get(address) {
            Some(state) => sequence.checked_add(1) == Some(state.sequence),
            None => return,
        };

        if latest {
            if let Some(state) = next.get_mut(address) {
                state.sequence = sequence;
            }
            debug!(%address, sequence, "sequence reservation released");
        } else {
            next.remove(address);
            debug!(%address, sequence, "released out of order, resyncing from upstream");
        }
    }
}
