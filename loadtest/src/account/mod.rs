//! # Account State
//!
//! The signer needs two numbers about the sender before it can sign: the
//! account number the chain assigned on first appearance, and the current
//! sequence. Both come from an [`AccountStateProvider`].
//!
//! - **state** — the provider trait and an in-memory implementation.
//! - **tracker** — a provider wrapper that hands out consecutive sequences
//!   locally, so a burst of transactions from one sender does not reuse
//!   the sequence the chain has not yet advanced.

pub mod state;
pub mod tracker;

pub use state::{AccountLookupError, AccountState, AccountStateProvider, MemoryAccountStore};
pub use tracker::SequenceTracker;
