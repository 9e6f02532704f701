// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledger Load Test: Transaction Generator
//!
//! Produces synthetic, validly-signed bank transfers for pushing load at a
//! running chain. A load-test harness owns the connections, the pacing and
//! the result bookkeeping; this crate owns exactly one thing: turning a
//! handful of parameters into canonical transaction bytes that a node will
//! accept.
//!
//! ## Architecture
//!
//! - **crypto** — Ed25519 keys, signatures, and hashing.
//! - **identity** — Bech32 addresses and the key store seam.
//! - **account** — Account number / sequence lookup and local sequence tracking.
//! - **transaction** — Message types, the builder, the two-phase signer,
//!   codecs, and signature verification.
//! - **memo** — Random memo strings with an injectable RNG.
//! - **client** — The factory/client pair a harness drives.
//! - **config** — Generation parameters and protocol constants.
//!
//! ## Generation flow
//!
//! ```text
//! KeyStore::resolve(sender, recipient)
//!     -> TransactionBuilder::build()            UnsignedTx
//!     -> AccountStateProvider::fetch(sender)
//!     -> UnsignedTx::with_placeholder()         PlaceholderSignedTx
//!     -> PlaceholderSignedTx::sign()            SignedTx
//!     -> TxEncoder::encode()                    Vec<u8>
//! ```
//!
//! Every failure is returned to the caller as a [`client::GenerationError`].
//! Nothing is retried here; whether one failed transaction ends the run is
//! the harness's call.

pub mod account;
pub mod client;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod memo;
pub mod transaction;

pub use account::{
    AccountLookupError, AccountState, AccountStateProvider, MemoryAccountStore, SequenceTracker,
};
pub use client::{
    Client, ClientContext, ClientFactory, GenerationError, TransferClient, TransferClientFactory,
};
pub use config::{ConfigError, Params};
pub use identity::{Address, Identity, KeyLookupError, KeyStore, MemoryKeyStore, SigningCapability};
pub use memo::{MemoGenerator, MemoSeed};
pub use transaction::{
    BinaryCodec, EncodingError, JsonCodec, MessageConstructionError, SignMode, SignedTx,
    SigningError, TxDecoder, TxEncoder,
};
