//! # Transaction Module
//!
//! Construction, signing, encoding, and verification of generated bank
//! transfers.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — Coin, MsgSend, Fee, TxBody, AuthInfo, SignMode, SignatureV2
//! builder.rs      — Fluent TransactionBuilder producing an UnsignedTx
//! signing.rs      — Placeholder and real signature phases, sign modes
//! encoding.rs     — TxEncoder / TxDecoder seams with binary and JSON codecs
//! verification.rs — Local re-check of a signed transfer
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** — [`TransactionBuilder`] assembles message, fee, gas and memo.
//! 2. **Placeholder** — [`UnsignedTx::with_placeholder`] fixes the signer info.
//! 3. **Sign** — [`PlaceholderSignedTx::sign`] fills in the signature.
//! 4. **Encode** — a [`TxEncoder`] turns the [`SignedTx`] into bytes.
//!
//! Every generated transaction is fresh and is dropped once encoded.

pub mod builder;
pub mod encoding;
pub mod signing;
pub mod types;
pub mod verification;

pub use builder::{MessageConstructionError, TransactionBuilder, UnsignedTx};
pub use encoding::{tx_hash, BinaryCodec, EncodingError, JsonCodec, TxDecoder, TxEncoder};
pub use signing::{
    PlaceholderSignedTx, SignModeHandler, SignedTx, SignerData, SigningError, TwoPhaseSigner,
};
pub use types::{AuthInfo, Coin, Fee, MsgSend, SignMode, SignatureV2, SignerInfo, TxBody};
pub use verification::{verify_signed_tx, VerificationError};
