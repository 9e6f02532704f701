//! Wire encodings for signed transactions.
//!
//! The generator hands the harness opaque bytes. Which bytes is up to the
//! [`TxEncoder`] plugged into the client context:
//!
//! - [`BinaryCodec`] — compact `bincode` encoding, the default.
//! - [`JsonCodec`] — `serde_json`, handy when eyeballing generated output.
//!
//! Both codecs also decode, which is what verification and the tests use.

use thiserror::Error;

use super::signing::SignedTx;
use crate::crypto::hash::sha256;

/// Errors raised while encoding or decoding a transaction.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("failed to encode transaction as {format}: {reason}")]
    Serialize { format: &'static str, reason: String },

    #[error("failed to decode {format} transaction: {reason}")]
    Deserialize { format: &'static str, reason: String },

    /// Encoders refuse transactions that carry no signature.
    #[error("transaction has no signature")]
    MissingSignature,
}

/// Serializes a signed transaction into the bytes that get broadcast.
pub trait TxEncoder: Send + Sync {
    /// Short name of the format, used in logs and errors.
    fn format(&self) -> &'static str;

    fn encode(&self, tx: &SignedTx) -> Result<Vec<u8>, EncodingError>;
}

/// The inverse of [`TxEncoder`].
pub trait TxDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<SignedTx, EncodingError>;
}

fn ensure_signed(tx: &SignedTx) -> Result<(), EncodingError> {
    if tx.signatures().is_empty() || tx.signatures().iter().any(|s| s.is_empty()) {
        return Err(EncodingError::MissingSignature);
    }
    Ok(())
}

/// Hex SHA-256 of already encoded transaction bytes.
pub fn tx_hash(bytes: &[u8]) -> String {
    hex::encode(sha256(bytes))
}

// ---------------------------------------------------------------------------
// BinaryCodec
// ---------------------------------------------------------------------------

/// `bincode` encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl TxEncoder for BinaryCodec {
    fn format(&self) -> &'static str {
        "binary"
    }

    fn encode(&self, tx: &SignedTx) -> Result<Vec<u8>, EncodingError> {
        ensure_signed(tx)?;
        bincode::serialize(tx).map_err(|e| EncodingError::Serialize {
            format: self.format(),
            reason: e.to_string(),
        })
    }
}

impl TxDecoder for BinaryCodec {
    fn decode(&self, bytes: &[u8]) -> Result<SignedTx, EncodingError> {
        bincode::deserialize(bytes).map_err(|e| EncodingError::Deserialize {
            format: self.format(),
            reason: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// Compact JSON encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl TxEncoder for JsonCodec {
    fn format(&self) -> &'static str {
        "json"
    }

    fn encode(&self, tx: &SignedTx) -> Result<Vec<u8>, EncodingError> {
        ensure_signed(tx)?;
        serde_json::to_vec(tx).map_err(|e| EncodingError::Serialize {
            format: self.format(),
            reason: e.to_string(),
        })
    }
}

impl TxDecoder for JsonCodec {
    fn decode(&self, bytes: &[u8]) -> Result<SignedTx, EncodingError> {
        serde_json::from_slice(bytes).map_err(|e| EncodingError::Deserialize {
            format: self.format(),
            reason: e.to_string(),
        })
    }
}
