//! Two-phase, sign-mode-aware transaction signing.
//!
//! Signing is split into explicit phases, each with its own type:
//!
//! 1. [`UnsignedTx::with_placeholder`] attaches the signer info (public
//!    key, sign mode, sequence) with an empty signature. The payload that
//!    gets signed covers the signer infos, so the layout has to be fixed
//!    first.
//! 2. [`PlaceholderSignedTx::sign`] computes the sign bytes for the mode,
//!    asks the [`SigningCapability`] for a signature and swaps it in.
//!
//! An [`UnsignedTx`] or [`PlaceholderSignedTx`] cannot be encoded; only a
//! [`SignedTx`] can.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::builder::UnsignedTx;
use super::encoding::{BinaryCodec, EncodingError, TxEncoder};
use super::types::{AuthInfo, Fee, MsgSend, SignMode, SignatureV2, SignerInfo, TxBody};
use crate::account::AccountStateProvider;
use crate::client::GenerationError;
use crate::config::SIGNATURE_LENGTH;
use crate::crypto::hash::sha256;
use crate::crypto::keys::{PublicKey, Signature};
use crate::identity::{Address, Identity, SigningCapability};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while producing the signature.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The sign doc needs a chain id and none was configured.
    #[error("chain id must not be empty")]
    EmptyChainId,

    /// Signer data disagrees with the signer info fixed in phase 1.
    #[error("signer data {field} does not match the placeholder signer info")]
    SignerMismatch { field: &'static str },

    /// The capability signs for a different key than the placeholder names.
    #[error("signing capability key {got} does not match signer key {expected}")]
    CapabilityMismatch { expected: String, got: String },

    /// The capability returned something that is not an Ed25519 signature.
    #[error("signature must be 64 bytes, got {got}")]
    InvalidSignatureLength { got: usize },

    /// The sign doc could not be serialized.
    #[error("failed to build {mode} sign doc: {reason}")]
    SignDoc { mode: SignMode, reason: String },

    /// The capability itself failed (remote signer down, device locked, ...).
    #[error("signing capability failed: {reason}")]
    Capability { reason: String },
}

// ---------------------------------------------------------------------------
// SignerData
// ---------------------------------------------------------------------------

/// Everything about the signer the sign doc needs beyond the tx itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerData {
    pub chain_id: String,
    pub account_number: u64,
    pub sequence: u64,
    pub public_key: PublicKey,
}

// ---------------------------------------------------------------------------
// SignModeHandler
// ---------------------------------------------------------------------------

/// The binary sign doc of the direct mode.
#[derive(Serialize)]
struct SignDoc<'a> {
    body_bytes: Vec<u8>,
    auth_info_bytes: Vec<u8>,
    chain_id: &'a str,
    account_number: u64,
}

/// The legacy JSON sign doc. Fields are declared in sorted order and
/// `serde_json::Value` maps are sorted, so the output is canonical.
#[derive(Serialize)]
struct StdSignDoc<'a> {
    account_number: String,
    chain_id: &'a str,
    fee: Value,
    memo: &'a str,
    msgs: Vec<Value>,
    sequence: String,
}

/// Produces the exact bytes a signature covers, per sign mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignModeHandler {
    default_mode: SignMode,
}

impl SignModeHandler {
    pub fn new(default_mode: SignMode) -> Self {
        Self { default_mode }
    }

    /// The mode the signer uses unless told otherwise.
    pub fn default_mode(&self) -> SignMode {
        self.default_mode
    }

    /// Canonical bytes to sign for `mode`.
    pub fn sign_bytes(
        &self,
        mode: SignMode,
        data: &SignerData,
        body: &TxBody,
        auth_info: &AuthInfo,
    ) -> Result<Vec<u8>, SigningError> {
        if data.chain_id.is_empty() {
            return Err(SigningError::EmptyChainId);
        }
        let sign_doc_err = |reason: String| SigningError::SignDoc { mode, reason };

        match mode {
            SignMode::Direct => {
                let doc = SignDoc {
                    body_bytes: bincode::serialize(body)
                        .map_err(|e| sign_doc_err(e.to_string()))?,
                    auth_info_bytes: bincode::serialize(auth_info)
                        .map_err(|e| sign_doc_err(e.to_string()))?,
                    chain_id: &data.chain_id,
                    account_number: data.account_number,
                };
                bincode::serialize(&doc).map_err(|e| sign_doc_err(e.to_string()))
            }
            SignMode::LegacyAminoJson => {
                let doc = StdSignDoc {
                    account_number: data.account_number.to_string(),
                    chain_id: &data.chain_id,
                    fee: amino_fee(&auth_info.fee),
                    memo: &body.memo,
                    msgs: body.messages.iter().map(amino_msg).collect(),
                    sequence: data.sequence.to_string(),
                };
                serde_json::to_vec(&doc).map_err(|e| sign_doc_err(e.to_string()))
            }
        }
    }
}

fn amino_msg(msg: &MsgSend) -> Value {
    json!({
        "type": MsgSend::AMINO_NAME,
        "value": {
            "amount": [{ "amount": msg.amount.amount.to_string(), "denom": msg.amount.denom }],
            "from_address": msg.from_address.to_string(),
            "to_address": msg.to_address.to_string(),
        }
    })
}

fn amino_fee(fee: &Fee) -> Value {
    json!({
        "amount": [{ "amount": fee.amount.amount.to_string(), "denom": fee.amount.denom }],
        "gas": fee.gas_limit.to_string(),
    })
}

// ---------------------------------------------------------------------------
// PlaceholderSignedTx
// ---------------------------------------------------------------------------

/// A transaction whose signer info is settled but whose signature is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSignedTx {
    body: TxBody,
    auth_info: AuthInfo,
    placeholder: SignatureV2,
}

impl PlaceholderSignedTx {
    pub(crate) fn new(body: TxBody, auth_info: AuthInfo, placeholder: SignatureV2) -> Self {
        Self {
            body,
            auth_info,
            placeholder,
        }
    }

    pub fn body(&self) -> &TxBody {
        &self.body
    }

    pub fn auth_info(&self) -> &AuthInfo {
        &self.auth_info
    }

    pub fn placeholder(&self) -> &SignatureV2 {
        &self.placeholder
    }

    /// Phase 2: compute the sign bytes and fill in the real signature.
    ///
    /// `data` must agree with the placeholder on sequence and public key,
    /// and `signer` must sign for that same key.
    pub fn sign(
        self,
        handler: &SignModeHandler,
        data: &SignerData,
        signer: &dyn SigningCapability,
    ) -> Result<SignedTx, SigningError> {
        if data.chain_id.is_empty() {
            return Err(SigningError::EmptyChainId);
        }
        if data.sequence != self.placeholder.sequence {
            return Err(SigningError::SignerMismatch { field: "sequence" });
        }
        if data.public_key != self.placeholder.public_key {
            return Err(SigningError::SignerMismatch {
                field: "public_key",
            });
        }
        let signer_key = signer.public_key();
        if signer_key != self.placeholder.public_key {
            return Err(SigningError::CapabilityMismatch {
                expected: self.placeholder.public_key.to_hex(),
                got: signer_key.to_hex(),
            });
        }

        let bytes = handler.sign_bytes(self.placeholder.mode, data, &self.body, &self.auth_info)?;
        let signature = signer.sign(&bytes)?;
        if signature.len() != SIGNATURE_LENGTH {
            return Err(SigningError::InvalidSignatureLength {
                got: signature.len(),
            });
        }

        Ok(SignedTx {
            body: self.body,
            auth_info: self.auth_info,
            signatures: vec![signature],
        })
    }
}

// ---------------------------------------------------------------------------
// SignedTx
// ---------------------------------------------------------------------------

/// A fully signed transaction, ready for encoding.
///
/// `signatures[i]` belongs to `auth_info.signer_infos[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    body: TxBody,
    auth_info: AuthInfo,
    signatures: Vec<Signature>,
}

impl SignedTx {
    /// Reassemble a signed transaction from decoded parts. Nothing is
    /// checked; run [`super::verification::verify_signed_tx`] on the result.
    pub fn from_parts(body: TxBody, auth_info: AuthInfo, signatures: Vec<Signature>) -> Self {
        Self {
            body,
            auth_info,
            signatures,
        }
    }

    pub fn into_parts(self) -> (TxBody, AuthInfo, Vec<Signature>) {
        (self.body, self.auth_info, self.signatures)
    }

    pub fn body(&self) -> &TxBody {
        &self.body
    }

    pub fn auth_info(&self) -> &AuthInfo {
        &self.auth_info
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn message(&self) -> Option<&MsgSend> {
        self.body.messages.first()
    }

    pub fn fee(&self) -> &Fee {
        &self.auth_info.fee
    }

    pub fn memo(&self) -> &str {
        &self.body.memo
    }

    pub fn signer_info(&self) -> Option<&SignerInfo> {
        self.auth_info.signer_infos.first()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signatures.first()
    }

    /// The first signature together with its signer info.
    pub fn signature_v2(&self) -> Option<SignatureV2> {
        let info = self.signer_info()?;
        let signature = self.signature()?;
        Some(SignatureV2 {
            public_key: info.public_key.clone(),
            mode: info.mode,
            signature: signature.as_bytes().to_vec(),
            sequence: info.sequence,
        })
    }

    /// Hex SHA-256 of the canonical binary encoding.
    pub fn tx_hash(&self) -> Result<String, EncodingError> {
        let bytes = BinaryCodec.encode(self)?;
        Ok(hex::encode(sha256(&bytes)))
    }
}

// ---------------------------------------------------------------------------
// TwoPhaseSigner
// ---------------------------------------------------------------------------

/// Drives both signing phases for one identity.
///
/// Looks up the sender's account state on every call, so sequences come
/// from whatever provider is plugged in (see
/// [`crate::account::SequenceTracker`] for bursts from one sender). A
/// failed phase 2 hands the fetched sequence back to the provider.
pub struct TwoPhaseSigner {
    accounts: Arc<dyn AccountStateProvider>,
    chain_id: String,
    handler: SignModeHandler,
}

impl TwoPhaseSigner {
    pub fn new(
        accounts: Arc<dyn AccountStateProvider>,
        chain_id: impl Into<String>,
        mode: SignMode,
    ) -> Self {
        Self {
            accounts,
            chain_id: chain_id.into(),
            handler: SignModeHandler::new(mode),
        }
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn handler(&self) -> &SignModeHandler {
        &self.handler
    }

    /// Sign `unsigned` as `identity`.
    pub fn sign(&self, unsigned: UnsignedTx, identity: &Identity) -> Result<SignedTx, GenerationError> {
        let mode = self.handler.default_mode();
        let state = self.accounts.fetch(identity.address()).map_err(|err| {
            warn!(alias = identity.alias(), address = %identity.address(), error = %err, "account lookup failed");
            err
        })?;

        let placeholder = unsigned.with_placeholder(identity.public_key().clone(), mode, state.sequence);
        trace!(
            alias = identity.alias(),
            account_number = state.account_number,
            sequence = state.sequence,
            %mode,
            "placeholder signer info attached"
        );

        let data = SignerData {
            chain_id: self.chain_id.clone(),
            account_number: state.account_number,
            sequence: state.sequence,
            public_key: identity.public_key().clone(),
        };
        let signed = placeholder
            .sign(&self.handler, &data, identity.signer())
            .map_err(|source| {
                self.release(identity.address(), state.sequence);
                GenerationError::Signing {
                    alias: identity.alias().to_string(),
                    source,
                }
            })?;
        trace!(alias = identity.alias(), sequence = state.sequence, "signature filled in");

        Ok(signed)
    }

    /// Return `sequence` to the account provider after a signed
    /// transaction from `address` was dropped without being encoded.
    pub fn release(&self, address: &Address, sequence: u64) {
        debug!(%address, sequence, "returning unused sequence");
        self.accounts.release(address, sequence);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
