//! Verification of generated transactions.
//!
//! The chain is the real judge of a generated transfer. This is a local
//! mirror of its ante checks, used by the tests and by the CLI's
//! `--verify` flag to catch a broken generator before any load is sent.

use thiserror::Error;

use super::signing::{SignModeHandler, SignedTx, SignerData};
use crate::config::SIGNATURE_LENGTH;
use crate::identity::Address;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a signed transaction fails local verification.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Generated transfers carry exactly one message.
    #[error("expected exactly one message, got {count}")]
    MessageCount { count: usize },

    /// Generated transfers carry exactly one signer.
    #[error("expected exactly one signer, got {signer_infos} signer infos and {signatures} signatures")]
    SignerCount { signer_infos: usize, signatures: usize },

    #[error("transfer amount is zero")]
    ZeroAmount,

    #[error("transaction is unsigned")]
    MissingSignature,

    #[error("malformed signature: expected 64 bytes, got {got}")]
    MalformedSignature { got: usize },

    /// The signer's public key does not hash to the message sender.
    #[error("signer key belongs to {derived}, but the message is from {sender}")]
    SenderMismatch { sender: String, derived: String },

    /// The sign bytes could not be rebuilt.
    #[error("cannot rebuild sign bytes: {reason}")]
    SignBytes { reason: String },

    #[error("signature does not verify for sender {sender}")]
    InvalidSignature { sender: String },
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verifies a signed transfer against the chain id and the sender's
/// account number.
///
/// The checks, in order:
///
/// 1. **Shape** — one message, one signer info, one signature.
/// 2. **Amount** — non-zero.
/// 3. **Signature present** — 64 bytes.
/// 4. **Sender** — the signer's public key derives the message sender.
/// 5. **Signature valid** — Ed25519 over the sign bytes rebuilt from the
///    signer info's mode and sequence.
pub fn verify_signed_tx(
    tx: &SignedTx,
    chain_id: &str,
    account_number: u64,
) -> Result<(), VerificationError> {
    // 1. Shape.
    let count = tx.body().messages.len();
    if count != 1 {
        return Err(VerificationError::MessageCount { count });
    }
    let signer_infos = tx.auth_info().signer_infos.len();
    let signatures = tx.signatures().len();
    if signer_infos != 1 || signatures > 1 {
        return Err(VerificationError::SignerCount {
            signer_infos,
            signatures,
        });
    }
    let msg = &tx.body().messages[0];
    let info = &tx.auth_info().signer_infos[0];

    // 2. Amount.
    if msg.amount.is_zero() {
        return Err(VerificationError::ZeroAmount);
    }

    // 3. Signature present.
    let signature = tx
        .signature()
        .filter(|s| !s.is_empty())
        .ok_or(VerificationError::MissingSignature)?;
    if signature.len() != SIGNATURE_LENGTH {
        return Err(VerificationError::MalformedSignature {
            got: signature.len(),
        });
    }

    // 4. Key substitution.
    let derived = Address::from_public_key(&info.public_key);
    if derived != msg.from_address {
        return Err(VerificationError::SenderMismatch {
            sender: msg.from_address.to_string(),
            derived: derived.to_string(),
        });
    }

    // 5. Signature.
    let data = SignerData {
        chain_id: chain_id.to_string(),
        account_number,
        sequence: info.sequence,
        public_key: info.public_key.clone(),
    };
    let bytes = SignModeHandler::new(info.mode)
        .sign_bytes(info.mode, &data, tx.body(), tx.auth_info())
        .map_err(|e| VerificationError::SignBytes {
            reason: e.to_string(),
        })?;
    if !info.public_key.verify(&bytes, signature) {
        return Err(VerificationError::InvalidSignature {
            sender: msg.from_address.to_string(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Identity, KeyStore, MemoryKeyStore};
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::types::SignMode;

    const CHAIN_ID: &str = "test-chain";

    fn parties() -> (Identity, Identity) {
        let store = MemoryKeyStore::with_dev_keys(&["user1", "user2"]);
        (store.resolve("user1").unwrap(), store.resolve("user2").unwrap())
    }

    fn signed_as(mode: SignMode) -> (SignedTx, Identity) {
        let (user1, user2) = parties();
        let data = SignerData {
            chain_id: CHAIN_ID.into(),
            account_number: 7,
            sequence: 3,
            public_key: user1.public_key().clone(),
        };
        let tx = TransactionBuilder::new()
            .sender(*user1.address())
            .recipient(*user2.address())
            .amount(1000, "token")
            .fee(100, "token")
            .gas_limit(200_000)
            .memo("abcdefghij")
            .build()
            .unwrap()
            .with_placeholder(user1.public_key().clone(), mode, 3)
            .sign(&SignModeHandler::new(mode), &data, user1.signer())
            .unwrap();
        (tx, user2)
    }

    #[test]
    fn valid_transaction_passes() {
        for mode in SignMode::ALL {
            let (tx, _) = signed_as(mode);
            verify_signed_tx(&tx, CHAIN_ID, 7).unwrap();
        }
    }

    #[test]
    fn wrong_chain_id_fails() {
        let (tx, _) = signed_as(SignMode::Direct);
        assert!(matches!(
            verify_signed_tx(&tx, "other-chain", 7),
            Err(VerificationError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn wrong_account_number_fails() {
        let (tx, _) = signed_as(SignMode::LegacyAminoJson);
        assert!(matches!(
            verify_signed_tx(&tx, CHAIN_ID, 8),
            Err(VerificationError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn tampered_memo_fails() {
        let (tx, _) = signed_as(SignMode::Direct);
        let (mut body, auth_info, sigs) = tx.into_parts();
        body.memo = "ZZZZZZZZZZ".into();
        let tampered = SignedTx::from_parts(body, auth_info, sigs);
        assert!(matches!(
            verify_signed_tx(&tampered, CHAIN_ID, 7),
            Err(VerificationError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn tampered_sequence_fails() {
        let (tx, _) = signed_as(SignMode::Direct);
        let (body, mut auth_info, sigs) = tx.into_parts();
        auth_info.signer_infos[0].sequence = 4;
        let tampered = SignedTx::from_parts(body, auth_info, sigs);
        assert!(verify_signed_tx(&tampered, CHAIN_ID, 7).is_err());
    }

    #[test]
    fn substituted_key_fails() {
        let (tx, user2) = signed_as(SignMode::Direct);
        let (body, mut auth_info, sigs) = tx.into_parts();
        auth_info.signer_infos[0].public_key = user2.public_key().clone();
        let tampered = SignedTx::from_parts(body, auth_info, sigs);
        assert!(matches!(
            verify_signed_tx(&tampered, CHAIN_ID, 7),
            Err(VerificationError::SenderMismatch { .. })
        ));
    }

    #[test]
    fn missing_signature_fails() {
        let (tx, _) = signed_as(SignMode::Direct);
        let (body, auth_info, _) = tx.into_parts();
        let stripped = SignedTx::from_parts(body, auth_info, Vec::new());
        assert!(matches!(
            verify_signed_tx(&stripped, CHAIN_ID, 7),
            Err(VerificationError::MissingSignature)
        ));
    }

    #[test]
    fn extra_message_fails() {
        let (tx, _) = signed_as(SignMode::Direct);
        let (mut body, auth_info, sigs) = tx.into_parts();
        body.messages.push(body.messages[0].clone());
        let tampered = SignedTx::from_parts(body, auth_info, sigs);
        assert!(matches!(
            verify_signed_tx(&tampered, CHAIN_ID, 7),
            Err(VerificationError::MessageCount { count: 2 })
        ));
    }
}
