//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] assembles the parts of a transfer that do not
//! depend on key material: the message, the fee, the gas limit and the
//! memo. It returns an [`UnsignedTx`], the first of the three signing
//! phases. Signing happens in [`super::signing`].

use thiserror::Error;

use super::signing::PlaceholderSignedTx;
use super::types::{AuthInfo, Coin, Fee, MsgSend, SignMode, SignatureV2, TxBody};
use crate::config::{Params, MAX_MEMO_LENGTH};
use crate::crypto::keys::PublicKey;
use crate::identity::{Address, Identity};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while assembling the unsigned transaction.
#[derive(Debug, Error)]
pub enum MessageConstructionError {
    /// The transfer amount is zero or negative.
    #[error("transfer amount must be > 0, got {amount}")]
    NonPositiveAmount { amount: i64 },

    /// The transfer denomination is empty.
    #[error("transfer denom must not be empty")]
    EmptyDenom,

    /// The fee amount is negative.
    #[error("fee amount must be >= 0, got {fee}")]
    NegativeFee { fee: i64 },

    /// The fee denomination is empty.
    #[error("fee denom must not be empty")]
    EmptyFeeDenom,

    /// No sender was set.
    #[error("transfer has no sender")]
    MissingSender,

    /// No recipient was set.
    #[error("transfer has no recipient")]
    MissingRecipient,

    /// The memo exceeds what the chain accepts.
    #[error("memo is {length} bytes, max is {max}")]
    MemoTooLong { length: usize, max: usize },
}

// ---------------------------------------------------------------------------
// UnsignedTx
// ---------------------------------------------------------------------------

/// A fully assembled transfer with no signer information yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    pub(crate) body: TxBody,
    pub(crate) fee: Fee,
}

impl UnsignedTx {
    pub fn body(&self) -> &TxBody {
        &self.body
    }

    pub fn fee(&self) -> &Fee {
        &self.fee
    }

    pub fn memo(&self) -> &str {
        &self.body.memo
    }

    /// The single transfer message.
    pub fn message(&self) -> &MsgSend {
        &self.body.messages[0]
    }

    /// Phase 1: fix the signer-info layout.
    ///
    /// Attaches one signer info for `public_key` at `sequence` under
    /// `mode`, with empty signature bytes. The signing payload covers the
    /// signer infos, so they must be settled before anything is signed.
    pub fn with_placeholder(
        self,
        public_key: PublicKey,
        mode: SignMode,
        sequence: u64,
    ) -> PlaceholderSignedTx {
        let placeholder = SignatureV2 {
            public_key,
            mode,
            signature: Vec::new(),
            sequence,
        };
        let auth_info = AuthInfo {
            signer_infos: vec![placeholder.signer_info()],
            fee: self.fee,
        };
        PlaceholderSignedTx::new(self.body, auth_info, placeholder)
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`UnsignedTx`].
///
/// Amounts are taken as `i64` so that a bad value is reported as a
/// [`MessageConstructionError`] rather than wrapping on conversion.
///
/// ```
/// use ledger_loadtest::crypto::Keypair;
/// use ledger_loadtest::identity::Address;
/// use ledger_loadtest::transaction::TransactionBuilder;
///
/// let from = Address::from_public_key(&Keypair::generate().public_key());
/// let to = Address::from_public_key(&Keypair::generate().public_key());
///
/// let tx = TransactionBuilder::new()
///     .sender(from)
///     .recipient(to)
///     .amount(1_000, "token")
///     .fee(100, "token")
///     .gas_limit(200_000)
///     .memo("abcDEF0123")
///     .build()
///     .unwrap();
///
/// assert_eq!(tx.message().amount.amount, 1_000);
/// assert_eq!(tx.fee().gas_limit, 200_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    sender: Option<Address>,
    recipient: Option<Address>,
    amount: i64,
    denom: String,
    fee: i64,
    fee_denom: String,
    gas_limit: u64,
    memo: String,
}

impl TransactionBuilder {
    /// Empty builder. Fee and gas limit default to zero, memo to empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-filled from run parameters and two resolved identities.
    ///
    /// The fee is charged in the transfer denom. Only the memo is left to
    /// the caller.
    pub fn transfer(sender: &Identity, recipient: &Identity, params: &Params) -> Self {
        Self::new()
            .sender(*sender.address())
            .recipient(*recipient.address())
            .amount(params.amount, &params.denom)
            .fee(params.fee, &params.denom)
            .gas_limit(params.gas_limit)
    }

    pub fn sender(mut self, address: Address) -> Self {
        self.sender = Some(address);
        self
    }

    pub fn recipient(mut self, address: Address) -> Self {
        self.recipient = Some(address);
        self
    }

    /// Sets the transfer amount and denomination.
    pub fn amount(mut self, amount: i64, denom: &str) -> Self {
        self.amount = amount;
        self.denom = denom.to_string();
        self
    }

    /// Sets the flat fee and its denomination.
    pub fn fee(mut self, fee: i64, denom: &str) -> Self {
        self.fee = fee;
        self.fee_denom = denom.to_string();
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Consumes the builder and produces an [`UnsignedTx`].
    ///
    /// Re-checks amount, denoms and fee even when the parameters were
    /// already validated upstream.
    pub fn build(self) -> Result<UnsignedTx, MessageConstructionError> {
        if self.amount <= 0 {
            return Err(MessageConstructionError::NonPositiveAmount {
                amount: self.amount,
            });
        }
        if self.denom.is_empty() {
            return Err(MessageConstructionError::EmptyDenom);
        }
        if self.fee < 0 {
            return Err(MessageConstructionError::NegativeFee { fee: self.fee });
        }
        if self.fee_denom.is_empty() {
            return Err(MessageConstructionError::EmptyFeeDenom);
        }
        if self.memo.len() > MAX_MEMO_LENGTH {
            return Err(MessageConstructionError::MemoTooLong {
                length: self.memo.len(),
                max: MAX_MEMO_LENGTH,
            });
        }
        let from_address = self.sender.ok_or(MessageConstructionError::MissingSender)?;
        let to_address = self
            .recipient
            .ok_or(MessageConstructionError::MissingRecipient)?;

        // Both checked non-negative above.
        let message = MsgSend {
            from_address,
            to_address,
            amount: Coin::new(self.amount as u64, &self.denom),
        };
        let fee = Fee {
            amount: Coin::new(self.fee as u64, &self.fee_denom),
            gas_limit: self.gas_limit,
        };

        Ok(UnsignedTx {
            body: TxBody {
                messages: vec![message],
                memo: self.memo,
            },
            fee,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
