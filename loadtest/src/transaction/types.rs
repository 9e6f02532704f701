//! Core type definitions for generated transactions.
//!
//! The shapes follow the chain's bank/auth modules: a body holding the
//! messages and memo, an auth-info holding signer infos and the fee, and a
//! parallel list of signatures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::crypto::keys::PublicKey;
use crate::identity::Address;

// ---------------------------------------------------------------------------
// Coin
// ---------------------------------------------------------------------------

/// An integer amount of a single denomination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u64,
}

impl Coin {
    pub fn new(amount: u64, denom: &str) -> Self {
        Self {
            denom: denom.to_string(),
            amount,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

// ---------------------------------------------------------------------------
// MsgSend
// ---------------------------------------------------------------------------

/// A bank transfer. The only message type the generator emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSend {
    pub from_address: Address,
    pub to_address: Address,
    pub amount: Coin,
}

impl MsgSend {
    /// Protobuf type URL, used by the direct sign mode.
    pub const TYPE_URL: &'static str = "/cosmos.bank.v1beta1.MsgSend";

    /// Amino route name, used by the legacy JSON sign mode.
    pub const AMINO_NAME: &'static str = "cosmos-sdk/MsgSend";
}

// ---------------------------------------------------------------------------
// Fee
// ---------------------------------------------------------------------------

/// Fee and gas bound attached to a transaction.
///
/// The fee denom is whatever was configured; the chain decides whether it
/// accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub amount: Coin,
    pub gas_limit: u64,
}

// ---------------------------------------------------------------------------
// TxBody / AuthInfo
// ---------------------------------------------------------------------------

/// Messages plus memo. Fixed before signing starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBody {
    pub messages: Vec<MsgSend>,
    pub memo: String,
}

/// Per-signer metadata that is itself covered by the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerInfo {
    pub public_key: PublicKey,
    pub mode: SignMode,
    pub sequence: u64,
}

/// Signer infos and fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Fee,
}

// ---------------------------------------------------------------------------
// SignMode
// ---------------------------------------------------------------------------

/// How the bytes that get signed are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SignMode {
    /// Sign the binary `SignDoc` (body bytes, auth-info bytes, chain id,
    /// account number). Covers the signer infos.
    #[default]
    Direct,
    /// Sign a canonical, key-sorted JSON document. Does not cover signer
    /// infos.
    LegacyAminoJson,
}

impl SignMode {
    pub const ALL: [SignMode; 2] = [SignMode::Direct, SignMode::LegacyAminoJson];
}

impl fmt::Display for SignMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::LegacyAminoJson => write!(f, "amino-json"),
        }
    }
}

impl FromStr for SignMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "amino-json" | "amino_json" | "legacy-amino-json" => Ok(Self::LegacyAminoJson),
            other => Err(format!(
                "unknown sign mode '{}', expected 'direct' or 'amino-json'",
                other
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// SignatureV2
// ---------------------------------------------------------------------------

/// A signature together with the signer metadata it was made under.
///
/// In the placeholder phase `signature` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureV2 {
    pub public_key: PublicKey,
    pub mode: SignMode,
    pub signature: Vec<u8>,
    pub sequence: u64,
}

impl SignatureV2 {
    /// `true` while no signature bytes have been filled in.
    pub fn is_placeholder(&self) -> bool {
        self.signature.is_empty()
    }

    /// The signer info this signature is made under.
    pub fn signer_info(&self) -> SignerInfo {
        SignerInfo {
            public_key: self.public_key.clone(),
            mode: self.mode,
            sequence: self.sequence,
        }
    }
}
