//! # Generation Parameters & Constants
//!
//! Every knob a load-test run can turn lives in [`Params`]; every number the
//! generator hardcodes lives next to it as a constant. Parameters are
//! validated once, when a client is built, and are read-only afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Addresses & Chain
// ---------------------------------------------------------------------------

/// Bech32 human-readable prefix for account addresses.
pub const ADDRESS_HRP: &str = "manifest";

/// Number of public-key hash bytes kept in an address (SHA-256 truncated).
pub const ADDRESS_LENGTH: usize = 20;

/// Chain identifier used by the offline tooling when none is given.
pub const DEFAULT_CHAIN_ID: &str = "manifest-loadtest-1";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

/// Length of the random memo attached to every generated transfer.
pub const DEFAULT_MEMO_LENGTH: usize = 10;

/// Upper bound on memo length accepted by the chain's ante handler.
pub const MAX_MEMO_LENGTH: usize = 256;

/// Alphabet the memo is drawn from: lowercase, uppercase, digits.
pub const MEMO_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// Key alias that funds every generated transfer.
pub const DEFAULT_SENDER_ALIAS: &str = "user1";

/// Key alias that receives every generated transfer.
pub const DEFAULT_RECIPIENT_ALIAS: &str = "user2";

// ---------------------------------------------------------------------------
// Denominations
// ---------------------------------------------------------------------------

/// Shortest denom the bank module accepts. Only enforced by
/// [`validate_denom_strict`].
pub const MIN_DENOM_LENGTH: usize = 3;

/// Longest denom the bank module accepts.
pub const MAX_DENOM_LENGTH: usize = 128;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating generation parameters.
///
/// These surface before any client exists, so they abort client creation
/// rather than a single generation call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric field that must be non-negative was negative.
    #[error("{field} must be non-negative, got {value}")]
    NegativeValue { field: &'static str, value: i64 },

    /// The denomination is empty.
    #[error("denom must not be empty")]
    EmptyDenom,

    /// The denomination is non-empty but fails the bank module's rules.
    /// Only raised by [`validate_denom_strict`].
    #[error("invalid denom '{denom}': {reason}")]
    InvalidDenom { denom: String, reason: &'static str },

    /// The memo length is zero or above [`MAX_MEMO_LENGTH`].
    #[error("memo_length must be between 1 and {max}, got {length}")]
    InvalidMemoLength { length: usize, max: usize },

    /// A key alias is empty.
    #[error("{field} key alias must not be empty")]
    EmptyAlias { field: &'static str },

    /// The chain identifier bound into the signing context is empty.
    #[error("chain id must not be empty")]
    EmptyChainId,

    /// The parameters file could not be read.
    #[error("failed to read params file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The parameters file is not valid TOML or has the wrong shape.
    #[error("failed to parse params: {0}")]
    Parse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// Parameters for a single load-test run.
///
/// Numeric fields are signed so that a bad value from a file or command
/// line is reported as a validation error instead of wrapping silently.
///
/// The fee is charged in the same `denom` as the transfer. Nothing here
/// checks that the chain actually accepts that denom for fees; it is
/// passed through as configured.
///
/// # Example
///
/// ```
/// use ledger_loadtest::config::Params;
///
/// let params = Params::new(100, 1_000, "token", 200_000);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.memo_length, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Params {
    /// Flat fee amount.
    pub fee: i64,
    /// Transfer amount.
    pub amount: i64,
    /// Token denomination for both the transfer and the fee.
    pub denom: String,
    /// Execution gas bound.
    pub gas_limit: u64,
    /// Memo length in characters.
    #[serde(default = "default_memo_length")]
    pub memo_length: usize,
    /// Key alias of the sending identity.
    #[serde(default = "default_sender")]
    pub sender: String,
    /// Key alias of the receiving identity.
    #[serde(default = "default_recipient")]
    pub recipient: String,
}

fn default_memo_length() -> usize {
    DEFAULT_MEMO_LENGTH
}

fn default_sender() -> String {
    DEFAULT_SENDER_ALIAS.to_string()
}

fn default_recipient() -> String {
    DEFAULT_RECIPIENT_ALIAS.to_string()
}

impl Params {
    /// Creates parameters with the default memo length and key aliases.
    pub fn new(fee: i64, amount: i64, denom: &str, gas_limit: u64) -> Self {
        Self {
            fee,
            amount,
            denom: denom.to_string(),
            gas_limit,
            memo_length: DEFAULT_MEMO_LENGTH,
            sender: default_sender(),
            recipient: default_recipient(),
        }
    }

    /// Overrides the sender and recipient key aliases.
    pub fn with_aliases(mut self, sender: &str, recipient: &str) -> Self {
        self.sender = sender.to_string();
        self.recipient = recipient.to_string();
        self
    }

    /// Overrides the memo length.
    pub fn with_memo_length(mut self, length: usize) -> Self {
        self.memo_length = length;
        self
    }

    /// Parses parameters from a TOML document.
    ///
    /// Only parses; call [`validate`](Self::validate) before use.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a TOML parameters file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks that the parameters are structurally acceptable.
    ///
    /// Side-effect free. Any non-empty denom passes; use
    /// [`validate_denom_strict`] to also apply the chain's denom rules. A
    /// zero `amount` passes here; the builder rejects it per transaction
    /// with a message construction error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fee < 0 {
            return Err(ConfigError::NegativeValue {
                field: "fee",
                value: self.fee,
            });
        }
        if self.amount < 0 {
            return Err(ConfigError::NegativeValue {
                field: "amount",
                value: self.amount,
            });
        }
        if self.denom.is_empty() {
            return Err(ConfigError::EmptyDenom);
        }

        if self.memo_length == 0 || self.memo_length > MAX_MEMO_LENGTH {
            return Err(ConfigError::InvalidMemoLength {
                length: self.memo_length,
                max: MAX_MEMO_LENGTH,
            });
        }
        if self.sender.trim().is_empty() {
            return Err(ConfigError::EmptyAlias { field: "sender" });
        }
        if self.recipient.trim().is_empty() {
            return Err(ConfigError::EmptyAlias { field: "recipient" });
        }
        Ok(())
    }
}

/// Checks a denomination against the bank module's denom rules:
/// 3-128 characters, a leading letter, then letters, digits, or `/:._-`.
///
/// Not part of [`Params::validate`]. The generator signs whatever denom it
/// is given; this is for tooling that wants to warn before sending load a
/// chain will refuse.
pub fn validate_denom_strict(denom: &str) -> Result<(), ConfigError> {
    if denom.is_empty() {
        return Err(ConfigError::EmptyDenom);
    }
    let invalid = |reason| ConfigError::InvalidDenom {
        denom: denom.to_string(),
        reason,
    };

    if denom.len() < MIN_DENOM_LENGTH || denom.len() > MAX_DENOM_LENGTH {
        return Err(invalid("length must be between 3 and 128"));
    }
    if !denom.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(invalid("must start with a letter"));
    }
    if !denom
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'))
    {
        return Err(invalid("contains a character outside [a-zA-Z0-9/:._-]"));
    }
    Ok(())
}
