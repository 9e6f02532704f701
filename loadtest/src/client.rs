//! The boundary a load-test harness drives.
//!
//! A harness builds one [`ClientContext`] per run (key store, account
//! provider, chain id, encoder, memo seed), wraps it in a
//! [`TransferClientFactory`], validates its [`Params`] once, and then asks
//! the factory for one [`TransferClient`] per simulated connection. Each
//! call to [`Client::generate_tx`] yields one encoded, fully signed
//! transfer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::account::{AccountLookupError, AccountStateProvider};
use crate::config::{ConfigError, Params};
use crate::identity::{Identity, KeyLookupError, KeyStore};
use crate::memo::{MemoGenerator, MemoSeed};
use crate::transaction::{
    tx_hash, BinaryCodec, EncodingError, MessageConstructionError, SignMode, SignedTx,
    SigningError, TransactionBuilder, TwoPhaseSigner, TxEncoder,
};

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Why a single `generate_tx` call produced no bytes.
///
/// Every variant aborts that one call only. Whether it should end the
/// whole run is for the harness to decide.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The sender or recipient alias has no key.
    #[error("key lookup failed: {0}")]
    KeyLookup(#[from] KeyLookupError),

    /// The sender's account number and sequence could not be fetched.
    #[error("account lookup failed: {0}")]
    AccountLookup(#[from] AccountLookupError),

    /// The transfer message or its envelope was rejected by the builder.
    #[error("message construction failed: {0}")]
    MessageConstruction(#[from] MessageConstructionError),

    /// Phase 2 failed for the identity behind `alias`.
    #[error("signing as '{alias}' failed: {source}")]
    Signing {
        alias: String,
        #[source]
        source: SigningError,
    },

    /// The signed transaction could not be serialized.
    #[error("encoding failed: {0}")]
    Encoding(#[from] EncodingError),
}

// ---------------------------------------------------------------------------
// ClientContext
// ---------------------------------------------------------------------------

/// Signing context shared read-only by every client of a run.
///
/// The only thing it counts is how many clients it has handed out, so
/// each one gets its own memo stream.
pub struct ClientContext {
    keystore: Arc<dyn KeyStore>,
    accounts: Arc<dyn AccountStateProvider>,
    encoder: Arc<dyn TxEncoder>,
    chain_id: String,
    sign_mode: SignMode,
    memo_seed: MemoSeed,
    next_stream: AtomicU64,
}

impl ClientContext {
    /// Context with the binary encoder, direct sign mode and
    /// entropy-seeded memos.
    pub fn new(
        keystore: Arc<dyn KeyStore>,
        accounts: Arc<dyn AccountStateProvider>,
        chain_id: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let chain_id = chain_id.into();
        if chain_id.is_empty() {
            return Err(ConfigError::EmptyChainId);
        }
        Ok(Self {
            keystore,
            accounts,
            encoder: Arc::new(BinaryCodec),
            chain_id,
            sign_mode: SignMode::default(),
            memo_seed: MemoSeed::default(),
            next_stream: AtomicU64::new(0),
        })
    }

    /// Replace the wire encoder.
    pub fn with_encoder(mut self, encoder: Arc<dyn TxEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Sign mode used for both phases and recorded in the signer info.
    pub fn with_sign_mode(mut self, mode: SignMode) -> Self {
        self.sign_mode = mode;
        self
    }

    /// Seed for the per-client memo generators. [`MemoSeed::Fixed`]
    /// makes every client's memos reproducible.
    pub fn with_memo_seed(mut self, seed: MemoSeed) -> Self {
        self.memo_seed = seed;
        self
    }

    /// Chain id bound into every signature.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn sign_mode(&self) -> SignMode {
        self.sign_mode
    }

    pub fn memo_seed(&self) -> MemoSeed {
        self.memo_seed
    }

    pub fn encoder(&self) -> &dyn TxEncoder {
        self.encoder.as_ref()
    }

    pub fn keystore(&self) -> &dyn KeyStore {
        self.keystore.as_ref()
    }

    fn memo_generator(&self) -> MemoGenerator {
        let stream = self.next_stream.fetch_add(1, Ordering::Relaxed);
        self.memo_seed.generator(stream)
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// One logical connection's transaction source.
pub trait Client: Send + Sync {
    /// Produce one encoded, fully signed transaction.
    fn generate_tx(&self) -> Result<Vec<u8>, GenerationError>;
}

/// Validates parameters and hands out clients.
pub trait ClientFactory {
    type Client: Client;

    /// Side-effect-free check of `params`.
    fn validate_config(&self, params: &Params) -> Result<(), ConfigError>;

    /// A client bound to its own copy of `params`. Performs no I/O.
    fn new_client(&self, params: Params) -> Result<Self::Client, ConfigError>;
}

// ---------------------------------------------------------------------------
// TransferClientFactory
// ---------------------------------------------------------------------------

/// Factory for [`TransferClient`]s over one shared context.
#[derive(Clone)]
pub struct TransferClientFactory {
    context: Arc<ClientContext>,
}

impl TransferClientFactory {
    pub fn new(context: ClientContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    pub fn context(&self) -> &ClientContext {
        &self.context
    }
}

impl ClientFactory for TransferClientFactory {
    type Client = TransferClient;

    fn validate_config(&self, params: &Params) -> Result<(), ConfigError> {
        params.validate()
    }

    fn new_client(&self, params: Params) -> Result<TransferClient, ConfigError> {
        self.validate_config(&params)?;
        let signer = TwoPhaseSigner::new(
            Arc::clone(&self.context.accounts),
            self.context.chain_id.clone(),
            self.context.sign_mode,
        );
        Ok(TransferClient {
            params,
            context: Arc::clone(&self.context),
            signer,
            memos: self.context.memo_generator(),
        })
    }
}

// ---------------------------------------------------------------------------
// TransferClient
// ---------------------------------------------------------------------------

/// Generates transfers from `params.sender` to `params.recipient`.
///
/// The only mutable state is the client's own memo RNG. Nothing else is
/// written per call apart from whatever the account provider keeps.
pub struct TransferClient {
    params: Params,
    context: Arc<ClientContext>,
    signer: TwoPhaseSigner,
    memos: MemoGenerator,
}

impl TransferClient {
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Build and sign one transfer without encoding it.
    pub fn generate_signed(&self) -> Result<SignedTx, GenerationError> {
        let sender = self.resolve(&self.params.sender)?;
        let recipient = self.resolve(&self.params.recipient)?;

        let memo = self.memos.generate(self.params.memo_length);
        let unsigned = TransactionBuilder::transfer(&sender, &recipient, &self.params)
            .memo(memo)
            .build()?;

        self.signer.sign(unsigned, &sender)
    }

    fn resolve(&self, alias: &str) -> Result<Identity, GenerationError> {
        self.context.keystore.resolve(alias).map_err(|err| {
            warn!(alias, error = %err, "key lookup failed");
            GenerationError::from(err)
        })
    }
}

impl Client for TransferClient {
    fn generate_tx(&self) -> Result<Vec<u8>, GenerationError> {
        let signed = self.generate_signed()?;
        let bytes = match self.context.encoder.encode(&signed) {
            Ok(bytes) => bytes,
            Err(err) => {
                if let (Some(msg), Some(info)) = (signed.message(), signed.signer_info()) {
                    self.signer.release(&msg.from_address, info.sequence);
                }
                return Err(err.into());
            }
        };

        debug!(
            sender = %self.params.sender,
            recipient = %self.params.recipient,
            sequence = signed.signer_info().map(|info| info.sequence),
            format = self.context.encoder.format(),
            size = bytes.len(),
            tx_hash = %tx_hash(&bytes),
            "generated transfer"
        );
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
