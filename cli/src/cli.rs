//! # CLI Interface
//!
//! Defines the command-line argument structure for `ledger-loadtest` using
//! `clap` derive. Supports four subcommands: `generate`, `validate`,
//! `keys`, and `version`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use ledger_loadtest::config::{DEFAULT_CHAIN_ID, DEFAULT_RECIPIENT_ALIAS, DEFAULT_SENDER_ALIAS};
use ledger_loadtest::{BinaryCodec, JsonCodec, Params, SignMode, TxDecoder, TxEncoder};

use crate::logging::LogFormat;

/// Offline generator of signed bank transfers for chain load tests.
///
/// Produces hex-encoded, fully signed transactions on stdout, one per
/// line, using deterministic development keys. Pipe the output into
/// whatever tool pushes load at the node.
#[derive(Parser, Debug)]
#[command(
    name = "ledger-loadtest",
    about = "Signed transfer generator for chain load tests",
    version,
    propagate_version = true
)]
pub struct LoadtestCli {
    /// Log output format. Logs always go to stderr.
    #[arg(long, global = true, value_enum, env = "LOADTEST_LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, env = "LOADTEST_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate signed transfers and print them hex-encoded.
    Generate(GenerateArgs),
    /// Check a parameters file without generating anything.
    Validate(ValidateArgs),
    /// Print the development identities for a set of aliases.
    Keys(KeysArgs),
    /// Print version information and exit.
    Version,
}

/// Wire encoding of the generated transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Encoding {
    Binary,
    Json,
}

impl Encoding {
    pub fn encoder(self) -> Arc<dyn TxEncoder> {
        match self {
            Encoding::Binary => Arc::new(BinaryCodec),
            Encoding::Json => Arc::new(JsonCodec),
        }
    }

    pub fn decoder(self) -> Box<dyn TxDecoder> {
        match self {
            Encoding::Binary => Box::new(BinaryCodec),
            Encoding::Json => Box::new(JsonCodec),
        }
    }
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Parameters file (TOML). Flags below override its values.
    #[arg(long, short = 'c', env = "LOADTEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Flat fee amount. Required without `--config`.
    #[arg(long, allow_negative_numbers = true)]
    pub fee: Option<i64>,

    /// Transfer amount. Required without `--config`.
    #[arg(long, allow_negative_numbers = true)]
    pub amount: Option<i64>,

    /// Denomination for transfer and fee. Required without `--config`.
    #[arg(long)]
    pub denom: Option<String>,

    /// Gas limit. Required without `--config`.
    #[arg(long)]
    pub gas_limit: Option<u64>,

    /// Memo length in characters.
    #[arg(long)]
    pub memo_length: Option<usize>,

    /// Sender key alias.
    #[arg(long)]
    pub sender: Option<String>,

    /// Recipient key alias.
    #[arg(long)]
    pub recipient: Option<String>,

    /// Chain identifier bound into every signature.
    #[arg(long, env = "LOADTEST_CHAIN_ID", default_value = DEFAULT_CHAIN_ID)]
    pub chain_id: String,

    /// Number of transactions to generate.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,

    /// Seed for the memo RNG. Omit for OS entropy.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Sender's on-chain account number.
    #[arg(long, default_value_t = 0)]
    pub account_number: u64,

    /// Sender's current on-chain sequence.
    #[arg(long, default_value_t = 0)]
    pub sequence: u64,

    /// Hand out consecutive sequences instead of reusing `--sequence`.
    #[arg(long)]
    pub track_sequence: bool,

    /// Sign mode.
    #[arg(long, default_value_t = SignMode::Direct)]
    pub sign_mode: SignMode,

    /// Output encoding.
    #[arg(long, value_enum, default_value_t = Encoding::Binary)]
    pub encoding: Encoding,

    /// Decode and verify every transaction before printing it.
    #[arg(long)]
    pub verify: bool,
}

impl GenerateArgs {
    /// Parameters from `--config` (if any) with flag overrides applied.
    pub fn params(&self) -> Result<Params> {
        let mut params = match &self.config {
            Some(path) => Params::from_file(path)
                .with_context(|| format!("failed to load params from {}", path.display()))?,
            None => Params::new(
                self.fee.context("--fee is required without --config")?,
                self.amount.context("--amount is required without --config")?,
                self.denom
                    .as_deref()
                    .context("--denom is required without --config")?,
                self.gas_limit
                    .context("--gas-limit is required without --config")?,
            ),
        };

        if let Some(fee) = self.fee {
            params.fee = fee;
        }
        if let Some(amount) = self.amount {
            params.amount = amount;
        }
        if let Some(denom) = &self.denom {
            params.denom = denom.clone();
        }
        if let Some(gas_limit) = self.gas_limit {
            params.gas_limit = gas_limit;
        }
        if let Some(memo_length) = self.memo_length {
            params.memo_length = memo_length;
        }
        if let Some(sender) = &self.sender {
            params.sender = sender.clone();
        }
        if let Some(recipient) = &self.recipient {
            params.recipient = recipient.clone();
        }
        Ok(params)
    }
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Parameters file (TOML) to check.
    pub config: PathBuf,
}

/// Arguments for the `keys` subcommand.
#[derive(Args, Debug)]
pub struct KeysArgs {
    /// Aliases to derive development identities for.
    #[arg(long = "alias", default_values_t = [DEFAULT_SENDER_ALIAS.to_string(), DEFAULT_RECIPIENT_ALIAS.to_string()])]
    pub aliases: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    fn generate(args: &[&str]) -> GenerateArgs {
        let argv = ["ledger-loadtest", "generate"].iter().chain(args);
        match LoadtestCli::parse_from(argv).command {
            Commands::Generate(args) => args,
            other => panic!("expected generate, got {:?}", other),
        }
    }

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        LoadtestCli::command().debug_assert();
    }

    #[test]
    fn generate_defaults() {
        let args = generate(&["--fee", "100", "--amount", "1000", "--denom", "token", "--gas-limit", "200000"]);
        assert_eq!(args.count, 1);
        assert_eq!(args.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(args.sign_mode, SignMode::Direct);
        assert_eq!(args.encoding, Encoding::Binary);
        assert!(!args.track_sequence);

        let params = args.params().unwrap();
        assert_eq!(params, Params::new(100, 1000, "token", 200_000));
    }

    #[test]
    fn generate_parses_modes() {
        let args = generate(&[
            "--fee", "1", "--amount", "2", "--denom", "token", "--gas-limit", "3",
            "--sign-mode", "amino-json", "--encoding", "json", "-n", "5", "--seed", "9",
        ]);
        assert_eq!(args.sign_mode, SignMode::LegacyAminoJson);
        assert_eq!(args.encoding, Encoding::Json);
        assert_eq!(args.count, 5);
        assert_eq!(args.seed, Some(9));
    }

    #[test]
    fn missing_flags_without_config_fail() {
        let args = generate(&["--fee", "100"]);
        let err = args.params().unwrap_err();
        assert!(err.to_string().contains("--amount"));
    }

    #[test]
    fn negative_amount_reaches_validation() {
        let args = generate(&["--fee", "1", "--amount", "-5", "--denom", "token", "--gas-limit", "3"]);
        let params = args.params().unwrap();
        assert!(params.validate().is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "fee = 100\namount = 1000\ndenom = \"token\"\ngas_limit = 200000\nsender = \"alice\""
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = generate(&["--config", &path, "--amount", "5", "--memo-length", "16"]);
        let params = args.params().unwrap();
        assert_eq!(params.fee, 100);
        assert_eq!(params.amount, 5);
        assert_eq!(params.memo_length, 16);
        assert_eq!(params.sender, "alice");
        assert_eq!(params.recipient, DEFAULT_RECIPIENT_ALIAS);
    }

    #[test]
    fn keys_default_aliases() {
        match LoadtestCli::parse_from(["ledger-loadtest", "keys"]).command {
            Commands::Keys(args) => assert_eq!(args.aliases, vec!["user1", "user2"]),
            other => panic!("expected keys, got {:?}", other),
        }
    }
}
