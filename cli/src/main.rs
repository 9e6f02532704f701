// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ledger Load Test CLI
//!
//! Entry point for the `ledger-loadtest` binary. Parses CLI arguments,
//! initializes logging, and drives the transfer generator offline against
//! development keys and a locally seeded account table.
//!
//! The binary supports four subcommands:
//!
//! - `generate` — print hex-encoded signed transfers, one per line
//! - `validate` — check a parameters file
//! - `keys`     — show development identities
//! - `version`  — print build version information

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use ledger_loadtest::account::{AccountState, AccountStateProvider, MemoryAccountStore, SequenceTracker};
use ledger_loadtest::config::validate_denom_strict;
use ledger_loadtest::identity::{KeyStore, MemoryKeyStore};
use ledger_loadtest::transaction::verify_signed_tx;
use ledger_loadtest::{Client, ClientContext, ClientFactory, MemoSeed, Params, TransferClientFactory};

use cli::{Commands, GenerateArgs, KeysArgs, LoadtestCli, ValidateArgs};

fn main() -> Result<()> {
    let cli = LoadtestCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Generate(args) => generate(args),
        Commands::Validate(args) => validate(args),
        Commands::Keys(args) => keys(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Generates `args.count` transfers and writes them to stdout.
fn generate(args: GenerateArgs) -> Result<()> {
    let params = args.params()?;
    params.validate().context("invalid generation parameters")?;

    let keystore = MemoryKeyStore::with_dev_keys(&[&params.sender, &params.recipient]);
    let sender = keystore
        .resolve(&params.sender)
        .context("failed to derive sender key")?;

    // Seed the sender's account so the first transfer signs at --sequence.
    let store = Arc::new(MemoryAccountStore::new());
    store.set(*sender.address(), AccountState::new(args.account_number, args.sequence));
    let accounts: Arc<dyn AccountStateProvider> = if args.track_sequence {
        Arc::new(SequenceTracker::new(store))
    } else {
        store
    };

    let context = ClientContext::new(Arc::new(keystore), accounts, args.chain_id.clone())
        .context("invalid signing context")?
        .with_encoder(args.encoding.encoder())
        .with_sign_mode(args.sign_mode)
        .with_memo_seed(MemoSeed::from(args.seed));
    let factory = TransferClientFactory::new(context);
    let client = factory.new_client(params)?;

    tracing::info!(
        count = args.count,
        chain_id = %args.chain_id,
        sign_mode = %args.sign_mode,
        encoding = ?args.encoding,
        sender = %sender.address(),
        "generating transfers"
    );

    if args.count > 1 && !args.track_sequence {
        tracing::warn!(
            sequence = args.sequence,
            "all transactions share one sequence; pass --track-sequence for consecutive ones"
        );
    }

    let decoder = args.encoding.decoder();
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for i in 0..args.count {
        let bytes = client
            .generate_tx()
            .with_context(|| format!("failed to generate transaction {}", i))?;

        if args.verify {
            let tx = decoder.decode(&bytes)?;
            verify_signed_tx(&tx, &args.chain_id, args.account_number)
                .with_context(|| format!("transaction {} failed verification", i))?;
        }
        writeln!(out, "{}", hex::encode(&bytes))?;
    }
    out.flush()?;

    tracing::info!(count = args.count, "done");
    Ok(())
}

/// Loads and validates a parameters file, printing the result.
fn validate(args: ValidateArgs) -> Result<()> {
    let params = Params::from_file(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    params
        .validate()
        .with_context(|| format!("{} is invalid", args.config.display()))?;

    println!("{} is valid.", args.config.display());
    println!("  Fee        : {}{}", params.fee, params.denom);
    println!("  Amount     : {}{}", params.amount, params.denom);
    println!("  Gas limit  : {}", params.gas_limit);
    println!("  Memo length: {}", params.memo_length);
    println!("  Sender     : {}", params.sender);
    println!("  Recipient  : {}", params.recipient);
    if params.amount == 0 {
        println!("  Warning    : amount is 0; every generation call will fail");
    }
    if let Err(err) = validate_denom_strict(&params.denom) {
        println!("  Warning    : {}; the chain will reject these transfers", err);
    }
    Ok(())
}

/// Prints the development identity behind each alias.
fn keys(args: KeysArgs) -> Result<()> {
    let keystore = MemoryKeyStore::with_dev_keys(&args.aliases);
    for alias in keystore.aliases() {
        let identity = keystore.resolve(alias)?;
        println!("{}", alias);
        println!("  Address    : {}", identity.address());
        println!("  Public key : {}", identity.public_key());
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("ledger-loadtest {}", env!("CARGO_PKG_VERSION"));
    println!("rustc           {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
