//! End-to-end integration tests for the transfer generator.
//!
//! These tests drive the public factory/client boundary exactly as a
//! load-test harness would: build a context, validate parameters, create
//! clients, call `generate_tx`, then decode and verify the returned bytes.
//!
//! Each test builds its own key store and account table. No shared state,
//! no test ordering dependencies.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use ledger_loadtest::account::{AccountLookupError, AccountState, AccountStateProvider, MemoryAccountStore, SequenceTracker};
use ledger_loadtest::config::{ConfigError, Params, DEFAULT_MEMO_LENGTH};
use ledger_loadtest::identity::{Address, Identity, KeyLookupError, KeyStore, MemoryKeyStore};
use ledger_loadtest::memo::{is_valid_memo, MemoSeed};
use ledger_loadtest::transaction::{
    verify_signed_tx, BinaryCodec, Coin, JsonCodec, MessageConstructionError, SignMode, SignedTx,
    TxDecoder, VerificationError,
};
use ledger_loadtest::{Client, ClientContext, ClientFactory, GenerationError, TransferClientFactory};

const CHAIN_ID: &str = "manifest-e2e-1";

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

struct Harness {
    factory: TransferClientFactory,
    accounts: Arc<MemoryAccountStore>,
    user1: Identity,
    user2: Identity,
}

/// user1 is account #7 at sequence 3; user2 has no account.
fn harness_with(configure: impl FnOnce(ClientContext) -> ClientContext) -> Harness {
    let keys = MemoryKeyStore::with_dev_keys(&["user1", "user2"]);
    let user1 = keys.resolve("user1").unwrap();
    let user2 = keys.resolve("user2").unwrap();

    let accounts = Arc::new(MemoryAccountStore::new());
    accounts.set(*user1.address(), AccountState::new(7, 3));

    let context = ClientContext::new(Arc::new(keys), accounts.clone(), CHAIN_ID).unwrap();
    Harness {
        factory: TransferClientFactory::new(configure(context)),
        accounts,
        user1,
        user2,
    }
}

fn harness() -> Harness {
    harness_with(|ctx| ctx)
}

fn example_params() -> Params {
    Params::new(100, 1000, "token", 200_000)
}

fn decode(bytes: &[u8]) -> SignedTx {
    BinaryCodec.decode(bytes).expect("generated bytes must decode")
}

// ---------------------------------------------------------------------------
// Example scenario
// ---------------------------------------------------------------------------

#[test]
fn example_scenario_produces_expected_transfer() {
    let h = harness();
    let params = example_params();
    h.factory.validate_config(&params).unwrap();
    let client = h.factory.new_client(params).unwrap();

    let tx = decode(&client.generate_tx().unwrap());

    assert_eq!(tx.body().messages.len(), 1);
    let msg = tx.message().unwrap();
    assert_eq!(&msg.from_address, h.user1.address());
    assert_eq!(&msg.to_address, h.user2.address());
    assert_eq!(msg.amount, Coin::new(1000, "token"));

    assert_eq!(tx.fee().amount, Coin::new(100, "token"));
    assert_eq!(tx.fee().gas_limit, 200_000);
    assert!(is_valid_memo(tx.memo(), DEFAULT_MEMO_LENGTH));

    let info = tx.signer_info().unwrap();
    assert_eq!(info.sequence, 3);
    assert_eq!(&info.public_key, h.user1.public_key());
    assert_eq!(info.mode, SignMode::Direct);

    verify_signed_tx(&tx, CHAIN_ID, 7).unwrap();
}

#[test]
fn signature_is_bound_to_chain_id() {
    let h = harness();
    let client = h.factory.new_client(example_params()).unwrap();
    let tx = decode(&client.generate_tx().unwrap());

    assert!(matches!(
        verify_signed_tx(&tx, "some-other-chain", 7),
        Err(VerificationError::InvalidSignature { .. })
    ));
}

#[test]
fn amino_json_mode_verifies() {
    let h = harness_with(|ctx| {
        ctx.with_sign_mode(SignMode::LegacyAminoJson)
            .with_encoder(Arc::new(JsonCodec))
    });
    let client = h.factory.new_client(example_params()).unwrap();

    let bytes = client.generate_tx().unwrap();
    let tx = JsonCodec.decode(&bytes).unwrap();
    assert_eq!(tx.signer_info().unwrap().mode, SignMode::LegacyAminoJson);
    verify_signed_tx(&tx, CHAIN_ID, 7).unwrap();
}

#[test]
fn tampered_body_invalidates_signature() {
    let h = harness();
    let client = h.factory.new_client(example_params()).unwrap();
    let tx = decode(&client.generate_tx().unwrap());

    let (mut body, auth_info, signatures) = tx.into_parts();
    body.messages[0].amount.amount = 1_000_000;
    let tampered = SignedTx::from_parts(body, auth_info, signatures);

    assert!(matches!(
        verify_signed_tx(&tampered, CHAIN_ID, 7),
        Err(VerificationError::InvalidSignature { .. })
    ));
}

// ---------------------------------------------------------------------------
// Repeated calls
// ---------------------------------------------------------------------------

#[test]
fn successive_calls_have_different_memos() {
    let h = harness();
    let params = example_params();
    h.factory.validate_config(&params).unwrap();
    let client = h.factory.new_client(params).unwrap();

    let memos: HashSet<String> = (0..100)
        .map(|_| decode(&client.generate_tx().unwrap()).memo().to_string())
        .collect();
    assert_eq!(memos.len(), 100);
}

#[test]
fn seeded_runs_are_reproducible() {
    let run = || {
        let h = harness_with(|ctx| ctx.with_memo_seed(MemoSeed::Fixed(42)));
        let client = h.factory.new_client(example_params()).unwrap();
        (0..3).map(|_| client.generate_tx().unwrap()).collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn embedded_sequence_tracks_provider() {
    let h = harness();
    let client = h.factory.new_client(example_params()).unwrap();

    for expected in 3..6 {
        let tx = decode(&client.generate_tx().unwrap());
        assert_eq!(tx.signer_info().unwrap().sequence, expected);
        verify_signed_tx(&tx, CHAIN_ID, 7).unwrap();
        h.accounts.increment_sequence(h.user1.address()).unwrap();
    }
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn zero_amount_is_a_message_construction_error() {
    let h = harness();
    for (fee, gas) in [(100, 200_000), (0, 0), (5, 1)] {
        let params = Params::new(fee, 0, "token", gas);
        let client = h.factory.new_client(params).unwrap();
        assert!(matches!(
            client.generate_tx(),
            Err(GenerationError::MessageConstruction(
                MessageConstructionError::NonPositiveAmount { amount: 0 }
            ))
        ));
    }
}

#[test]
fn any_non_empty_denom_produces_bytes() {
    let h = harness();
    for denom in ["x", "ab", "1token"] {
        let params = Params::new(0, 1, denom, 0);
        h.factory.validate_config(&params).unwrap();
        let client = h.factory.new_client(params).unwrap();

        let tx = decode(&client.generate_tx().unwrap());
        assert_eq!(tx.message().unwrap().amount, Coin::new(1, denom));
        verify_signed_tx(&tx, CHAIN_ID, 7).unwrap();
    }
}

#[test]
fn invalid_config_rejected_before_client_creation() {
    let h = harness();
    let cases = [
        Params::new(-1, 1000, "token", 200_000),
        Params::new(100, -1, "token", 200_000),
        Params::new(100, 1000, "", 200_000),
    ];
    for params in cases {
        assert!(h.factory.validate_config(&params).is_err());
        assert!(h.factory.new_client(params).is_err());
    }
    assert!(matches!(
        h.factory.validate_config(&Params::new(100, 1000, "", 1)),
        Err(ConfigError::EmptyDenom)
    ));
}

#[test]
fn unknown_sender_is_a_key_lookup_error() {
    let h = harness();
    let client = h
        .factory
        .new_client(example_params().with_aliases("ghost", "user2"))
        .unwrap();
    match client.generate_tx() {
        Err(GenerationError::KeyLookup(KeyLookupError::NotFound { alias })) => {
            assert_eq!(alias, "ghost")
        }
        other => panic!("expected key lookup failure, got {:?}", other),
    }
}

#[test]
fn missing_account_is_an_account_lookup_error() {
    let h = harness();
    h.accounts.remove(h.user1.address());
    let client = h.factory.new_client(example_params()).unwrap();
    assert!(matches!(
        client.generate_tx(),
        Err(GenerationError::AccountLookup(AccountLookupError::NotFound { .. }))
    ));
}

/// Provider that always reports the backend as unreachable.
struct Unreachable;

impl AccountStateProvider for Unreachable {
    fn fetch(&self, address: &Address) -> Result<AccountState, AccountLookupError> {
        Err(AccountLookupError::Unavailable {
            address: address.to_string(),
            reason: "connection refused".into(),
        })
    }
}

#[test]
fn provider_failure_names_the_address() {
    let keys = MemoryKeyStore::with_dev_keys(&["user1", "user2"]);
    let user1 = keys.resolve("user1").unwrap();
    let context = ClientContext::new(Arc::new(keys), Arc::new(Unreachable), CHAIN_ID).unwrap();
    let client = TransferClientFactory::new(context)
        .new_client(example_params())
        .unwrap();

    let err = client.generate_tx().unwrap_err();
    let text = err.to_string();
    assert!(text.contains(&user1.address().to_string()));
    assert!(text.contains("connection refused"));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_clients_with_tracker_never_reuse_a_sequence() {
    let keys = MemoryKeyStore::with_dev_keys(&["user1", "user2"]);
    let user1 = keys.resolve("user1").unwrap();
    let store = Arc::new(MemoryAccountStore::new());
    store.set(*user1.address(), AccountState::new(7, 100));
    let tracker = Arc::new(SequenceTracker::new(store));

    let context = ClientContext::new(Arc::new(keys), tracker, CHAIN_ID).unwrap();
    let factory = TransferClientFactory::new(context);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = factory.new_client(example_params()).unwrap();
            thread::spawn(move || {
                (0..25)
                    .map(|_| decode(&client.generate_tx().unwrap()))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut sequences = HashSet::new();
    for handle in handles {
        for tx in handle.join().unwrap() {
            verify_signed_tx(&tx, CHAIN_ID, 7).unwrap();
            assert!(sequences.insert(tx.signer_info().unwrap().sequence));
        }
    }
    let expected: HashSet<u64> = (100..200).collect();
    assert_eq!(sequences, expected);
}

#[test]
fn one_client_is_shareable_across_threads() {
    let h = harness();
    let client = Arc::new(h.factory.new_client(example_params()).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = Arc::clone(&client);
            thread::spawn(move || decode(&client.generate_tx().unwrap()))
        })
        .collect();

    let memos: HashSet<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().memo().to_string())
        .collect();
    assert_eq!(memos.len(), 4);
}
