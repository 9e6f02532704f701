// Generation benchmarks for the transfer generator.
//
// Covers memo generation, sign-doc construction per sign mode, the full
// build-sign-encode path per encoding, and verification of a generated
// transaction.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use ledger_loadtest::account::{AccountState, MemoryAccountStore, SequenceTracker};
use ledger_loadtest::config::Params;
use ledger_loadtest::identity::{KeyStore, MemoryKeyStore};
use ledger_loadtest::memo::{MemoGenerator, MemoSeed};
use ledger_loadtest::transaction::{
    verify_signed_tx, BinaryCodec, JsonCodec, SignMode, SignModeHandler, SignerData,
    TransactionBuilder, TxDecoder, TxEncoder,
};
use ledger_loadtest::{Client, ClientContext, ClientFactory, TransferClientFactory};

const CHAIN_ID: &str = "manifest-bench-1";

fn client(mode: SignMode, encoder: Arc<dyn TxEncoder>) -> impl Client {
    let keys = MemoryKeyStore::with_dev_keys(&["user1", "user2"]);
    let user1 = keys.resolve("user1").unwrap();
    let store = Arc::new(MemoryAccountStore::new());
    store.set(*user1.address(), AccountState::new(7, 0));

    let context = ClientContext::new(Arc::new(keys), Arc::new(SequenceTracker::new(store)), CHAIN_ID)
        .unwrap()
        .with_sign_mode(mode)
        .with_encoder(encoder)
        .with_memo_seed(MemoSeed::Fixed(1));
    TransferClientFactory::new(context)
        .new_client(Params::new(100, 1000, "token", 200_000))
        .unwrap()
}

fn bench_memo(c: &mut Criterion) {
    let memos = MemoGenerator::seeded(7);
    c.bench_function("memo/generate_10", |b| {
        b.iter(|| memos.generate(10));
    });
}

fn bench_sign_bytes(c: &mut Criterion) {
    let keys = MemoryKeyStore::with_dev_keys(&["user1", "user2"]);
    let user1 = keys.resolve("user1").unwrap();
    let user2 = keys.resolve("user2").unwrap();
    let params = Params::new(100, 1000, "token", 200_000);
    let data = SignerData {
        chain_id: CHAIN_ID.into(),
        account_number: 7,
        sequence: 3,
        public_key: user1.public_key().clone(),
    };

    let mut group = c.benchmark_group("sign_bytes");
    for mode in SignMode::ALL {
        let placeholder = TransactionBuilder::transfer(&user1, &user2, &params)
            .memo("abcdefghij")
            .build()
            .unwrap()
            .with_placeholder(user1.public_key().clone(), mode, 3);
        let handler = SignModeHandler::new(mode);
        group.bench_with_input(BenchmarkId::from_parameter(mode), &placeholder, |b, p| {
            b.iter(|| handler.sign_bytes(mode, &data, p.body(), p.auth_info()).unwrap());
        });
    }
    group.finish();
}

fn bench_generate_tx(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_tx");
    let cases: [(&str, SignMode, Arc<dyn TxEncoder>); 2] = [
        ("direct/binary", SignMode::Direct, Arc::new(BinaryCodec)),
        ("amino-json/json", SignMode::LegacyAminoJson, Arc::new(JsonCodec)),
    ];
    for (name, mode, encoder) in cases {
        let client = client(mode, encoder);
        group.bench_function(name, |b| {
            b.iter(|| client.generate_tx().unwrap());
        });
    }
    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let bytes = client(SignMode::Direct, Arc::new(BinaryCodec)).generate_tx().unwrap();
    let tx = BinaryCodec.decode(&bytes).unwrap();

    c.bench_function("verify/signed_tx", |b| {
        b.iter(|| verify_signed_tx(&tx, CHAIN_ID, 7).unwrap());
    });
}

criterion_group!(
    benches,
    bench_memo,
    bench_sign_bytes,
    bench_generate_tx,
    bench_verify,
);
criterion_main!(benches);
