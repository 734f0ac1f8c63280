//! # Persistence and Loading Integration Tests
//!
//! Drives a storage-backed pool through the public API only.
//!
//! ## Test Categories
//!
//! 1. **Durable Mirror** - what gets written, deleted or skipped
//! 2. **Storage Faults** - write and scan failures surface as error events
//! 3. **Reload** - a fresh pool rebuilt from storage matches the pool that wrote it
//! 4. **Isolation** - wallets sharing one store stay apart

use ed25519_dalek::SigningKey;
use std::sync::Arc;
use tokio::sync::broadcast;
use wallet_txpool::{
    AddOutcome, InMemoryKVStore, KeyValueStore, KeyWallet, MockTimeSource, OutPoint, PoolConfig,
    PoolEvent, PoolTransaction, TxInput, TxOutput, WalletTransaction, WalletTxPool, U512,
};

// =============================================================================
// TEST HELPERS
// =============================================================================

const NOW: u64 = 1_700_000_000;

type Pool = WalletTxPool<WalletTransaction, KeyWallet>;

fn key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

fn pubkey(key: &SigningKey) -> [u8; 32] {
    key.verifying_key().to_bytes()
}

fn make_pool(store: &Arc<InMemoryKVStore>, prefix: &str, owner: &SigningKey) -> (Pool, Arc<MockTimeSource>) {
    let clock = Arc::new(MockTimeSource::new(NOW));
    let pool = WalletTxPool::with_storage(
        KeyWallet::from_keys([pubkey(owner)]),
        PoolConfig::for_wallet(prefix),
        store.clone(),
    )
    .with_time_source(clock.clone());
    (pool, clock)
}

fn make_funding(owner: &SigningKey, value: u64, nonce: u32) -> WalletTransaction {
    WalletTransaction::new(vec![], vec![TxOutput::new(value, pubkey(owner))])
        .with_lock_time(nonce)
        .seen_at(NOW)
}

fn make_spend(
    parent: &WalletTransaction,
    index: u32,
    signer: &SigningKey,
    outputs: &[(u64, &SigningKey)],
) -> WalletTransaction {
    let outputs = outputs
        .iter()
        .map(|(value, to)| TxOutput::new(*value, pubkey(to)))
        .collect();
    let mut tx = WalletTransaction::new(
        vec![TxInput::unsigned(OutPoint::new(parent.hash(), index))],
        outputs,
    )
    .seen_at(NOW);
    tx.sign_input(0, signer);
    tx
}

async fn stored(store: &InMemoryKVStore, prefix: &str, tx: &WalletTransaction) -> Option<WalletTransaction> {
    let key = PoolConfig::for_wallet(prefix).record_key(&tx.hash());
    store
        .get(&key)
        .await
        .unwrap()
        .map(|bytes| wallet_txpool::decode_record(&bytes).unwrap())
}

fn drain(rx: &mut broadcast::Receiver<PoolEvent>) -> Vec<PoolEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

fn errors(events: &[PoolEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, PoolEvent::Error { .. }))
        .count()
}

// =============================================================================
// DURABLE MIRROR
// =============================================================================

#[tokio::test]
async fn test_relevant_tx_is_written() {
    let alice = key(1);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut pool, _) = make_pool(&store, "alice/", &alice);
    let a = make_funding(&alice, 5000, 0);

    assert_eq!(pool.add(a.clone(), false), AddOutcome::Added);
    pool.flush().await;

    assert_eq!(stored(&store, "alice/", &a).await.unwrap().hash(), a.hash());
}

#[tokio::test]
async fn test_suppressed_add_writes_nothing() {
    let alice = key(1);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut pool, _) = make_pool(&store, "alice/", &alice);

    pool.add(make_funding(&alice, 5000, 0), true);
    pool.flush().await;

    assert!(store.is_empty());
}

#[tokio::test]
async fn test_spend_only_tx_is_written_irrelevant_is_not() {
    let alice = key(1);
    let bob = key(2);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut pool, _) = make_pool(&store, "alice/", &alice);
    let a = make_funding(&alice, 5000, 0);
    let spend = make_spend(&a, 0, &alice, &[(5000, &bob)]);
    let foreign = make_funding(&bob, 10, 0);

    pool.add(a.clone(), false);
    assert_eq!(pool.add(spend.clone(), false), AddOutcome::SpendOnly);
    assert_eq!(pool.add(foreign.clone(), false), AddOutcome::SpendOnly);
    pool.flush().await;

    assert!(stored(&store, "alice/", &spend).await.is_some());
    assert!(stored(&store, "alice/", &foreign).await.is_none());
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_confirmation_rewrites_record() {
    let alice = key(1);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut pool, _) = make_pool(&store, "alice/", &alice);
    let a = make_funding(&alice, 5000, 0);

    pool.add(a.clone(), false);
    assert_eq!(
        pool.add(a.clone().confirmed(NOW + 60, [0xB1; 32]), false),
        AddOutcome::Confirmed
    );
    pool.flush().await;

    let record = stored(&store, "alice/", &a).await.unwrap();
    assert_eq!(record.ts(), NOW + 60);
    assert_eq!(record.block(), Some([0xB1; 32]));
}

#[tokio::test]
async fn test_stale_reingest_deletes_record() {
    let alice = key(1);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut pool, clock) = make_pool(&store, "alice/", &alice);
    let c = make_funding(&alice, 700, 0);

    pool.add(c.clone(), false);
    pool.flush().await;
    assert!(stored(&store, "alice/", &c).await.is_some());

    clock.advance(3 * 24 * 3600);
    assert_eq!(pool.add(c.clone(), false), AddOutcome::Expired);
    pool.flush().await;

    assert!(stored(&store, "alice/", &c).await.is_none());
    assert_eq!(pool.balance(), U512::zero());
}

#[tokio::test]
async fn test_invalid_orphan_record_is_deleted() {
    let alice = key(1);
    let mallory = key(9);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut pool, _) = make_pool(&store, "alice/", &alice);
    let a = make_funding(&alice, 5000, 0);
    let forged = make_spend(&a, 0, &mallory, &[(4000, &alice)]);

    pool.add(forged.clone(), false);
    pool.flush().await;
    assert!(stored(&store, "alice/", &forged).await.is_some());

    pool.add(a.clone(), false);
    pool.flush().await;

    assert!(stored(&store, "alice/", &forged).await.is_none());
    assert!(stored(&store, "alice/", &a).await.is_some());
    assert_eq!(pool.balance(), U512::from(5000u64));
}

#[tokio::test]
async fn test_suppressed_stale_reingest_keeps_record() {
    let alice = key(1);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut pool, clock) = make_pool(&store, "alice/", &alice);
    let c = make_funding(&alice, 700, 0);

    pool.add(c.clone(), false);
    pool.flush().await;
    let mut rx = pool.subscribe();
    // A stray delete would fail and surface as an error event.
    store.fail_writes(true);

    clock.advance(3 * 24 * 3600);
    assert_eq!(pool.add(c.clone(), true), AddOutcome::Expired);
    pool.flush().await;

    assert_eq!(pool.balance(), U512::zero());
    assert!(stored(&store, "alice/", &c).await.is_some());
    assert_eq!(errors(&drain(&mut rx)), 0);
}

#[tokio::test]
async fn test_suppressed_invalid_orphan_keeps_record() {
    let alice = key(1);
    let mallory = key(9);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut pool, _) = make_pool(&store, "alice/", &alice);
    let a = make_funding(&alice, 5000, 0);
    let forged = make_spend(&a, 0, &mallory, &[(4000, &alice)]);

    pool.add(forged.clone(), false);
    pool.flush().await;
    let mut rx = pool.subscribe();
    store.fail_writes(true);

    assert_eq!(pool.add(a.clone(), true), AddOutcome::Added);
    pool.flush().await;

    // Pruned in memory only.
    assert_eq!(pool.balance(), U512::from(5000u64));
    assert!(stored(&store, "alice/", &forged).await.is_some());
    assert!(stored(&store, "alice/", &a).await.is_none());
    assert_eq!(errors(&drain(&mut rx)), 0);
}

// =============================================================================
// STORAGE FAULTS
// =============================================================================

#[tokio::test]
async fn test_write_failure_keeps_memory_state() {
    let alice = key(1);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut pool, _) = make_pool(&store, "alice/", &alice);
    let mut rx = pool.subscribe();
    store.fail_writes(true);

    assert_eq!(pool.add(make_funding(&alice, 5000, 0), false), AddOutcome::Added);
    pool.flush().await;

    assert_eq!(pool.balance(), U512::from(5000u64));
    assert!(store.is_empty());
    assert_eq!(errors(&drain(&mut rx)), 1);
}

#[tokio::test]
async fn test_scan_failure_leaves_partial_state() {
    let alice = key(1);
    let store = Arc::new(InMemoryKVStore::new());
    {
        let (mut writer, _) = make_pool(&store, "alice/", &alice);
        for nonce in 0..3 {
            writer.add(make_funding(&alice, 100, nonce), false);
        }
        writer.flush().await;
    }
    store.fail_scan_after(Some(2));

    let (mut pool, _) = make_pool(&store, "alice/", &alice);
    let mut rx = pool.subscribe();

    assert!(pool.load().await.is_err());
    assert!(!pool.is_loaded());
    assert_eq!(pool.unspent().len(), 2);
    assert_eq!(pool.balance(), U512::from(200u64));

    let events = drain(&mut rx);
    assert_eq!(errors(&events), 1);
    assert!(!events.iter().any(|e| matches!(e, PoolEvent::Ready { .. })));
}

#[tokio::test]
async fn test_open_reports_load_failure() {
    let alice = key(1);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut writer, _) = make_pool(&store, "alice/", &alice);
    writer.add(make_funding(&alice, 42, 0).confirmed(NOW, [1; 32]), false);
    writer.flush().await;
    store.fail_scan_after(Some(0));

    let result: Result<Pool, _> = WalletTxPool::open(
        KeyWallet::from_keys([pubkey(&alice)]),
        PoolConfig::for_wallet("alice/"),
        store.clone(),
    )
    .await;

    assert!(matches!(result, Err(wallet_txpool::PoolError::Storage(_))));
}

// =============================================================================
// RELOAD
// =============================================================================

#[tokio::test]
async fn test_reload_reproduces_state() {
    let alice = key(1);
    let bob = key(2);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut source, _) = make_pool(&store, "alice/", &alice);
    let a = make_funding(&alice, 5000, 0).confirmed(NOW, [1; 32]);
    let b = make_spend(&a, 0, &alice, &[(1500, &bob), (3400, &alice)]);
    let c = make_funding(&alice, 75, 1);
    for tx in [a, b, c] {
        source.add(tx, false);
    }
    source.flush().await;

    let (mut reloaded, _) = make_pool(&store, "alice/", &alice);
    let mut rx = reloaded.subscribe();
    assert_eq!(reloaded.load().await.unwrap(), NOW);

    let keys = |pool: &Pool| -> Vec<OutPoint> {
        pool.unspent().iter().map(|u| u.outpoint()).collect()
    };
    assert_eq!(keys(&reloaded), keys(&source));
    assert_eq!(reloaded.balance(), source.balance());
    assert_eq!(reloaded.balance(), U512::from(3475u64));
    assert!(reloaded.is_loaded());
    assert_eq!(
        drain(&mut rx).last(),
        Some(&PoolEvent::Ready { last_ts: NOW })
    );
}

#[tokio::test]
async fn test_open_loads_store() {
    let alice = key(1);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut writer, _) = make_pool(&store, "alice/", &alice);
    // Confirmed, so the system clock used by `open` cannot expire it.
    writer.add(make_funding(&alice, 42, 0).confirmed(NOW, [1; 32]), false);
    writer.flush().await;

    let pool: Pool = WalletTxPool::open(
        KeyWallet::from_keys([pubkey(&alice)]),
        PoolConfig::for_wallet("alice/"),
        store.clone(),
    )
    .await
    .unwrap();

    assert!(pool.is_loaded());
    assert_eq!(pool.balance(), U512::from(42u64));
}

#[tokio::test]
async fn test_import_persists_records() {
    let alice = key(1);
    let source_store = Arc::new(InMemoryKVStore::new());
    let (mut source, _) = make_pool(&source_store, "alice/", &alice);
    let a = make_funding(&alice, 900, 0);
    source.add(a.clone(), true);

    let store = Arc::new(InMemoryKVStore::new());
    let (mut target, _) = make_pool(&store, "alice/", &alice);
    let outcomes = target.import_json(&source.export_json().unwrap()).unwrap();
    target.flush().await;

    assert_eq!(outcomes, vec![AddOutcome::Added]);
    assert!(stored(&store, "alice/", &a).await.is_some());
}

#[tokio::test]
async fn test_bad_envelope_ingests_nothing() {
    let alice = key(1);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut pool, _) = make_pool(&store, "alice/", &alice);
    let mut snapshot = pool.export();
    snapshot.txs.push(make_funding(&alice, 5000, 0));
    snapshot.v = 2;

    assert!(pool.import(snapshot).is_err());
    pool.flush().await;

    assert!(pool.is_empty());
    assert!(store.is_empty());
}

// =============================================================================
// ISOLATION
// =============================================================================

#[tokio::test]
async fn test_wallet_prefixes_are_isolated() {
    let alice = key(1);
    let bob = key(2);
    let store = Arc::new(InMemoryKVStore::new());
    let (mut alice_pool, _) = make_pool(&store, "alice/", &alice);
    let (mut bob_pool, _) = make_pool(&store, "bob/", &bob);
    alice_pool.add(make_funding(&alice, 10, 0), false);
    bob_pool.add(make_funding(&bob, 20, 0), false);
    alice_pool.flush().await;
    bob_pool.flush().await;

    let (mut reloaded, _) = make_pool(&store, "alice/", &alice);
    reloaded.load().await.unwrap();

    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded.balance(), U512::from(10u64));
}
