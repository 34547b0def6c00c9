//! Integration tests for the asynchronous bulk-load.

#[path = "../support/mod.rs"]
mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crm_store::{
    async_trait, CrmStore, DeleteAccounting, FetchError, InMemoryStorage, InitialDataSource,
    SeedData, StaticSeed, StoreConfig,
};
use support::{contact_draft, deal_draft, memory_store};

struct Unreachable;

#[async_trait]
impl InitialDataSource for Unreachable {
    async fn fetch(&self) -> Result<SeedData, FetchError> {
        Err(FetchError::new("connection refused"))
    }
}

/// Counts fetches and serves the static seed.
#[derive(Clone, Default)]
struct CountingSource {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl InitialDataSource for CountingSource {
    async fn fetch(&self) -> Result<SeedData, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StaticSeed::data()
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("crm_store=debug")
        .with_test_writer()
        .try_init();
}

#[tokio::test(start_paused = true)]
async fn loads_seed_and_recomputes_stats() {
    let store = CrmStore::new();

    assert!(store.fetch_initial_data().await);

    let stats = store.stats();
    assert_eq!(stats.total_contacts, 5);
    assert_eq!(stats.total_deals, 5);
    assert_eq!(stats.deal_value, 25000 + 15000 + 42000 + 8000 + 36000);
    assert_eq!(stats.activities_completed, 1);
    assert!(store.stats_drift().is_none());
    assert!(!store.is_loading());
}

#[tokio::test(start_paused = true)]
async fn waits_the_configured_latency() {
    let store = CrmStore::builder(StoreConfig::default().with_fetch_delay(Duration::from_secs(2)))
        .build();

    let started = tokio::time::Instant::now();
    store.fetch_initial_data().await;
    assert!(started.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn failure_leaves_state_untouched() {
    init_tracing();
    let store = CrmStore::builder(StoreConfig::default())
        .with_source(Unreachable)
        .build();
    store.add_contact(contact_draft("Ada"));
    let before = store.snapshot();

    assert!(!store.fetch_initial_data().await);

    assert_eq!(store.snapshot(), before);
    assert!(!store.is_loading());
}

#[tokio::test(start_paused = true)]
async fn edits_during_load_are_overwritten() {
    let store = CrmStore::new();
    let loader = store.clone();
    let load = tokio::spawn(async move { loader.fetch_initial_data().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(store.is_loading());

    // The store stays readable and writable while the load is pending.
    store.add_contact(contact_draft("Interleaved"));
    assert_eq!(store.contacts().len(), 1);

    assert!(load.await.unwrap());
    assert!(!store.is_loading());

    let contacts = store.contacts();
    assert_eq!(contacts.len(), 5);
    assert!(contacts.iter().all(|c| c.name != "Interleaved"));
    assert_eq!(store.stats().total_contacts, 5);
}

#[tokio::test(start_paused = true)]
async fn replaces_existing_state_and_repairs_drift() {
    let store = memory_store(DeleteAccounting::Legacy);
    store.add_deal(deal_draft("Old", 7));
    store.delete_deal(999);
    assert!(store.stats_drift().is_some());

    store.fetch_initial_data().await;

    assert!(store.deals().iter().all(|d| d.title != "Old"));
    assert!(store.stats_drift().is_none());
}

#[tokio::test(start_paused = true)]
async fn loaded_state_is_persisted() {
    let storage = InMemoryStorage::new();
    let store = CrmStore::builder(StoreConfig::default())
        .with_storage(storage.clone())
        .build();
    store.fetch_initial_data().await;

    let restarted = CrmStore::builder(StoreConfig::default())
        .with_storage(storage)
        .build();
    assert_eq!(restarted.snapshot(), store.snapshot());
}

#[tokio::test(start_paused = true)]
async fn new_ids_do_not_collide_with_seed() {
    let store = CrmStore::new();
    store.fetch_initial_data().await;

    let id = store.add_contact(contact_draft("Newcomer"));
    assert!(id > 5);
    assert_eq!(store.contacts().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn each_call_fetches_again() {
    let source = CountingSource::default();
    let store = CrmStore::builder(StoreConfig::default().with_fetch_delay(Duration::ZERO))
        .with_source(source.clone())
        .build();

    store.fetch_initial_data().await;
    store.add_contact(contact_draft("Extra"));
    store.fetch_initial_data().await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.contacts().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn dropped_load_clears_loading_flag() {
    let store = CrmStore::new();
    let loader = store.clone();
    let load = tokio::spawn(async move { loader.fetch_initial_data().await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(store.is_loading());

    load.abort();
    let _ = load.await;
    assert!(!store.is_loading());
    assert!(store.contacts().is_empty());
}
