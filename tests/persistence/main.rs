//! Integration tests for persist-on-write and rehydration.

#[path = "../support/mod.rs"]
mod support;

use crm_store::{
    ActivityPatch, ContactPatch, CrmStore, DealPatch, DeleteAccounting, FileStorage,
    InMemoryStorage, LocalStorage, StateCodec, StoreConfig, DEFAULT_STORAGE_KEY,
};
use support::{activity_draft, contact_draft, deal_draft, ts};

fn config(codec: StateCodec) -> StoreConfig {
    StoreConfig::default().with_codec(codec)
}

fn open(storage: &InMemoryStorage, config: StoreConfig) -> CrmStore {
    CrmStore::builder(config).with_storage(storage.clone()).build()
}

/// Drive a store through every kind of mutation.
fn exercise(store: &CrmStore) {
    let ada = store.add_contact(contact_draft("Ada"));
    let brian = store.add_contact(contact_draft("Brian"));
    store.update_contact(
        ada,
        ContactPatch::default().with_last_activity(Some(ts("2025-05-03T11:45:00Z"))),
    );
    store.delete_contact(brian);

    let deal = store.add_deal(deal_draft("Hardware Upgrade", 42000));
    store.add_deal(deal_draft("Consulting Services", 15000));
    store.update_deal(deal, DealPatch::default().with_value(40000));

    let call = store.add_activity(activity_draft("Call", false));
    let demo = store.add_activity(activity_draft("Demo", false));
    store.complete_activity(call);
    store.update_activity(
        demo,
        ActivityPatch::default().with_description(Some("Sandbox".into())),
    );
}

fn round_trip(codec: StateCodec) {
    let storage = InMemoryStorage::new();
    let before = {
        let store = open(&storage, config(codec));
        exercise(&store);
        store.snapshot()
    };

    let restarted = open(&storage, config(codec));
    assert_eq!(restarted.snapshot(), before);
    assert!(restarted.stats_drift().is_none());
}

#[test]
fn json_round_trip_restores_collections_and_stats() {
    round_trip(StateCodec::Json);
}

#[test]
fn bitcode_round_trip_restores_collections_and_stats() {
    round_trip(StateCodec::Bitcode);
}

#[test]
fn every_mutation_overwrites_the_entry() {
    let storage = InMemoryStorage::new();
    let store = open(&storage, StoreConfig::default());
    assert!(storage.get_item(DEFAULT_STORAGE_KEY).unwrap().is_none());

    store.add_deal(deal_draft("X", 1000));
    let first = storage.get_item(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(json["state"]["stats"]["dealValue"], 1000);
    assert_eq!(json["state"]["deals"][0]["title"], "X");
    assert_eq!(json["version"], 0);

    store.add_deal(deal_draft("Y", 1));
    let second = storage.get_item(DEFAULT_STORAGE_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&second).unwrap();
    assert_eq!(json["state"]["stats"]["dealValue"], 1001);
    assert_eq!(storage.len(), 1);
}

#[test]
fn persist_disabled_writes_nothing() {
    let storage = InMemoryStorage::new();
    let store = open(&storage, StoreConfig::default().with_persist(false));
    store.add_contact(contact_draft("Ada"));
    assert!(storage.is_empty());
}

#[test]
fn custom_storage_key_is_used() {
    let storage = InMemoryStorage::new();
    let store = open(&storage, StoreConfig::default().with_storage_key("crm-alt"));
    store.add_contact(contact_draft("Ada"));
    assert!(storage.get_item("crm-alt").unwrap().is_some());
    assert!(storage.get_item(DEFAULT_STORAGE_KEY).unwrap().is_none());
}

#[test]
fn corrupt_entry_starts_empty_and_is_overwritten() {
    let storage = InMemoryStorage::new();
    storage.set_item(DEFAULT_STORAGE_KEY, "{ not json").unwrap();

    let store = open(&storage, StoreConfig::default());
    assert!(store.contacts().is_empty());

    store.add_contact(contact_draft("Ada"));
    let restarted = open(&storage, StoreConfig::default());
    assert_eq!(restarted.contacts().len(), 1);
}

#[test]
fn version_mismatch_discards_snapshot() {
    let storage = InMemoryStorage::new();
    open(&storage, StoreConfig::default()).add_contact(contact_draft("Ada"));

    let newer = open(&storage, StoreConfig::default().with_persist_version(1));
    assert!(newer.contacts().is_empty());
}

#[test]
fn codec_mismatch_discards_snapshot() {
    let storage = InMemoryStorage::new();
    open(&storage, config(StateCodec::Json)).add_contact(contact_draft("Ada"));

    let other = open(&storage, config(StateCodec::Bitcode));
    assert!(other.contacts().is_empty());
}

#[test]
fn new_ids_follow_rehydrated_ids() {
    let storage = InMemoryStorage::new();
    let first = open(&storage, StoreConfig::default());
    let a = first.add_contact(contact_draft("Ada"));
    let b = first.add_deal(deal_draft("Deal", 1));

    let restarted = open(&storage, StoreConfig::default());
    let c = restarted.add_activity(activity_draft("Call", false));
    assert!(c > a.max(b));
}

#[test]
fn legacy_drift_survives_restart_verbatim() {
    let storage = InMemoryStorage::new();
    let legacy = StoreConfig::default().with_accounting(DeleteAccounting::Legacy);
    let store = open(&storage, legacy.clone());
    store.add_deal(deal_draft("Deal", 10));
    store.delete_deal(999);
    let before = store.stats();

    let restarted = open(&storage, legacy);
    assert_eq!(restarted.stats(), before);
    assert_eq!(restarted.stats().total_deals, 0);
}

#[test]
fn file_storage_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let before = {
        let store = CrmStore::builder(StoreConfig::default())
            .with_storage(FileStorage::open(dir.path()).unwrap())
            .build();
        exercise(&store);
        store.snapshot()
    };

    let restarted = CrmStore::builder(StoreConfig::default())
        .with_storage(FileStorage::open(dir.path()).unwrap())
        .build();
    assert_eq!(restarted.snapshot(), before);
}

#[test]
fn reads_dashboard_written_layout() {
    // Shape written by the browser dashboard, with optional fields omitted.
    let raw = r#"{
        "state": {
            "contacts": [{"id": 1714000000000, "name": "Ada", "email": "ada@example.com",
                          "phone": "", "company": "AE", "status": "lead"}],
            "deals": [{"id": 1714000000001, "title": "X", "value": 1000, "contactId": 1714000000000,
                       "stage": "closed-won", "createdAt": "2025-03-15T08:00:00Z"}],
            "activities": [],
            "stats": {"totalDeals": 1, "totalContacts": 1, "dealValue": 1000, "activitiesCompleted": 0}
        },
        "version": 0
    }"#;
    let storage = InMemoryStorage::new();
    storage.set_item(DEFAULT_STORAGE_KEY, raw).unwrap();

    let store = open(&storage, StoreConfig::default());
    assert_eq!(store.contacts()[0].name, "Ada");
    assert_eq!(store.stats().deal_value, 1000);

    let next = store.add_contact(contact_draft("Brian"));
    assert!(next > 1714000000001);
}
