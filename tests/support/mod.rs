#![allow(dead_code)]

use chrono::{DateTime, Utc};
use crm_store::{
    ActivityDraft, ActivityKind, ContactDraft, ContactStatus, CrmStore, DealDraft, DealStage,
    DeleteAccounting, StoreConfig,
};

pub fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().expect("valid RFC 3339 timestamp")
}

pub fn contact_draft(name: &str) -> ContactDraft {
    ContactDraft {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        phone: "(555) 000-0000".to_string(),
        company: format!("{} Ltd", name),
        status: ContactStatus::Lead,
        last_activity: None,
        avatar: None,
    }
}

pub fn deal_draft(title: &str, value: i64) -> DealDraft {
    DealDraft {
        title: title.to_string(),
        value,
        contact_id: 1,
        stage: DealStage::Initial,
        created_at: ts("2025-05-01T11:00:00Z"),
        closing_date: None,
    }
}

pub fn activity_draft(title: &str, completed: bool) -> ActivityDraft {
    ActivityDraft {
        kind: ActivityKind::Task,
        title: title.to_string(),
        description: None,
        contact_id: None,
        deal_id: None,
        due_date: ts("2025-05-15T09:00:00Z"),
        completed,
    }
}

/// Memory-only store with no bulk-load delay.
pub fn memory_store(accounting: DeleteAccounting) -> CrmStore {
    CrmStore::builder(
        StoreConfig::default()
            .with_accounting(accounting)
            .with_fetch_delay(std::time::Duration::ZERO),
    )
    .build()
}

pub fn assert_stats_consistent(store: &CrmStore) {
    if let Some(drift) = store.stats_drift() {
        panic!(
            "stats drifted: cached {:?}, recomputed {:?}",
            drift.cached, drift.recomputed
        );
    }
}
