use chrono::{DateTime, Utc};
use crm_store_macros::{Patch, Record};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Call,
    Meeting,
    Email,
    Task,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 4] = [
        ActivityKind::Call,
        ActivityKind::Meeting,
        ActivityKind::Email,
        ActivityKind::Task,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Call => "call",
            ActivityKind::Meeting => "meeting",
            ActivityKind::Email => "email",
            ActivityKind::Task => "task",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schedulable interaction, optionally linked to a contact and/or a deal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Record, Patch)]
#[record(collection = "activities")]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[record(id)]
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub description: Option<String>,
    pub contact_id: Option<u64>,
    pub deal_id: Option<u64>,
    pub due_date: DateTime<Utc>,
    pub completed: bool,
}
