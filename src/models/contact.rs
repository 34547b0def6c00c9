use chrono::{DateTime, Utc};
use crm_store_macros::{Patch, Record};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    Lead,
    Prospect,
    Customer,
}

impl ContactStatus {
    pub const ALL: [ContactStatus; 3] = [
        ContactStatus::Lead,
        ContactStatus::Prospect,
        ContactStatus::Customer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Lead => "lead",
            ContactStatus::Prospect => "prospect",
            ContactStatus::Customer => "customer",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person or organisation the team is working with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Record, Patch)]
#[record(collection = "contacts")]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[record(id)]
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub status: ContactStatus,
    pub last_activity: Option<DateTime<Utc>>,
    /// Avatar image reference (usually a URL).
    pub avatar: Option<String>,
}
