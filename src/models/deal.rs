use chrono::{DateTime, Utc};
use crm_store_macros::{Patch, Record};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a deal in the sales pipeline.
///
/// Variants are declared in pipeline order, so `Ord` follows the pipeline:
/// `Initial < Qualified < Proposal < Negotiation < ClosedWon < ClosedLost`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DealStage {
    Initial,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl DealStage {
    pub const ALL: [DealStage; 6] = [
        DealStage::Initial,
        DealStage::Qualified,
        DealStage::Proposal,
        DealStage::Negotiation,
        DealStage::ClosedWon,
        DealStage::ClosedLost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Initial => "initial",
            DealStage::Qualified => "qualified",
            DealStage::Proposal => "proposal",
            DealStage::Negotiation => "negotiation",
            DealStage::ClosedWon => "closed-won",
            DealStage::ClosedLost => "closed-lost",
        }
    }

    /// Human-readable column title.
    pub fn label(&self) -> &'static str {
        match self {
            DealStage::Initial => "Initial Contact",
            DealStage::Qualified => "Qualified",
            DealStage::Proposal => "Proposal",
            DealStage::Negotiation => "Negotiation",
            DealStage::ClosedWon => "Closed Won",
            DealStage::ClosedLost => "Closed Lost",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, DealStage::ClosedWon | DealStage::ClosedLost)
    }
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Record, Patch)]
#[record(collection = "deals")]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    #[record(id)]
    pub id: u64,
    pub title: String,
    /// Monetary value in whole currency units. Not validated by the store.
    pub value: i64,
    /// Owning contact. Dangling references are tolerated.
    pub contact_id: u64,
    pub stage: DealStage,
    pub created_at: DateTime<Utc>,
    pub closing_date: Option<DateTime<Utc>>,
}
