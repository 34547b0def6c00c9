use serde::{Deserialize, Serialize};

use crate::models::{Activity, Contact, Deal};
use crate::record::max_id;
use crate::stats::Stats;

/// The full store state: three collections plus the cached stats.
///
/// This is also the persisted shape. Collections keep insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmState {
    pub contacts: Vec<Contact>,
    pub deals: Vec<Deal>,
    pub activities: Vec<Activity>,
    pub stats: Stats,
}

impl CrmState {
    /// Build a state from collections, computing stats from scratch.
    pub fn from_collections(
        contacts: Vec<Contact>,
        deals: Vec<Deal>,
        activities: Vec<Activity>,
    ) -> Self {
        let stats = Stats::recompute(&contacts, &deals, &activities);
        CrmState {
            contacts,
            deals,
            activities,
            stats,
        }
    }

    pub fn recomputed_stats(&self) -> Stats {
        Stats::recompute(&self.contacts, &self.deals, &self.activities)
    }

    /// Largest id across all three collections.
    pub fn max_id(&self) -> Option<u64> {
        [
            max_id(&self.contacts),
            max_id(&self.deals),
            max_id(&self.activities),
        ]
        .into_iter()
        .flatten()
        .max()
    }
}
