//! Stats - the derived aggregate cached next to the collections.

use serde::{Deserialize, Serialize};

use crate::models::{Activity, Contact, Deal};

/// Four-field aggregate over the live collections.
///
/// The store maintains it incrementally. [`Stats::recompute`] is the
/// authoritative value it must agree with. Counts are signed so that
/// legacy delete accounting can report the drift it causes instead of
/// wrapping. `deal_value` is a wrapping sum, both here and in the store's
/// incremental updates, so extreme values never panic and the two agree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_deals: i64,
    pub total_contacts: i64,
    pub deal_value: i64,
    pub activities_completed: i64,
}

impl Stats {
    /// Full aggregation from scratch.
    pub fn recompute(contacts: &[Contact], deals: &[Deal], activities: &[Activity]) -> Self {
        Stats {
            total_contacts: contacts.len() as i64,
            total_deals: deals.len() as i64,
            deal_value: deals.iter().map(|deal| deal.value).fold(0, i64::wrapping_add),
            activities_completed: activities.iter().filter(|a| a.completed).count() as i64,
        }
    }
}
