//! Initial data for the bulk-load.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::models::{Activity, Contact, Deal};
use crate::state::CrmState;

const STATIC_SEED: &str = include_str!("../data/seed.json");

/// Collections delivered by an [`InitialDataSource`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    pub contacts: Vec<Contact>,
    pub deals: Vec<Deal>,
    pub activities: Vec<Activity>,
}

impl SeedData {
    /// A full state with stats aggregated from scratch.
    pub fn into_state(self) -> CrmState {
        CrmState::from_collections(self.contacts, self.deals, self.activities)
    }
}

/// Where `fetch_initial_data` gets its collections from.
#[async_trait]
pub trait InitialDataSource: Send + Sync {
    async fn fetch(&self) -> Result<SeedData, FetchError>;
}

/// The fixed demo data set: 5 contacts, 5 deals, 5 activities.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticSeed;

impl StaticSeed {
    pub fn data() -> Result<SeedData, FetchError> {
        serde_json::from_str(STATIC_SEED)
            .map_err(|e| FetchError::new(format!("bundled seed data is invalid: {}", e)))
    }
}

#[async_trait]
impl InitialDataSource for StaticSeed {
    async fn fetch(&self) -> Result<SeedData, FetchError> {
        Self::data()
    }
}
