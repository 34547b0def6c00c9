use std::sync::atomic::{AtomicU64, AtomicUsize};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use super::events::Notifier;
use super::CrmStore;
use crate::config::StoreConfig;
use crate::id::{IdGenerator, SequentialIds};
use crate::persist::Persister;
use crate::seed::{InitialDataSource, StaticSeed};
use crate::state::CrmState;
use crate::storage::LocalStorage;

/// Assembles a [`CrmStore`] from its collaborators.
///
/// Defaults: no durable storage (memory only), sequential ids and the bundled
/// static seed as the bulk-load source.
pub struct StoreBuilder {
    config: StoreConfig,
    storage: Option<Arc<dyn LocalStorage>>,
    ids: Option<Arc<dyn IdGenerator>>,
    source: Option<Arc<dyn InitialDataSource>>,
}

impl StoreBuilder {
    pub fn new(config: StoreConfig) -> Self {
        StoreBuilder {
            config,
            storage: None,
            ids: None,
            source: None,
        }
    }

    pub fn with_storage<S: LocalStorage + 'static>(mut self, storage: S) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    pub fn with_ids<G: IdGenerator + 'static>(mut self, ids: G) -> Self {
        self.ids = Some(Arc::new(ids));
        self
    }

    pub fn with_source<D: InitialDataSource + 'static>(mut self, source: D) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Build the store, rehydrating from storage when a snapshot exists.
    ///
    /// An unreadable or version-mismatched snapshot is logged and ignored; the
    /// store then starts empty and the next mutation overwrites it.
    pub fn build(self) -> CrmStore {
        let persister = match (&self.storage, self.config.persist) {
            (Some(storage), true) => Some(
                Persister::new(storage.clone(), self.config.storage_key.clone())
                    .with_codec(self.config.codec)
                    .with_version(self.config.persist_version),
            ),
            _ => None,
        };

        let state = persister
            .as_ref()
            .map(rehydrate)
            .unwrap_or_default();

        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(SequentialIds::new()));
        if let Some(max) = state.max_id() {
            ids.observe(max);
        }

        CrmStore {
            state: Arc::new(RwLock::new(state)),
            loads_in_flight: Arc::new(AtomicUsize::new(0)),
            commits: Arc::new(AtomicU64::new(0)),
            ids,
            persister,
            source: self.source.unwrap_or_else(|| Arc::new(StaticSeed)),
            config: Arc::new(self.config),
            notifier: Notifier::default(),
        }
    }
}

fn rehydrate(persister: &Persister) -> CrmState {
    match persister.load() {
        Ok(Some(state)) => {
            info!(
                key = persister.key(),
                contacts = state.contacts.len(),
                deals = state.deals.len(),
                activities = state.activities.len(),
                "rehydrated store"
            );
            state
        }
        Ok(None) => CrmState::default(),
        Err(err) => {
            warn!(key = persister.key(), error = %err, "discarding persisted state");
            CrmState::default()
        }
    }
}
