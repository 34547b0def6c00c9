//! CrmStore - the relational store over contacts, deals and activities.
//!
//! ## Example
//!
//! ```ignore
//! use crm_store::{CrmStore, DealDraft, DealPatch, DealStage};
//!
//! let store = CrmStore::new();
//! let id = store.add_deal(DealDraft {
//!     title: "X".into(),
//!     value: 1000,
//!     contact_id: 1,
//!     stage: DealStage::Initial,
//!     created_at: chrono::Utc::now(),
//!     closing_date: None,
//! });
//! store.update_deal(id, DealPatch::default().with_value(1500));
//! assert_eq!(store.stats().deal_value, 1500);
//! ```

mod builder;
mod events;

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::{DeleteAccounting, StoreConfig};
use crate::error::FetchError;
use crate::id::IdGenerator;
use crate::models::{
    Activity, ActivityDraft, ActivityPatch, Contact, ContactDraft, ContactPatch, Deal, DealDraft,
    DealPatch,
};
use crate::persist::Persister;
use crate::query::{self, PipelineReport};
use crate::record::{position, Record};
use crate::seed::{InitialDataSource, SeedData};
use crate::state::CrmState;
use crate::stats::Stats;

pub use builder::StoreBuilder;
pub use events::{Change, StoreEvent};
use events::Notifier;

/// Cached stats that disagree with a full recompute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatsDrift {
    pub cached: Stats,
    pub recomputed: Stats,
}

/// Handle to a CRM store. Cloning shares the same state.
///
/// Every mutation takes the write lock, applies the collection change and
/// its stats adjustment together, persists the full state, and only then
/// notifies subscribers. Operations never fail: unknown ids are a no-op (or
/// documented drift under [`DeleteAccounting::Legacy`]) and persistence
/// failures are logged.
#[derive(Clone)]
pub struct CrmStore {
    state: Arc<RwLock<CrmState>>,
    loads_in_flight: Arc<AtomicUsize>,
    commits: Arc<AtomicU64>,
    ids: Arc<dyn IdGenerator>,
    persister: Option<Persister>,
    source: Arc<dyn InitialDataSource>,
    config: Arc<StoreConfig>,
    notifier: Notifier,
}

impl Default for CrmStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CrmStore {
    /// An empty, memory-only store with default configuration.
    pub fn new() -> Self {
        StoreBuilder::new(StoreConfig::default()).build()
    }

    pub fn builder(config: StoreConfig) -> StoreBuilder {
        StoreBuilder::new(config)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn legacy(&self) -> bool {
        self.config.accounting == DeleteAccounting::Legacy
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Run `f` against the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&CrmState) -> R) -> R {
        f(&self.state.read())
    }

    pub fn snapshot(&self) -> CrmState {
        self.state.read().clone()
    }

    pub fn contacts(&self) -> Vec<Contact> {
        self.state.read().contacts.clone()
    }

    pub fn deals(&self) -> Vec<Deal> {
        self.state.read().deals.clone()
    }

    pub fn activities(&self) -> Vec<Activity> {
        self.state.read().activities.clone()
    }

    pub fn stats(&self) -> Stats {
        self.state.read().stats
    }

    pub fn contact(&self, id: u64) -> Option<Contact> {
        find(&self.state.read().contacts, id)
    }

    pub fn deal(&self, id: u64) -> Option<Deal> {
        find(&self.state.read().deals, id)
    }

    pub fn activity(&self, id: u64) -> Option<Activity> {
        find(&self.state.read().activities, id)
    }

    /// True while a bulk-load is waiting on its source.
    pub fn is_loading(&self) -> bool {
        self.loads_in_flight.load(Ordering::Acquire) > 0
    }

    pub fn search_contacts(&self, text: &str) -> Vec<Contact> {
        self.with_state(|state| {
            query::search_contacts(&state.contacts, text)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn upcoming_activities(&self, limit: usize) -> Vec<Activity> {
        self.with_state(|state| {
            query::upcoming_activities(&state.activities, limit)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn report(&self) -> PipelineReport {
        self.with_state(PipelineReport::build)
    }

    /// Compare cached stats with a recompute. `None` when they agree.
    pub fn stats_drift(&self) -> Option<StatsDrift> {
        let state = self.state.read();
        let recomputed = state.recomputed_stats();
        (recomputed != state.stats).then_some(StatsDrift {
            cached: state.stats,
            recomputed,
        })
    }

    // ------------------------------------------------------------------
    // Contacts
    // ------------------------------------------------------------------

    pub fn add_contact(&self, draft: ContactDraft) -> u64 {
        let id = self.ids.next_id();
        let commit = self.commit("addContact", |state| {
            state.contacts.push(draft.into_record(id));
            state.stats.total_contacts += 1;
        });
        debug!(action = "addContact", id, "contact added");
        self.notify(StoreEvent::ContactAdded, Some(id), commit);
        id
    }

    /// Merge `patch` onto the contact. Returns false (and changes nothing)
    /// when the id is unknown.
    pub fn update_contact(&self, id: u64, patch: ContactPatch) -> bool {
        let (found, commit) = self.commit_with("updateContact", |state| {
            match state.contacts.iter_mut().find(|c| c.id == id) {
                Some(contact) => {
                    patch.apply(contact);
                    true
                }
                None => false,
            }
        });
        debug!(action = "updateContact", id, found);
        if found {
            self.notify(StoreEvent::ContactUpdated, Some(id), commit);
        }
        found
    }

    pub fn delete_contact(&self, id: u64) -> bool {
        let legacy = self.legacy();
        let (found, commit) = self.commit_with("deleteContact", |state| {
            let found = remove(&mut state.contacts, id).is_some();
            if found || legacy {
                state.stats.total_contacts -= 1;
            }
            found
        });
        debug!(action = "deleteContact", id, found);
        if found || legacy {
            self.notify(StoreEvent::ContactDeleted, Some(id), commit);
        }
        found
    }

    // ------------------------------------------------------------------
    // Deals
    // ------------------------------------------------------------------

    pub fn add_deal(&self, draft: DealDraft) -> u64 {
        let id = self.ids.next_id();
        let value = draft.value;
        let commit = self.commit("addDeal", |state| {
            state.deals.push(draft.into_record(id));
            state.stats.total_deals += 1;
            state.stats.deal_value = state.stats.deal_value.wrapping_add(value);
        });
        debug!(action = "addDeal", id, value, "deal added");
        self.notify(StoreEvent::DealAdded, Some(id), commit);
        id
    }

    /// Merge `patch` onto the deal. A new `value` moves `deal_value` by the
    /// difference from the previous value.
    pub fn update_deal(&self, id: u64, patch: DealPatch) -> bool {
        let (found, commit) = self.commit_with("updateDeal", |state| {
            let Some(deal) = state.deals.iter_mut().find(|d| d.id == id) else {
                return false;
            };
            let delta = patch
                .value
                .map(|value| value.wrapping_sub(deal.value))
                .unwrap_or(0);
            patch.apply(deal);
            state.stats.deal_value = state.stats.deal_value.wrapping_add(delta);
            true
        });
        debug!(action = "updateDeal", id, found);
        if found {
            self.notify(StoreEvent::DealUpdated, Some(id), commit);
        }
        found
    }

    pub fn delete_deal(&self, id: u64) -> bool {
        let legacy = self.legacy();
        let (found, commit) = self.commit_with("deleteDeal", |state| {
            let removed = remove(&mut state.deals, id);
            let found = removed.is_some();
            if found || legacy {
                state.stats.total_deals -= 1;
            }
            let value = removed.map(|deal| deal.value).unwrap_or(0);
            state.stats.deal_value = state.stats.deal_value.wrapping_sub(value);
            found
        });
        debug!(action = "deleteDeal", id, found);
        if found || legacy {
            self.notify(StoreEvent::DealDeleted, Some(id), commit);
        }
        found
    }

    // ------------------------------------------------------------------
    // Activities
    // ------------------------------------------------------------------

    /// Append an activity. Under legacy accounting a draft that is already
    /// completed does not move `activities_completed`.
    pub fn add_activity(&self, draft: ActivityDraft) -> u64 {
        let id = self.ids.next_id();
        let counts = draft.completed && !self.legacy();
        let commit = self.commit("addActivity", |state| {
            state.activities.push(draft.into_record(id));
            if counts {
                state.stats.activities_completed += 1;
            }
        });
        debug!(action = "addActivity", id, "activity added");
        self.notify(StoreEvent::ActivityAdded, Some(id), commit);
        id
    }

    /// Merge `patch` onto the activity. Under legacy accounting a change of
    /// `completed` here is not reflected in the stats; use
    /// [`complete_activity`](Self::complete_activity) for that transition.
    pub fn update_activity(&self, id: u64, patch: ActivityPatch) -> bool {
        let legacy = self.legacy();
        let (found, commit) = self.commit_with("updateActivity", |state| {
            let Some(activity) = state.activities.iter_mut().find(|a| a.id == id) else {
                return false;
            };
            let was_completed = activity.completed;
            patch.apply(activity);
            if !legacy {
                match (was_completed, activity.completed) {
                    (false, true) => state.stats.activities_completed += 1,
                    (true, false) => state.stats.activities_completed -= 1,
                    _ => {}
                }
            }
            true
        });
        debug!(action = "updateActivity", id, found);
        if found {
            self.notify(StoreEvent::ActivityUpdated, Some(id), commit);
        }
        found
    }

    /// Mark the activity completed. The counter moves once per activity no
    /// matter how often this is called. Under legacy accounting an unknown
    /// id still bumps the counter, as the dashboard did.
    pub fn complete_activity(&self, id: u64) -> bool {
        let legacy = self.legacy();
        let (outcome, commit) = self.commit_with("completeActivity", |state| {
            match state.activities.iter_mut().find(|a| a.id == id) {
                Some(activity) if activity.completed => Completion::AlreadyDone,
                Some(activity) => {
                    activity.completed = true;
                    state.stats.activities_completed += 1;
                    Completion::Completed
                }
                None => {
                    if legacy {
                        state.stats.activities_completed += 1;
                    }
                    Completion::Missing
                }
            }
        });
        debug!(action = "completeActivity", id, outcome = ?outcome);
        if outcome == Completion::Completed || (outcome == Completion::Missing && legacy) {
            self.notify(StoreEvent::ActivityCompleted, Some(id), commit);
        }
        outcome != Completion::Missing
    }

    pub fn delete_activity(&self, id: u64) -> bool {
        let (found, commit) = self.commit_with("deleteActivity", |state| {
            match remove(&mut state.activities, id) {
                Some(activity) => {
                    if activity.completed {
                        state.stats.activities_completed -= 1;
                    }
                    true
                }
                None => false,
            }
        });
        debug!(action = "deleteActivity", id, found);
        if found {
            self.notify(StoreEvent::ActivityDeleted, Some(id), commit);
        }
        found
    }

    // ------------------------------------------------------------------
    // Bulk-load and resync
    // ------------------------------------------------------------------

    /// Wait the configured latency, fetch the initial data set and replace
    /// all three collections with it, recomputing stats from scratch.
    ///
    /// The lock is not held while waiting: edits made in that window are
    /// overwritten by the replace. A source failure is logged and leaves the
    /// state untouched. Returns whether the data set was applied.
    pub async fn fetch_initial_data(&self) -> bool {
        let seed = {
            let _loading = LoadingGuard::enter(&self.loads_in_flight);
            self.fetch_seed().await
        };

        let seed = match seed {
            Ok(seed) => seed,
            Err(err) => {
                error!(action = "fetchInitialData", error = %err, "failed to fetch initial data");
                return false;
            }
        };

        let loaded = seed.into_state();
        if let Some(max) = loaded.max_id() {
            self.ids.observe(max);
        }
        let commit = self.commit("fetchInitialData", |state| {
            *state = loaded;
        });
        info!(
            action = "fetchInitialData",
            contacts = commit.stats.total_contacts,
            deals = commit.stats.total_deals,
            "initial data loaded"
        );
        self.notify(StoreEvent::Loaded, None, commit);
        true
    }

    async fn fetch_seed(&self) -> Result<SeedData, FetchError> {
        let delay = self.config.fetch_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.source.fetch().await
    }

    /// Replace the cached stats with a full recompute and persist.
    pub fn recompute_stats(&self) -> Stats {
        let commit = self.commit("recomputeStats", |state| {
            state.stats = state.recomputed_stats();
        });
        debug!(action = "recomputeStats", stats = ?commit.stats);
        self.notify(StoreEvent::StatsRecomputed, None, commit);
        commit.stats
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Register a listener for one kind of change. Returns a listener id
    /// for [`unsubscribe`](Self::unsubscribe).
    ///
    /// Listeners run before the mutating call returns. They may read the
    /// store but must not subscribe or unsubscribe from inside the callback.
    ///
    /// Notification happens after the write lock is released, so with
    /// concurrent writers changes can arrive out of commit order. Order them
    /// by [`Change::seq`].
    #[cfg(feature = "emitter")]
    pub fn subscribe<F>(&self, event: StoreEvent, listener: F) -> String
    where
        F: Fn(Change) + Send + Sync + 'static,
    {
        self.notifier.subscribe(event, listener)
    }

    #[cfg(feature = "emitter")]
    pub fn unsubscribe(&self, listener_id: &str) -> bool {
        self.notifier.unsubscribe(listener_id)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn commit(&self, action: &'static str, f: impl FnOnce(&mut CrmState)) -> Commit {
        self.commit_with(action, f).1
    }

    /// Apply `f` under the write lock and persist before releasing it, so
    /// snapshots land in the same order as the mutations they capture. The
    /// sequence number is taken under the same lock.
    fn commit_with<T>(
        &self,
        action: &'static str,
        f: impl FnOnce(&mut CrmState) -> T,
    ) -> (T, Commit) {
        let mut state = self.state.write();
        let result = f(&mut state);
        if let Some(persister) = &self.persister {
            if let Err(err) = persister.save(&state) {
                warn!(action, key = persister.key(), error = %err, "failed to persist state");
            }
        }
        let seq = self.commits.fetch_add(1, Ordering::AcqRel) + 1;
        (
            result,
            Commit {
                seq,
                stats: state.stats,
            },
        )
    }

    fn notify(&self, event: StoreEvent, id: Option<u64>, commit: Commit) {
        self.notifier.notify(
            event,
            &Change {
                seq: commit.seq,
                id,
                stats: commit.stats,
            },
        );
    }
}

/// Outcome of one locked mutation.
#[derive(Clone, Copy, Debug)]
struct Commit {
    seq: u64,
    stats: Stats,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Completion {
    Completed,
    AlreadyDone,
    Missing,
}

/// Marks a bulk-load in flight for as long as it lives, including when the
/// load future is dropped before finishing.
struct LoadingGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        LoadingGuard { counter }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

fn find<R: Record>(rows: &[R], id: u64) -> Option<R> {
    position(rows, id).map(|index| rows[index].clone())
}

fn remove<R: Record>(rows: &mut Vec<R>, id: u64) -> Option<R> {
    let removed = position(rows, id).map(|index| rows.remove(index));
    if removed.is_none() {
        debug!(collection = R::COLLECTION, id, "no row to remove");
    }
    removed
}
