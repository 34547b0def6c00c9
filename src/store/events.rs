//! Change notifications fired after each committed mutation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stats::Stats;

/// What a mutation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreEvent {
    ContactAdded,
    ContactUpdated,
    ContactDeleted,
    DealAdded,
    DealUpdated,
    DealDeleted,
    ActivityAdded,
    ActivityUpdated,
    ActivityCompleted,
    ActivityDeleted,
    /// The bulk-load replaced every collection.
    Loaded,
    StatsRecomputed,
}

impl StoreEvent {
    pub const ALL: [StoreEvent; 12] = [
        StoreEvent::ContactAdded,
        StoreEvent::ContactUpdated,
        StoreEvent::ContactDeleted,
        StoreEvent::DealAdded,
        StoreEvent::DealUpdated,
        StoreEvent::DealDeleted,
        StoreEvent::ActivityAdded,
        StoreEvent::ActivityUpdated,
        StoreEvent::ActivityCompleted,
        StoreEvent::ActivityDeleted,
        StoreEvent::Loaded,
        StoreEvent::StatsRecomputed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::ContactAdded => "contact.added",
            StoreEvent::ContactUpdated => "contact.updated",
            StoreEvent::ContactDeleted => "contact.deleted",
            StoreEvent::DealAdded => "deal.added",
            StoreEvent::DealUpdated => "deal.updated",
            StoreEvent::DealDeleted => "deal.deleted",
            StoreEvent::ActivityAdded => "activity.added",
            StoreEvent::ActivityUpdated => "activity.updated",
            StoreEvent::ActivityCompleted => "activity.completed",
            StoreEvent::ActivityDeleted => "activity.deleted",
            StoreEvent::Loaded => "store.loaded",
            StoreEvent::StatsRecomputed => "stats.recomputed",
        }
    }
}

impl fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload delivered to listeners: the affected id (if any) and the stats
/// as they stand after the mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Position of the mutation in commit order, starting at 1 per store.
    pub seq: u64,
    pub id: Option<u64>,
    pub stats: Stats,
}

#[cfg(feature = "emitter")]
mod emitter {
    use std::sync::Arc;

    use event_emitter_rs::EventEmitter;
    use parking_lot::Mutex;

    use super::{Change, StoreEvent};

    /// Fans changes out to subscribers through an `EventEmitter`.
    ///
    /// Listeners run on emitter threads, but `notify` joins them, so every
    /// listener has returned before the mutating call does.
    #[derive(Clone)]
    pub struct Notifier {
        emitter: Arc<Mutex<EventEmitter>>,
    }

    impl Default for Notifier {
        fn default() -> Self {
            Notifier {
                emitter: Arc::new(Mutex::new(EventEmitter::new())),
            }
        }
    }

    impl Notifier {
        pub fn subscribe<F>(&self, event: StoreEvent, listener: F) -> String
        where
            F: Fn(Change) + Send + Sync + 'static,
        {
            self.emitter.lock().on(event.name(), move |raw: String| {
                match serde_json::from_str::<Change>(&raw) {
                    Ok(change) => listener(change),
                    Err(err) => tracing::warn!(error = %err, "dropping undecodable change payload"),
                }
            })
        }

        pub fn unsubscribe(&self, listener_id: &str) -> bool {
            self.emitter.lock().remove_listener(listener_id).is_some()
        }

        pub fn notify(&self, event: StoreEvent, change: &Change) {
            let payload = match serde_json::to_string(change) {
                Ok(payload) => payload,
                Err(err) => {
                    tracing::warn!(event = event.name(), error = %err, "failed to encode change");
                    return;
                }
            };
            let handles = self.emitter.lock().emit(event.name(), payload);
            for handle in handles {
                if handle.join().is_err() {
                    tracing::warn!(event = event.name(), "change listener panicked");
                }
            }
        }
    }
}

#[cfg(not(feature = "emitter"))]
mod emitter {
    use super::{Change, StoreEvent};

    #[derive(Clone, Default)]
    pub struct Notifier;

    impl Notifier {
        pub fn notify(&self, _event: StoreEvent, _change: &Change) {}
    }
}

pub(crate) use emitter::Notifier;
