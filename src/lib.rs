// Lets the derive macros refer to `::crm_store::Record` from inside this crate.
extern crate self as crm_store;

mod codec;
mod config;
mod error;
mod id;
mod models;
mod persist;
pub mod query;
mod record;
mod seed;
mod state;
mod stats;
mod storage;
mod store;

pub use codec::StateCodec;
pub use config::{DeleteAccounting, StoreConfig, DEFAULT_FETCH_DELAY_MS, DEFAULT_STORAGE_KEY};
pub use error::{CodecError, ConfigError, FetchError, PersistError, StorageError};
pub use id::{ClockIds, IdGenerator, SequentialIds};
pub use models::{
    Activity, ActivityDraft, ActivityKind, ActivityPatch, Contact, ContactDraft, ContactPatch,
    ContactStatus, Deal, DealDraft, DealPatch, DealStage,
};
pub use persist::Persister;
pub use query::{ActivityFilter, PipelineReport, StageSummary};
pub use record::Record;
#[doc(hidden)]
pub use record::deserialize_some;
pub use seed::{InitialDataSource, SeedData, StaticSeed};
pub use state::CrmState;
pub use stats::Stats;
pub use storage::{FileStorage, InMemoryStorage, LocalStorage};
pub use store::{Change, CrmStore, StatsDrift, StoreBuilder, StoreEvent};

// Derives share their names with the traits they implement, as serde's do.
pub use crm_store_macros::{Patch, Record};

// Sources implement `InitialDataSource` with this attribute.
pub use async_trait::async_trait;
