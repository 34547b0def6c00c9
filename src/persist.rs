//! Persist-on-write snapshots of the whole store state.
//!
//! The stored value is an envelope `{"state": ..., "version": N}`. A version
//! mismatch on load means the snapshot was written by an incompatible layout
//! and is discarded rather than migrated.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codec::StateCodec;
use crate::error::PersistError;
use crate::state::CrmState;
use crate::storage::LocalStorage;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a CrmState,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    state: CrmState,
    version: u32,
}

/// Writes and reads the state snapshot under one storage key.
#[derive(Clone)]
pub struct Persister {
    storage: Arc<dyn LocalStorage>,
    key: String,
    codec: StateCodec,
    version: u32,
}

impl Persister {
    pub fn new(storage: Arc<dyn LocalStorage>, key: impl Into<String>) -> Self {
        Persister {
            storage,
            key: key.into(),
            codec: StateCodec::default(),
            version: 0,
        }
    }

    pub fn with_codec(mut self, codec: StateCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overwrite the stored snapshot with `state`.
    pub fn save(&self, state: &CrmState) -> Result<(), PersistError> {
        let encoded = self.codec.encode(&EnvelopeRef {
            state,
            version: self.version,
        })?;
        self.storage.set_item(&self.key, &encoded)?;
        Ok(())
    }

    /// Read the stored snapshot, if any.
    pub fn load(&self) -> Result<Option<CrmState>, PersistError> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(None);
        };
        let envelope: Envelope = self.codec.decode(&raw)?;
        if envelope.version != self.version {
            return Err(PersistError::VersionMismatch {
                expected: self.version,
                found: envelope.version,
            });
        }
        Ok(Some(envelope.state))
    }

    /// Drop the stored snapshot. Returns true if one existed.
    pub fn clear(&self) -> Result<bool, PersistError> {
        Ok(self.storage.remove_item(&self.key)?)
    }
}
