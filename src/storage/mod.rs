//! Durable key/value storage for persisted state.
//!
//! Modelled on browser local storage: string keys, string values, one entry
//! overwritten wholesale on every write.

mod file;
mod in_memory;

use crate::error::StorageError;

pub use file::FileStorage;
pub use in_memory::InMemoryStorage;

/// Trait for durable string storage. One value per key (latest wins).
pub trait LocalStorage: Send + Sync {
    /// Load the value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Save (or overwrite) the value stored under `key`.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Returns true if one existed.
    fn remove_item(&self, key: &str) -> Result<bool, StorageError>;
}
