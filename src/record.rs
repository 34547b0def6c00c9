//! Records - the typed rows held by the store.
//!
//! Every collection the store owns is a `Vec` of one `Record` type, kept in
//! insertion order. `#[derive(Record)]` implements this trait and generates the
//! matching `<Name>Draft` type (the record minus its id).

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

/// Trait for types stored as rows of a store collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection name for this record type (e.g., "contacts", "deals").
    const COLLECTION: &'static str;

    /// Returns the numeric identity of this record.
    fn id(&self) -> u64;
}

/// Position of the record with `id` in `rows`.
pub(crate) fn position<R: Record>(rows: &[R], id: u64) -> Option<usize> {
    rows.iter().position(|row| row.id() == id)
}

/// Largest id in `rows`, if any.
pub(crate) fn max_id<R: Record>(rows: &[R]) -> Option<u64> {
    rows.iter().map(Record::id).max()
}

/// Deserialize a present value (including `null`) as `Some`. Generated
/// patches use it on optional fields together with `#[serde(default)]`, so
/// an absent key stays `None` and `null` becomes `Some(None)`.
#[doc(hidden)]
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
