mod fields;
mod patch;
mod record;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Record)]
// ============================================================================

/// Derive macro that implements `crm_store::Record` and generates a draft type.
///
/// The draft (`<Name>Draft`) carries every field except the id. It is what the
/// store's `add_*` operations accept: the store assigns the id.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Debug, Serialize, Deserialize, Record)]
/// #[record(collection = "contacts")]
/// #[serde(rename_all = "camelCase")]
/// pub struct Contact {
///     #[record(id)]
///     pub id: u64,
///     pub name: String,
/// }
///
/// let draft = ContactDraft { name: "Ada".into() };
/// let contact: Contact = draft.into_record(7);
/// ```
///
/// - `#[record(collection = "...")]` names the collection. Defaults to the
///   snake_case struct name plus `s`.
/// - `#[record(id)]` marks the id field. Defaults to a field named `id`.
/// - `#[serde(...)]` and doc attributes are forwarded to the draft.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}

// ============================================================================
// #[derive(Patch)]
// ============================================================================

/// Derive macro that generates a partial-update type `<Name>Patch`.
///
/// Every non-id field becomes `Option<T>`. `None` leaves the target field
/// untouched, `Some(v)` overwrites it. For fields that are already optional
/// this means `Some(None)` clears them; in JSON an explicit `null` clears and
/// an absent key leaves the field alone.
///
/// ```ignore
/// let patch = ContactPatch::default().with_email("ada@example.com".into());
/// patch.apply(&mut contact);
/// ```
#[proc_macro_derive(Patch, attributes(record, patch))]
pub fn derive_patch(input: TokenStream) -> TokenStream {
    patch::derive_patch(input)
}
