//! Models - the three collections a CRM store owns.
//!
//! Each model derives [`Record`](crate::Record), which generates its draft
//! type (`ContactDraft`, `DealDraft`, `ActivityDraft`), and `Patch`, which
//! generates its partial-update type (`ContactPatch`, ...).
//!
//! The serialized layout matches the dashboard's persisted state: camelCase
//! field names, lowercase enum values, kebab-case deal stages and RFC 3339
//! timestamps.

mod activity;
mod contact;
mod deal;

pub use activity::{Activity, ActivityDraft, ActivityKind, ActivityPatch};
pub use contact::{Contact, ContactDraft, ContactPatch, ContactStatus};
pub use deal::{Deal, DealDraft, DealPatch, DealStage};
