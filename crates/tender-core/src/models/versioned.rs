//! Versioned entity contract
//!
//! Tenders and bids carry a version counter that starts at 1 and grows by one on
//! every mutation. Before each mutation the entity's content and version are
//! copied into an append-only history row, so history version `N` holds the state
//! the entity had while its version read `N`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An immutable history row written just before a mutation.
pub trait HistoryRecord: Clone + Send + Sync + 'static {
    type Content: Clone + Send + Sync + 'static;

    /// Version the entity had when this snapshot was taken.
    fn version(&self) -> i32;

    /// Snapshotted content fields.
    fn content(&self) -> Self::Content;
}

/// An entity mutated only through the versioned-update primitive.
pub trait Versioned: Clone + Send + Sync + 'static {
    /// The mutable fields of the entity. Identity, ownership and authorship are
    /// not part of it and can never change.
    type Content: Clone + Send + Sync + 'static;
    type History: HistoryRecord<Content = Self::Content>;

    /// Lowercase entity name used in messages and log fields.
    const KIND: &'static str;

    fn id(&self) -> Uuid;

    fn version(&self) -> i32;

    fn content(&self) -> Self::Content;

    /// History row capturing the current content and version.
    fn snapshot(&self, history_id: Uuid, taken_at: DateTime<Utc>) -> Self::History;

    /// Replace the content fields and set the version.
    fn with_content(self, content: Self::Content, version: i32) -> Self;
}
