//! Store trait abstractions
//!
//! These traits are the seams between the lifecycle services and persistence.
//! The PostgreSQL repositories and the in-memory store both implement them, so
//! every service can be exercised without a database.

use async_trait::async_trait;
use tender_core::models::{
    Bid, Decision, HistoryRecord, Organization, Review, ServiceType, Tender, User, Versioned,
};
use tender_core::{AppError, Page};
use uuid::Uuid;

/// Computes the new content of an entity from its current (locked) state.
///
/// Returning an error aborts the update: no history row is written and the
/// version does not move.
pub type Mutator<E> =
    Box<dyn FnOnce(&E) -> Result<<E as Versioned>::Content, AppError> + Send + 'static>;

/// Atomic read / snapshot / write / bump for one versioned entity type.
#[async_trait]
pub trait VersionedStore<E: Versioned>: Send + Sync {
    /// Current state of the entity, if it exists.
    async fn find(&self, id: Uuid) -> Result<Option<E>, AppError>;

    /// Read the current row, append its pre-mutation snapshot to history and
    /// write the mutator's content with `version = version + 1`, all or nothing.
    ///
    /// Concurrent calls on the same id serialize. Fails with `NotFound` when the
    /// entity does not exist.
    async fn apply_versioned_update(&self, id: Uuid, mutate: Mutator<E>) -> Result<E, AppError>;

    /// History row whose snapshotted version equals `version`.
    async fn find_history(&self, id: Uuid, version: i32)
        -> Result<Option<E::History>, AppError>;

    /// All history rows of the entity ordered by version.
    async fn list_history(&self, id: Uuid) -> Result<Vec<E::History>, AppError>;
}

/// Restore the content recorded in history row `version` as a new version.
///
/// Rollback only moves forward: the version counter is bumped like any other
/// update and the state being replaced is itself snapshotted.
pub async fn rollback<E, S>(store: &S, id: Uuid, version: i32) -> Result<E, AppError>
where
    E: Versioned,
    S: VersionedStore<E> + ?Sized,
{
    let record = store
        .find_history(id, version)
        .await?
        .ok_or(AppError::VersionNotFound {
            entity: E::KIND,
            id,
            version,
        })?;
    let content = record.content();

    tracing::debug!(entity = E::KIND, %id, version, "Rolling back to history version");

    store
        .apply_versioned_update(
            id,
            Box::new(move |_current: &E| -> Result<E::Content, AppError> { Ok(content) }),
        )
        .await
}

/// Identity & membership lookups. Users and organizations are provisioned
/// elsewhere; this engine only reads them.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError>;

    /// Whether the user is a responsible member of the organization.
    async fn is_responsible(&self, user_id: Uuid, organization_id: Uuid)
        -> Result<bool, AppError>;

    /// Whether the user is responsible for at least one organization.
    async fn has_any_membership(&self, user_id: Uuid) -> Result<bool, AppError>;

    /// Whether some organization lists both users as responsible members.
    async fn shares_organization(&self, user_id: Uuid, other_id: Uuid)
        -> Result<bool, AppError>;

    async fn count_responsible(&self, organization_id: Uuid) -> Result<i64, AppError>;
}

#[async_trait]
pub trait TenderStore: VersionedStore<Tender> {
    async fn insert_tender(&self, tender: &Tender) -> Result<Tender, AppError>;

    /// Published tenders ordered by name. An empty filter matches every service type.
    async fn list_published(
        &self,
        service_types: &[ServiceType],
        page: Page,
    ) -> Result<Vec<Tender>, AppError>;

    /// Tenders of every organization the user is responsible for, ordered by name.
    async fn list_for_member(&self, user_id: Uuid, page: Page) -> Result<Vec<Tender>, AppError>;
}

#[async_trait]
pub trait BidStore: VersionedStore<Bid> {
    async fn insert_bid(&self, bid: &Bid) -> Result<Bid, AppError>;

    async fn list_by_author(&self, author_id: Uuid, page: Page) -> Result<Vec<Bid>, AppError>;

    async fn list_published_for_tender(
        &self,
        tender_id: Uuid,
        page: Page,
    ) -> Result<Vec<Bid>, AppError>;
}

/// Counts observed right after a decision was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTally {
    pub decision: Decision,
    /// `Approved` decisions on the bid, this one included.
    pub approvals: i64,
    /// Responsible users of the tender's organization.
    pub responsible: i64,
}

#[async_trait]
pub trait DecisionStore: Send + Sync {
    /// Record a decision on a bid of `tender_id` and count approvals.
    ///
    /// Recording is serialized per tender by the store itself: the tender and
    /// bid must still be `Published` when the lock is held (`Conflict`
    /// otherwise), and the returned counts include every decision committed
    /// before this one.
    async fn record_decision(
        &self,
        decision: &Decision,
        tender_id: Uuid,
    ) -> Result<DecisionTally, AppError>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn insert_review(&self, review: &Review) -> Result<Review, AppError>;

    /// Reviews left on bids of the given author, oldest first.
    async fn list_by_bid_author(
        &self,
        bid_author_id: Uuid,
        page: Page,
    ) -> Result<Vec<Review>, AppError>;
}
