//! In-memory store
//!
//! Implements every store trait over a single mutex-guarded state. The versioned
//! update holds the lock for the whole read / snapshot / write sequence, which
//! gives the same per-entity serialization the PostgreSQL row lock provides.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tender_core::models::{
    Bid, BidHistory, BidStatus, Decision, DecisionKind, Membership, Organization,
    HistoryRecord, OrganizationType, Review, ServiceType, Tender, TenderHistory, TenderStatus,
    User, Versioned,
};
use tender_core::{AppError, Page};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::store_traits::{
    BidStore, DecisionStore, DecisionTally, IdentityStore, Mutator, ReviewStore, TenderStore,
    VersionedStore,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    organizations: HashMap<Uuid, Organization>,
    memberships: Vec<Membership>,
    tenders: HashMap<Uuid, Tender>,
    tender_history: HashMap<Uuid, Vec<TenderHistory>>,
    bids: HashMap<Uuid, Bid>,
    bid_history: HashMap<Uuid, Vec<BidHistory>>,
    decisions: Vec<Decision>,
    reviews: Vec<Review>,
    fail_writes: bool,
}

impl State {
    fn organizations_of(&self, user_id: Uuid) -> HashSet<Uuid> {
        self.memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.organization_id)
            .collect()
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(AppError::storage(
                "Write rejected by in-memory store",
                anyhow::anyhow!("injected storage failure"),
            ));
        }
        Ok(())
    }
}

/// Where a versioned entity type lives inside [`State`]
trait MemoryVersioned: Versioned {
    fn tables(state: &mut State) -> (&mut HashMap<Uuid, Self>, &mut HashMap<Uuid, Vec<Self::History>>);
}

impl MemoryVersioned for Tender {
    fn tables(
        state: &mut State,
    ) -> (&mut HashMap<Uuid, Self>, &mut HashMap<Uuid, Vec<TenderHistory>>) {
        (&mut state.tenders, &mut state.tender_history)
    }
}

impl MemoryVersioned for Bid {
    fn tables(state: &mut State) -> (&mut HashMap<Uuid, Self>, &mut HashMap<Uuid, Vec<BidHistory>>) {
        (&mut state.bids, &mut state.bid_history)
    }
}

/// Shared in-memory backend. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user
    pub async fn add_user(&self, username: &str) -> User {
        let user = User::new(username);
        self.state.lock().await.users.insert(user.id, user.clone());
        user
    }

    /// Register an organization
    pub async fn add_organization(&self, name: &str, organization_type: OrganizationType) -> Organization {
        let organization = Organization::new(name, organization_type);
        self.state
            .lock()
            .await
            .organizations
            .insert(organization.id, organization.clone());
        organization
    }

    /// Make a user responsible for an organization
    pub async fn add_membership(&self, organization_id: Uuid, user_id: Uuid) -> Membership {
        let membership = Membership::new(organization_id, user_id);
        self.state.lock().await.memberships.push(membership.clone());
        membership
    }

    /// Make every subsequent write fail with a storage error (or stop doing so)
    pub async fn set_fail_writes(&self, fail: bool) {
        self.state.lock().await.fail_writes = fail;
    }

    /// Every decision recorded so far, in insertion order
    pub async fn decisions(&self) -> Vec<Decision> {
        self.state.lock().await.decisions.clone()
    }

    /// Every review recorded so far, in insertion order
    pub async fn reviews(&self) -> Vec<Review> {
        self.state.lock().await.reviews.clone()
    }

    async fn find_entity<E: MemoryVersioned>(&self, id: Uuid) -> Option<E> {
        let mut state = self.state.lock().await;
        let (rows, _) = E::tables(&mut state);
        rows.get(&id).cloned()
    }

    async fn update_entity<E: MemoryVersioned>(
        &self,
        id: Uuid,
        mutate: Mutator<E>,
    ) -> Result<E, AppError> {
        let mut state = self.state.lock().await;
        state.check_writable()?;

        let (rows, history) = E::tables(&mut state);
        let current = rows
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", E::KIND, id)))?;

        let content = mutate(&current)?;

        history
            .entry(id)
            .or_default()
            .push(current.snapshot(Uuid::new_v4(), Utc::now()));
        let version = current.version() + 1;
        let updated = current.with_content(content, version);
        rows.insert(id, updated.clone());

        tracing::debug!(entity = E::KIND, %id, version, "Versioned update applied");

        Ok(updated)
    }

    async fn history_of<E: MemoryVersioned>(&self, id: Uuid) -> Vec<E::History> {
        let mut state = self.state.lock().await;
        let (_, history) = E::tables(&mut state);
        let mut records = history.get(&id).cloned().unwrap_or_default();
        records.sort_by_key(|r| r.version());
        records
    }

    async fn history_at<E: MemoryVersioned>(&self, id: Uuid, version: i32) -> Option<E::History> {
        self.history_of::<E>(id)
            .await
            .into_iter()
            .find(|r| r.version() == version)
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        Ok(self.state.lock().await.organizations.get(&id).cloned())
    }

    async fn is_responsible(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<bool, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .iter()
            .any(|m| m.user_id == user_id && m.organization_id == organization_id))
    }

    async fn has_any_membership(&self, user_id: Uuid) -> Result<bool, AppError> {
        let state = self.state.lock().await;
        Ok(state.memberships.iter().any(|m| m.user_id == user_id))
    }

    async fn shares_organization(&self, user_id: Uuid, other_id: Uuid) -> Result<bool, AppError> {
        let state = self.state.lock().await;
        let mine = state.organizations_of(user_id);
        let theirs = state.organizations_of(other_id);
        Ok(!mine.is_disjoint(&theirs))
    }

    async fn count_responsible(&self, organization_id: Uuid) -> Result<i64, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.organization_id == organization_id)
            .count() as i64)
    }
}

#[async_trait]
impl VersionedStore<Tender> for MemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<Tender>, AppError> {
        Ok(self.find_entity::<Tender>(id).await)
    }

    async fn apply_versioned_update(
        &self,
        id: Uuid,
        mutate: Mutator<Tender>,
    ) -> Result<Tender, AppError> {
        self.update_entity::<Tender>(id, mutate).await
    }

    async fn find_history(
        &self,
        id: Uuid,
        version: i32,
    ) -> Result<Option<TenderHistory>, AppError> {
        Ok(self.history_at::<Tender>(id, version).await)
    }

    async fn list_history(&self, id: Uuid) -> Result<Vec<TenderHistory>, AppError> {
        Ok(self.history_of::<Tender>(id).await)
    }
}

#[async_trait]
impl TenderStore for MemoryStore {
    async fn insert_tender(&self, tender: &Tender) -> Result<Tender, AppError> {
        let mut state = self.state.lock().await;
        state.check_writable()?;
        state.tenders.insert(tender.id, tender.clone());
        Ok(tender.clone())
    }

    async fn list_published(
        &self,
        service_types: &[ServiceType],
        page: Page,
    ) -> Result<Vec<Tender>, AppError> {
        let state = self.state.lock().await;
        let mut tenders: Vec<Tender> = state
            .tenders
            .values()
            .filter(|t| t.status == TenderStatus::Published)
            .filter(|t| service_types.is_empty() || service_types.contains(&t.service_type))
            .cloned()
            .collect();
        tenders.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page.apply(tenders))
    }

    async fn list_for_member(&self, user_id: Uuid, page: Page) -> Result<Vec<Tender>, AppError> {
        let state = self.state.lock().await;
        let organizations = state.organizations_of(user_id);
        let mut tenders: Vec<Tender> = state
            .tenders
            .values()
            .filter(|t| organizations.contains(&t.organization_id))
            .cloned()
            .collect();
        tenders.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page.apply(tenders))
    }
}

#[async_trait]
impl VersionedStore<Bid> for MemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<Bid>, AppError> {
        Ok(self.find_entity::<Bid>(id).await)
    }

    async fn apply_versioned_update(&self, id: Uuid, mutate: Mutator<Bid>) -> Result<Bid, AppError> {
        self.update_entity::<Bid>(id, mutate).await
    }

    async fn find_history(&self, id: Uuid, version: i32) -> Result<Option<BidHistory>, AppError> {
        Ok(self.history_at::<Bid>(id, version).await)
    }

    async fn list_history(&self, id: Uuid) -> Result<Vec<BidHistory>, AppError> {
        Ok(self.history_of::<Bid>(id).await)
    }
}

#[async_trait]
impl BidStore for MemoryStore {
    async fn insert_bid(&self, bid: &Bid) -> Result<Bid, AppError> {
        let mut state = self.state.lock().await;
        state.check_writable()?;
        state.bids.insert(bid.id, bid.clone());
        Ok(bid.clone())
    }

    async fn list_by_author(&self, author_id: Uuid, page: Page) -> Result<Vec<Bid>, AppError> {
        let state = self.state.lock().await;
        let mut bids: Vec<Bid> = state
            .bids
            .values()
            .filter(|b| b.author_id == author_id)
            .cloned()
            .collect();
        bids.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page.apply(bids))
    }

    async fn list_published_for_tender(
        &self,
        tender_id: Uuid,
        page: Page,
    ) -> Result<Vec<Bid>, AppError> {
        let state = self.state.lock().await;
        let mut bids: Vec<Bid> = state
            .bids
            .values()
            .filter(|b| b.tender_id == tender_id && b.status == BidStatus::Published)
            .cloned()
            .collect();
        bids.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(page.apply(bids))
    }
}

#[async_trait]
impl DecisionStore for MemoryStore {
    async fn record_decision(
        &self,
        decision: &Decision,
        tender_id: Uuid,
    ) -> Result<DecisionTally, AppError> {
        let mut state = self.state.lock().await;

        let organization_id = match state.tenders.get(&tender_id) {
            Some(t) if t.status == TenderStatus::Published => t.organization_id,
            Some(_) => {
                return Err(AppError::Conflict(format!(
                    "Tender {} is not published",
                    tender_id
                )))
            }
            None => return Err(AppError::NotFound(format!("Tender {} not found", tender_id))),
        };
        match state.bids.get(&decision.bid_id) {
            Some(b) if b.tender_id == tender_id && b.status == BidStatus::Published => {}
            Some(b) if b.tender_id == tender_id => {
                return Err(AppError::Conflict(format!(
                    "Bid {} is not published",
                    decision.bid_id
                )))
            }
            _ => return Err(AppError::NotFound(format!("Bid {} not found", decision.bid_id))),
        }

        state.check_writable()?;
        state.decisions.push(decision.clone());

        let approvals = state
            .decisions
            .iter()
            .filter(|d| d.bid_id == decision.bid_id && d.decision_type == DecisionKind::Approved)
            .count() as i64;
        let responsible = state
            .memberships
            .iter()
            .filter(|m| m.organization_id == organization_id)
            .count() as i64;

        Ok(DecisionTally {
            decision: decision.clone(),
            approvals,
            responsible,
        })
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn insert_review(&self, review: &Review) -> Result<Review, AppError> {
        let mut state = self.state.lock().await;
        state.check_writable()?;
        state.reviews.push(review.clone());
        Ok(review.clone())
    }

    async fn list_by_bid_author(
        &self,
        bid_author_id: Uuid,
        page: Page,
    ) -> Result<Vec<Review>, AppError> {
        let state = self.state.lock().await;
        let mut reviews: Vec<Review> = state
            .reviews
            .iter()
            .filter(|r| r.bid_author_id == bid_author_id)
            .cloned()
            .collect();
        reviews.sort_by_key(|r| r.created_at);
        Ok(page.apply(reviews))
    }
}
