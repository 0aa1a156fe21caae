use std::sync::Arc;

use tender_core::models::{
    AuthorType, Bid, BidContent, BidPatch, BidStatus, CreateBidRequest, TenderStatus, User,
    Versioned,
};
use tender_core::{AppError, PageParams, Pagination, TransitionPolicy};
use tender_db::{rollback, BidStore, IdentityStore, TenderStore};
use uuid::Uuid;
use validator::Validate;

use super::authz::{AuthorizationEvaluator, Target};

/// Bid lifecycle: submission, status changes, edits, rollback and listings
#[derive(Clone)]
pub struct BidService {
    identity: Arc<dyn IdentityStore>,
    tenders: Arc<dyn TenderStore>,
    bids: Arc<dyn BidStore>,
    authz: AuthorizationEvaluator,
    pagination: Pagination,
    policy: TransitionPolicy,
}

impl BidService {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        tenders: Arc<dyn TenderStore>,
        bids: Arc<dyn BidStore>,
        pagination: Pagination,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            authz: AuthorizationEvaluator::new(identity.clone()),
            identity,
            tenders,
            bids,
            pagination,
            policy,
        }
    }

    /// Submit a bid on a published tender.
    ///
    /// The submitting user is `author_id`. Organization bids only require the
    /// author to be responsible for some organization, not a specific one.
    #[tracing::instrument(skip(self, request), fields(tender_id = %request.tender_id, author_id = %request.author_id))]
    pub async fn create(&self, request: CreateBidRequest) -> Result<Bid, AppError> {
        request.validate()?;

        let author = self.authz.resolve_user_by_id(request.author_id).await?;
        let tender = self
            .tenders
            .find(request.tender_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tender {} not found", request.tender_id)))?;
        if tender.status != TenderStatus::Published {
            return Err(AppError::Conflict(format!(
                "Tender {} is not published",
                tender.id
            )));
        }
        let author_type: AuthorType = request.author_type.parse()?;
        if author_type == AuthorType::Organization
            && !self.identity.has_any_membership(author.id).await?
        {
            return Err(AppError::Forbidden(
                "Organization bids require the author to be responsible for an organization"
                    .to_string(),
            ));
        }

        let bid = Bid::new(
            request.name,
            request.description,
            tender.id,
            author_type,
            author.id,
        );
        let created = self.bids.insert_bid(&bid).await?;

        tracing::info!(bid_id = %created.id, tender_id = %tender.id, "Bid created");
        Ok(created)
    }

    /// Bids authored by the user.
    #[tracing::instrument(skip(self))]
    pub async fn list_mine(&self, username: &str, params: PageParams) -> Result<Vec<Bid>, AppError> {
        let page = self.pagination.resolve(params)?;
        let user = self.authz.resolve_user(username).await?;

        self.bids.list_by_author(user.id, page).await
    }

    /// Published bids of a tender, visible to its organization's responsible users.
    #[tracing::instrument(skip(self))]
    pub async fn list_for_tender(
        &self,
        username: &str,
        tender_id: Uuid,
        params: PageParams,
    ) -> Result<Vec<Bid>, AppError> {
        let page = self.pagination.resolve(params)?;
        let user = self.authz.resolve_user(username).await?;
        let tender = self
            .tenders
            .find(tender_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tender {} not found", tender_id)))?;
        self.authz
            .ensure_responsible(&user, tender.organization_id)
            .await?;

        self.bids.list_published_for_tender(tender.id, page).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_status(&self, username: &str, bid_id: Uuid) -> Result<BidStatus, AppError> {
        let (_, bid) = self.load_for_actor(username, bid_id).await?;
        Ok(bid.status)
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_status(
        &self,
        username: &str,
        bid_id: Uuid,
        status: &str,
    ) -> Result<Bid, AppError> {
        let (user, bid) = self.load_for_actor(username, bid_id).await?;
        let status: BidStatus = status.parse()?;
        let policy = self.policy;

        let updated = self
            .bids
            .apply_versioned_update(
                bid.id,
                Box::new(move |current: &Bid| -> Result<BidContent, AppError> {
                    policy.check_bid(current.status, status)?;
                    Ok(BidContent {
                        status,
                        ..current.content()
                    })
                }),
            )
            .await?;

        tracing::info!(
            bid_id = %updated.id,
            user_id = %user.id,
            status = %updated.status,
            version = updated.version,
            "Bid status updated"
        );
        Ok(updated)
    }

    /// Partial update. The status field accepts `Created`, `Published` or `Closed`;
    /// `Closed` is refused with `Conflict` since bids cannot be closed.
    #[tracing::instrument(skip(self, patch))]
    pub async fn edit(&self, username: &str, bid_id: Uuid, patch: BidPatch) -> Result<Bid, AppError> {
        let (user, bid) = self.load_for_actor(username, bid_id).await?;
        patch.validate()?;
        let changes = patch.resolve()?;
        if changes.is_empty() {
            return Ok(bid);
        }
        let status = changes.status.map(|s| s.to_bid_status()).transpose()?;
        let policy = self.policy;

        let updated = self
            .bids
            .apply_versioned_update(
                bid.id,
                Box::new(move |current: &Bid| -> Result<BidContent, AppError> {
                    if let Some(status) = status {
                        policy.check_bid(current.status, status)?;
                    }
                    Ok(changes.apply(current.content(), status))
                }),
            )
            .await?;

        tracing::info!(
            bid_id = %updated.id,
            user_id = %user.id,
            version = updated.version,
            "Bid edited"
        );
        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    pub async fn rollback(&self, username: &str, bid_id: Uuid, version: i32) -> Result<Bid, AppError> {
        let (user, bid) = self.load_for_actor(username, bid_id).await?;
        if version < 1 {
            return Err(AppError::InvalidArgument(
                "Version must be at least 1".to_string(),
            ));
        }

        let restored = rollback::<Bid, dyn BidStore>(self.bids.as_ref(), bid.id, version).await?;

        tracing::info!(
            bid_id = %restored.id,
            user_id = %user.id,
            from_version = version,
            version = restored.version,
            "Bid rolled back"
        );
        Ok(restored)
    }

    /// Cancel a bid after a rejection, bypassing the transition policy.
    pub(crate) async fn cancel(&self, bid_id: Uuid) -> Result<Bid, AppError> {
        let canceled = self
            .bids
            .apply_versioned_update(
                bid_id,
                Box::new(|current: &Bid| -> Result<BidContent, AppError> {
                    Ok(BidContent {
                        status: BidStatus::Canceled,
                        ..current.content()
                    })
                }),
            )
            .await?;

        tracing::info!(%bid_id, version = canceled.version, "Bid canceled by rejection");
        Ok(canceled)
    }

    pub(crate) async fn find(&self, bid_id: Uuid) -> Result<Bid, AppError> {
        self.bids
            .find(bid_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bid {} not found", bid_id)))
    }

    async fn load_for_actor(&self, username: &str, bid_id: Uuid) -> Result<(User, Bid), AppError> {
        let user = self.authz.resolve_user(username).await?;
        let bid = self.find(bid_id).await?;
        self.authz.ensure(&user, Target::Bid(&bid)).await?;
        Ok((user, bid))
    }
}
