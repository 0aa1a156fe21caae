use std::sync::Arc;

use tender_core::models::{Bid, BidStatus, FeedbackEntry, Review, SubmitFeedbackRequest};
use tender_core::{AppError, PageParams, Pagination};
use tender_db::{BidStore, IdentityStore, ReviewStore, TenderStore};
use uuid::Uuid;
use validator::Validate;

use super::authz::AuthorizationEvaluator;

/// Reviews of bids, written by the tender organization's responsible users
#[derive(Clone)]
pub struct FeedbackService {
    identity: Arc<dyn IdentityStore>,
    tenders: Arc<dyn TenderStore>,
    bids: Arc<dyn BidStore>,
    reviews: Arc<dyn ReviewStore>,
    authz: AuthorizationEvaluator,
    pagination: Pagination,
}

impl FeedbackService {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        tenders: Arc<dyn TenderStore>,
        bids: Arc<dyn BidStore>,
        reviews: Arc<dyn ReviewStore>,
        pagination: Pagination,
    ) -> Self {
        Self {
            authz: AuthorizationEvaluator::new(identity.clone()),
            identity,
            tenders,
            bids,
            reviews,
            pagination,
        }
    }

    /// Leave feedback on a published bid. The review is keyed by the bid's author id.
    #[tracing::instrument(skip(self, request), fields(bid_id = %request.bid_id))]
    pub async fn submit(&self, request: SubmitFeedbackRequest) -> Result<Bid, AppError> {
        request.validate()?;

        let user = self.authz.resolve_user(&request.username).await?;
        let bid = self
            .bids
            .find(request.bid_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bid {} not found", request.bid_id)))?;
        if bid.status != BidStatus::Published {
            return Err(AppError::Conflict(format!("Bid {} is not published", bid.id)));
        }
        let tender = self
            .tenders
            .find(bid.tender_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tender {} not found", bid.tender_id)))?;
        self.authz
            .ensure_responsible(&user, tender.organization_id)
            .await?;

        let review = self
            .reviews
            .insert_review(&Review::new(bid.id, bid.author_id, request.feedback))
            .await?;
        tracing::info!(review_id = %review.id, bid_id = %bid.id, user_id = %user.id, "Feedback recorded");

        self.bids
            .find(bid.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bid {} not found", bid.id)))
    }

    /// Reviews left on bids of `author_username`, for a requester responsible for the tender.
    #[tracing::instrument(skip(self))]
    pub async fn list(
        &self,
        requester_username: &str,
        tender_id: Uuid,
        author_username: &str,
        params: PageParams,
    ) -> Result<Vec<FeedbackEntry>, AppError> {
        let page = self.pagination.resolve(params)?;
        let requester = self.authz.resolve_user(requester_username).await?;
        let tender = self
            .tenders
            .find(tender_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tender {} not found", tender_id)))?;
        self.authz
            .ensure_responsible(&requester, tender.organization_id)
            .await?;
        let author = self
            .identity
            .find_user_by_username(author_username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", author_username)))?;

        let reviews = self.reviews.list_by_bid_author(author.id, page).await?;
        Ok(reviews.into_iter().map(FeedbackEntry::from).collect())
    }
}
