use std::sync::Arc;

use tender_core::constants::quorum_for;
use tender_core::models::{Bid, BidStatus, Decision, DecisionKind, TenderStatus};
use tender_core::AppError;
use tender_db::{DecisionStore, IdentityStore};
use uuid::Uuid;

use super::authz::AuthorizationEvaluator;
use super::bid::BidService;
use super::locks::TenderLocks;
use super::tender::TenderService;

/// Records decisions on bids and closes tenders once a bid reaches quorum.
///
/// Quorum is `min(3, responsible users of the tender's organization)` approvals
/// on a single bid. The store serializes recording and counting per tender
/// across processes; `TenderLocks` additionally keeps one engine's decisions on
/// a tender from overlapping with each other's cancel and close steps.
#[derive(Clone)]
pub struct DecisionService {
    decisions: Arc<dyn DecisionStore>,
    authz: AuthorizationEvaluator,
    tenders: TenderService,
    bids: BidService,
    locks: TenderLocks,
}

impl DecisionService {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        decisions: Arc<dyn DecisionStore>,
        tenders: TenderService,
        bids: BidService,
        locks: TenderLocks,
    ) -> Self {
        Self {
            authz: AuthorizationEvaluator::new(identity),
            decisions,
            tenders,
            bids,
            locks,
        }
    }

    /// Submit a decision and return the reloaded bid.
    ///
    /// A rejection cancels the bid. Either way the approval count is compared
    /// with the quorum afterwards and the tender is closed when it is reached.
    /// A failure after the decision is recorded leaves the decision in place.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&self, username: &str, bid_id: Uuid, kind: &str) -> Result<Bid, AppError> {
        let user = self.authz.resolve_user(username).await?;
        let bid = self.bids.find(bid_id).await?;

        let _guard = self.locks.acquire(bid.tender_id).await;

        // State may have moved while waiting for the lock
        let bid = self.bids.find(bid.id).await?;
        if bid.status != BidStatus::Published {
            return Err(AppError::Conflict(format!("Bid {} is not published", bid.id)));
        }
        let tender = self.tenders.find(bid.tender_id).await?;
        if tender.status != TenderStatus::Published {
            return Err(AppError::Conflict(format!(
                "Tender {} is not published",
                tender.id
            )));
        }
        self.authz
            .ensure_responsible(&user, tender.organization_id)
            .await?;
        let kind: DecisionKind = kind.parse()?;

        let tally = self
            .decisions
            .record_decision(&Decision::new(bid.id, user.id, kind), tender.id)
            .await?;
        tracing::info!(
            decision_id = %tally.decision.id,
            bid_id = %bid.id,
            user_id = %user.id,
            kind = %kind,
            "Decision recorded"
        );

        if kind == DecisionKind::Rejected {
            self.bids.cancel(bid.id).await?;
        }

        let approvals = tally.approvals;
        let quorum = quorum_for(tally.responsible);
        tracing::debug!(bid_id = %bid.id, approvals, quorum, "Quorum check");

        if approvals >= quorum {
            self.tenders.close(tender.id).await?;
        }

        self.bids.find(bid.id).await
    }
}
