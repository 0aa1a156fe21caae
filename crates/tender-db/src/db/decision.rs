use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tender_core::models::{BidStatus, Decision, DecisionKind, TenderStatus};
use tender_core::AppError;
use uuid::Uuid;

use super::transaction::TransactionGuard;
use crate::store_traits::{DecisionStore, DecisionTally};

/// Repository for the append-only decision log
#[derive(Clone)]
pub struct DecisionRepository {
    pool: PgPool,
}

impl DecisionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DecisionStore for DecisionRepository {
    /// Holds `FOR UPDATE` on the tender row from the state check until the
    /// counts are read, so concurrent deciders on one tender queue up here
    /// whichever process they run in.
    #[tracing::instrument(skip(self, decision), fields(db.table = "decisions", db.operation = "insert", db.record_id = %decision.id))]
    async fn record_decision(
        &self,
        decision: &Decision,
        tender_id: Uuid,
    ) -> Result<DecisionTally, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let tender = sqlx::query_as::<Postgres, (Uuid, TenderStatus)>(
            "SELECT organization_id, status FROM tenders WHERE id = $1 FOR UPDATE",
        )
        .bind(tender_id)
        .fetch_optional(tx.conn()?)
        .await?;
        let organization_id = match tender {
            Some((organization_id, TenderStatus::Published)) => organization_id,
            Some(_) => {
                tx.rollback().await?;
                return Err(AppError::Conflict(format!(
                    "Tender {} is not published",
                    tender_id
                )));
            }
            None => {
                tx.rollback().await?;
                return Err(AppError::NotFound(format!("Tender {} not found", tender_id)));
            }
        };

        let bid_status = sqlx::query_scalar::<Postgres, BidStatus>(
            "SELECT status FROM bids WHERE id = $1 AND tender_id = $2",
        )
        .bind(decision.bid_id)
        .bind(tender_id)
        .fetch_optional(tx.conn()?)
        .await?;
        match bid_status {
            Some(BidStatus::Published) => {}
            Some(_) => {
                tx.rollback().await?;
                return Err(AppError::Conflict(format!(
                    "Bid {} is not published",
                    decision.bid_id
                )));
            }
            None => {
                tx.rollback().await?;
                return Err(AppError::NotFound(format!("Bid {} not found", decision.bid_id)));
            }
        }

        let created = sqlx::query_as::<Postgres, Decision>(
            r#"
            INSERT INTO decisions (id, bid_id, author_id, decision_type, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, bid_id, author_id, decision_type, created_at
            "#,
        )
        .bind(decision.id)
        .bind(decision.bid_id)
        .bind(decision.author_id)
        .bind(decision.decision_type)
        .bind(decision.created_at)
        .fetch_one(tx.conn()?)
        .await
        .map_err(|e| AppError::storage(format!("Failed to insert decision {}", decision.id), e))?;

        let approvals = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM decisions WHERE bid_id = $1 AND decision_type = $2",
        )
        .bind(decision.bid_id)
        .bind(DecisionKind::Approved)
        .fetch_one(tx.conn()?)
        .await?;

        let responsible = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM organization_responsibles WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_one(tx.conn()?)
        .await?;

        tx.commit().await?;

        Ok(DecisionTally {
            decision: created,
            approvals,
            responsible,
        })
    }
}
