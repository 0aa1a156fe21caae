use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tender_core::models::Review;
use tender_core::{AppError, Page};
use uuid::Uuid;

use crate::store_traits::ReviewStore;

/// Repository for bid reviews
#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for ReviewRepository {
    #[tracing::instrument(skip(self, review), fields(db.table = "reviews", db.operation = "insert", db.record_id = %review.id))]
    async fn insert_review(&self, review: &Review) -> Result<Review, AppError> {
        let created = sqlx::query_as::<Postgres, Review>(
            r#"
            INSERT INTO reviews (id, bid_id, bid_author_id, description, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, bid_id, bid_author_id, description, created_at
            "#,
        )
        .bind(review.id)
        .bind(review.bid_id)
        .bind(review.bid_author_id)
        .bind(&review.description)
        .bind(review.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "reviews", db.operation = "select"))]
    async fn list_by_bid_author(
        &self,
        bid_author_id: Uuid,
        page: Page,
    ) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<Postgres, Review>(
            r#"
            SELECT id, bid_id, bid_author_id, description, created_at
            FROM reviews
            WHERE bid_author_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(bid_author_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}
