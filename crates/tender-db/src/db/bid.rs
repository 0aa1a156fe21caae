use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};
use tender_core::models::{Bid, BidContent, BidHistory};
use tender_core::{AppError, Page};
use uuid::Uuid;

use super::versioned::{self, PgVersioned};
use crate::store_traits::{BidStore, Mutator, VersionedStore};

const LIST_BY_AUTHOR_SQL: &str = r#"
    SELECT id, name, description, status, tender_id, author_type, author_id, version, created_at
    FROM bids
    WHERE author_id = $1
    ORDER BY name ASC, id ASC
    LIMIT $2 OFFSET $3
    "#;

const LIST_PUBLISHED_FOR_TENDER_SQL: &str = r#"
    SELECT id, name, description, status, tender_id, author_type, author_id, version, created_at
    FROM bids
    WHERE tender_id = $1 AND status = 'Published'
    ORDER BY name ASC, id ASC
    LIMIT $2 OFFSET $3
    "#;

impl PgVersioned for Bid {
    const TABLE: &'static str = "bids";
    const HISTORY_TABLE: &'static str = "bid_histories";
    const HISTORY_KEY: &'static str = "bid_id";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "status",
        "tender_id",
        "author_type",
        "author_id",
        "version",
        "created_at",
    ];
    const CONTENT_COLUMNS: &'static [&'static str] = &["name", "description", "status"];

    fn bind_content<'q>(
        query: QueryAs<'q, Postgres, Self, PgArguments>,
        content: BidContent,
    ) -> QueryAs<'q, Postgres, Self, PgArguments> {
        query
            .bind(content.name)
            .bind(content.description)
            .bind(content.status)
    }
}

/// Repository for bids and their history
#[derive(Clone)]
pub struct BidRepository {
    pool: PgPool,
}

impl BidRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionedStore<Bid> for BidRepository {
    #[tracing::instrument(skip(self), fields(db.table = "bids", db.operation = "select", db.record_id = %id))]
    async fn find(&self, id: Uuid) -> Result<Option<Bid>, AppError> {
        versioned::find::<Bid>(&self.pool, id).await
    }

    #[tracing::instrument(skip(self, mutate), fields(db.table = "bids", db.operation = "update", db.record_id = %id))]
    async fn apply_versioned_update(&self, id: Uuid, mutate: Mutator<Bid>) -> Result<Bid, AppError> {
        versioned::apply_versioned_update::<Bid>(&self.pool, id, mutate).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "bid_histories", db.operation = "select", db.record_id = %id))]
    async fn find_history(&self, id: Uuid, version: i32) -> Result<Option<BidHistory>, AppError> {
        versioned::find_history::<Bid>(&self.pool, id, version).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "bid_histories", db.operation = "select", db.record_id = %id))]
    async fn list_history(&self, id: Uuid) -> Result<Vec<BidHistory>, AppError> {
        versioned::list_history::<Bid>(&self.pool, id).await
    }
}

#[async_trait]
impl BidStore for BidRepository {
    #[tracing::instrument(skip(self, bid), fields(db.table = "bids", db.operation = "insert", db.record_id = %bid.id))]
    async fn insert_bid(&self, bid: &Bid) -> Result<Bid, AppError> {
        let created = sqlx::query_as::<Postgres, Bid>(
            r#"
            INSERT INTO bids (id, name, description, status, tender_id, author_type, author_id, version, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, description, status, tender_id, author_type, author_id, version, created_at
            "#,
        )
        .bind(bid.id)
        .bind(&bid.name)
        .bind(&bid.description)
        .bind(bid.status)
        .bind(bid.tender_id)
        .bind(bid.author_type)
        .bind(bid.author_id)
        .bind(bid.version)
        .bind(bid.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "bids", db.operation = "select"))]
    async fn list_by_author(&self, author_id: Uuid, page: Page) -> Result<Vec<Bid>, AppError> {
        let bids = sqlx::query_as::<Postgres, Bid>(LIST_BY_AUTHOR_SQL)
            .bind(author_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(bids)
    }

    #[tracing::instrument(skip(self), fields(db.table = "bids", db.operation = "select"))]
    async fn list_published_for_tender(
        &self,
        tender_id: Uuid,
        page: Page,
    ) -> Result<Vec<Bid>, AppError> {
        let bids = sqlx::query_as::<Postgres, Bid>(LIST_PUBLISHED_FOR_TENDER_SQL)
            .bind(tender_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(bids)
    }
}
