use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};
use tender_core::models::{ServiceType, Tender, TenderContent, TenderHistory};
use tender_core::{AppError, Page};
use uuid::Uuid;

use super::versioned::{self, PgVersioned};
use crate::store_traits::{Mutator, TenderStore, VersionedStore};

const LIST_PUBLISHED_SQL: &str = r#"
    SELECT id, name, description, service_type, status, organization_id, version, created_at
    FROM tenders
    WHERE status = 'Published'
      AND (cardinality($1::text[]) = 0 OR service_type::text = ANY($1::text[]))
    ORDER BY name ASC, id ASC
    LIMIT $2 OFFSET $3
    "#;

const LIST_FOR_MEMBER_SQL: &str = r#"
    SELECT t.id, t.name, t.description, t.service_type, t.status, t.organization_id, t.version, t.created_at
    FROM tenders t
    WHERE t.organization_id IN (
        SELECT organization_id FROM organization_responsibles WHERE user_id = $1
    )
    ORDER BY t.name ASC, t.id ASC
    LIMIT $2 OFFSET $3
    "#;

impl PgVersioned for Tender {
    const TABLE: &'static str = "tenders";
    const HISTORY_TABLE: &'static str = "tender_histories";
    const HISTORY_KEY: &'static str = "tender_id";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "service_type",
        "status",
        "organization_id",
        "version",
        "created_at",
    ];
    const CONTENT_COLUMNS: &'static [&'static str] =
        &["name", "description", "service_type", "status"];

    fn bind_content<'q>(
        query: QueryAs<'q, Postgres, Self, PgArguments>,
        content: TenderContent,
    ) -> QueryAs<'q, Postgres, Self, PgArguments> {
        query
            .bind(content.name)
            .bind(content.description)
            .bind(content.service_type)
            .bind(content.status)
    }
}

/// Repository for tenders and their history
#[derive(Clone)]
pub struct TenderRepository {
    pool: PgPool,
}

impl TenderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionedStore<Tender> for TenderRepository {
    #[tracing::instrument(skip(self), fields(db.table = "tenders", db.operation = "select", db.record_id = %id))]
    async fn find(&self, id: Uuid) -> Result<Option<Tender>, AppError> {
        versioned::find::<Tender>(&self.pool, id).await
    }

    #[tracing::instrument(skip(self, mutate), fields(db.table = "tenders", db.operation = "update", db.record_id = %id))]
    async fn apply_versioned_update(
        &self,
        id: Uuid,
        mutate: Mutator<Tender>,
    ) -> Result<Tender, AppError> {
        versioned::apply_versioned_update::<Tender>(&self.pool, id, mutate).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "tender_histories", db.operation = "select", db.record_id = %id))]
    async fn find_history(
        &self,
        id: Uuid,
        version: i32,
    ) -> Result<Option<TenderHistory>, AppError> {
        versioned::find_history::<Tender>(&self.pool, id, version).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "tender_histories", db.operation = "select", db.record_id = %id))]
    async fn list_history(&self, id: Uuid) -> Result<Vec<TenderHistory>, AppError> {
        versioned::list_history::<Tender>(&self.pool, id).await
    }
}

#[async_trait]
impl TenderStore for TenderRepository {
    #[tracing::instrument(skip(self, tender), fields(db.table = "tenders", db.operation = "insert", db.record_id = %tender.id))]
    async fn insert_tender(&self, tender: &Tender) -> Result<Tender, AppError> {
        let created = sqlx::query_as::<Postgres, Tender>(
            r#"
            INSERT INTO tenders (id, name, description, service_type, status, organization_id, version, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, description, service_type, status, organization_id, version, created_at
            "#,
        )
        .bind(tender.id)
        .bind(&tender.name)
        .bind(&tender.description)
        .bind(tender.service_type)
        .bind(tender.status)
        .bind(tender.organization_id)
        .bind(tender.version)
        .bind(tender.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenders", db.operation = "select"))]
    async fn list_published(
        &self,
        service_types: &[ServiceType],
        page: Page,
    ) -> Result<Vec<Tender>, AppError> {
        let filter: Vec<String> = service_types.iter().map(|s| s.to_string()).collect();

        let tenders = sqlx::query_as::<Postgres, Tender>(LIST_PUBLISHED_SQL)
            .bind(filter)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(tenders)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tenders", db.operation = "select"))]
    async fn list_for_member(&self, user_id: Uuid, page: Page) -> Result<Vec<Tender>, AppError> {
        let tenders = sqlx::query_as::<Postgres, Tender>(LIST_FOR_MEMBER_SQL)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(tenders)
    }
}
