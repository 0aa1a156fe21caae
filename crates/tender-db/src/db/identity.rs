use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tender_core::models::{Organization, User};
use tender_core::AppError;
use uuid::Uuid;

use crate::store_traits::IdentityStore;

/// Read-only access to employees, organizations and responsibility rows
#[derive(Clone)]
pub struct IdentityRepository {
    pool: PgPool,
}

impl IdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for IdentityRepository {
    #[tracing::instrument(skip(self), fields(db.table = "employees", db.operation = "select"))]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            "SELECT id, username, first_name, last_name, created_at, updated_at FROM employees WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "employees", db.operation = "select", db.record_id = %id))]
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(
            "SELECT id, username, first_name, last_name, created_at, updated_at FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select", db.record_id = %id))]
    async fn find_organization(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let organization = sqlx::query_as::<Postgres, Organization>(
            "SELECT id, name, description, organization_type, created_at, updated_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organization)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_responsibles", db.operation = "select"))]
    async fn is_responsible(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM organization_responsibles WHERE user_id = $1 AND organization_id = $2)",
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_responsibles", db.operation = "select"))]
    async fn has_any_membership(&self, user_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM organization_responsibles WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_responsibles", db.operation = "select"))]
    async fn shares_organization(&self, user_id: Uuid, other_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM organization_responsibles
                WHERE user_id = $1
                  AND organization_id IN (
                      SELECT organization_id FROM organization_responsibles WHERE user_id = $2
                  )
            )
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_responsibles", db.operation = "count"))]
    async fn count_responsible(&self, organization_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM organization_responsibles WHERE organization_id = $1",
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
