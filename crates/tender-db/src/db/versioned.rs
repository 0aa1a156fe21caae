//! PostgreSQL implementation of the versioned update primitive
//!
//! One transaction per update:
//!
//! 1. `SELECT ... FOR UPDATE` the live row, which serializes writers on that id
//! 2. run the mutator against the locked state
//! 3. copy the locked row into the history table (same version)
//! 4. write the new content with `version = version + 1`
//!
//! A failing step rolls back everything, so a version bump never exists without
//! its history row.

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};
use tender_core::models::Versioned;
use tender_core::AppError;
use uuid::Uuid;

use super::transaction::TransactionGuard;
use crate::store_traits::Mutator;

/// Table layout of a versioned entity and its history table.
pub trait PgVersioned: Versioned + for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;
    const HISTORY_TABLE: &'static str;
    /// Foreign key column in the history table pointing at the live row.
    const HISTORY_KEY: &'static str;
    /// Every column of the live table, in `FromRow` order.
    const COLUMNS: &'static [&'static str];
    /// Columns carried by `Content`; bound as `$2..` by [`Self::bind_content`].
    const CONTENT_COLUMNS: &'static [&'static str];

    fn bind_content<'q>(
        query: QueryAs<'q, Postgres, Self, PgArguments>,
        content: Self::Content,
    ) -> QueryAs<'q, Postgres, Self, PgArguments>;
}

pub(crate) fn select_columns<E: PgVersioned>() -> String {
    E::COLUMNS.join(", ")
}

pub(crate) fn history_columns<E: PgVersioned>() -> String {
    let mut columns = vec!["id", E::HISTORY_KEY];
    columns.extend_from_slice(E::CONTENT_COLUMNS);
    columns.extend_from_slice(&["version", "created_at"]);
    columns.join(", ")
}

pub(crate) fn select_for_update_sql<E: PgVersioned>() -> String {
    format!(
        "SELECT {} FROM {} WHERE id = $1 FOR UPDATE",
        select_columns::<E>(),
        E::TABLE
    )
}

pub(crate) fn snapshot_sql<E: PgVersioned>() -> String {
    let content = E::CONTENT_COLUMNS.join(", ");
    format!(
        "INSERT INTO {history} (id, {key}, {content}, version, created_at) \
         SELECT $2, id, {content}, version, NOW() FROM {table} WHERE id = $1",
        history = E::HISTORY_TABLE,
        key = E::HISTORY_KEY,
        content = content,
        table = E::TABLE,
    )
}

pub(crate) fn update_sql<E: PgVersioned>() -> String {
    let assignments = E::CONTENT_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 2))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE {} SET {}, version = version + 1 WHERE id = $1 RETURNING {}",
        E::TABLE,
        assignments,
        select_columns::<E>()
    )
}

pub(crate) fn find_history_sql<E: PgVersioned>() -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1 AND version = $2",
        history_columns::<E>(),
        E::HISTORY_TABLE,
        E::HISTORY_KEY
    )
}

pub(crate) fn list_history_sql<E: PgVersioned>() -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1 ORDER BY version ASC",
        history_columns::<E>(),
        E::HISTORY_TABLE,
        E::HISTORY_KEY
    )
}

pub(crate) async fn find<E: PgVersioned>(pool: &PgPool, id: Uuid) -> Result<Option<E>, AppError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = $1",
        select_columns::<E>(),
        E::TABLE
    );
    let entity = sqlx::query_as::<Postgres, E>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(entity)
}

pub(crate) async fn apply_versioned_update<E: PgVersioned>(
    pool: &PgPool,
    id: Uuid,
    mutate: Mutator<E>,
) -> Result<E, AppError> {
    let mut tx = TransactionGuard::begin(pool).await?;

    let select = select_for_update_sql::<E>();
    let current = sqlx::query_as::<Postgres, E>(&select)
        .bind(id)
        .fetch_optional(tx.conn()?)
        .await?;
    let Some(current) = current else {
        tx.rollback().await?;
        return Err(AppError::NotFound(format!("{} {} not found", E::KIND, id)));
    };

    let content = match mutate(&current) {
        Ok(content) => content,
        Err(e) => {
            tx.rollback().await?;
            return Err(e);
        }
    };

    let snapshot = snapshot_sql::<E>();
    sqlx::query(&snapshot)
        .bind(id)
        .bind(Uuid::new_v4())
        .execute(tx.conn()?)
        .await
        .map_err(|e| AppError::storage(format!("Failed to snapshot {} {}", E::KIND, id), e))?;

    let update = update_sql::<E>();
    let updated = E::bind_content(sqlx::query_as::<Postgres, E>(&update).bind(id), content)
        .fetch_one(tx.conn()?)
        .await
        .map_err(|e| AppError::storage(format!("Failed to update {} {}", E::KIND, id), e))?;

    tx.commit().await?;

    tracing::debug!(
        entity = E::KIND,
        %id,
        version = updated.version(),
        "Versioned update committed"
    );

    Ok(updated)
}

pub(crate) async fn find_history<E>(
    pool: &PgPool,
    id: Uuid,
    version: i32,
) -> Result<Option<E::History>, AppError>
where
    E: PgVersioned,
    E::History: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = find_history_sql::<E>();
    let record = sqlx::query_as::<Postgres, E::History>(&sql)
        .bind(id)
        .bind(version)
        .fetch_optional(pool)
        .await?;
    Ok(record)
}

pub(crate) async fn list_history<E>(pool: &PgPool, id: Uuid) -> Result<Vec<E::History>, AppError>
where
    E: PgVersioned,
    E::History: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = list_history_sql::<E>();
    let records = sqlx::query_as::<Postgres, E::History>(&sql)
        .bind(id)
        .fetch_all(pool)
        .await?;
    Ok(records)
}
