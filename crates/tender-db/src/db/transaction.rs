//! Database transaction utilities
//!
//! This module provides a guard around a PostgreSQL transaction for multi-step
//! operations that need atomicity, such as the versioned update.

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tender_core::AppError;

/// A database transaction wrapper with explicit commit/rollback
///
/// A guard dropped without either is rolled back by the driver when the
/// connection returns to the pool, and a warning is logged.
///
/// # Example
///
/// ```ignore
/// use tender_db::TransactionGuard;
///
/// async fn example(pool: &sqlx::PgPool) -> Result<(), tender_core::AppError> {
///     let mut tx = TransactionGuard::begin(pool).await?;
///     sqlx::query("UPDATE ...").execute(tx.conn()?).await?;
///     tx.commit().await
/// }
/// ```
pub struct TransactionGuard<'a> {
    transaction: Option<Transaction<'a, Postgres>>,
}

impl<'a> TransactionGuard<'a> {
    /// Begin a new database transaction
    pub async fn begin(pool: &'a PgPool) -> Result<Self, AppError> {
        let transaction = pool
            .begin()
            .await
            .map_err(|e| AppError::storage("Failed to begin database transaction", e))?;

        Ok(Self {
            transaction: Some(transaction),
        })
    }

    /// Connection bound to the open transaction
    pub fn conn(&mut self) -> Result<&mut PgConnection, AppError> {
        match self.transaction.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(AppError::Internal(
                "Transaction was already committed or rolled back".to_string(),
            )),
        }
    }

    /// Commit the transaction
    pub async fn commit(mut self) -> Result<(), AppError> {
        if let Some(tx) = self.transaction.take() {
            tx.commit()
                .await
                .map_err(|e| AppError::storage("Failed to commit database transaction", e))?;
        }
        Ok(())
    }

    /// Rollback the transaction
    pub async fn rollback(mut self) -> Result<(), AppError> {
        if let Some(tx) = self.transaction.take() {
            tx.rollback()
                .await
                .map_err(|e| AppError::storage("Failed to rollback database transaction", e))?;
        }
        Ok(())
    }
}

impl<'a> Drop for TransactionGuard<'a> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            tracing::warn!(
                "Transaction was dropped without explicit commit or rollback - rolling back"
            );
        }
    }
}
