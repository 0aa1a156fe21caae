//! Error types module
//!
//! This module provides the error type shared by every tender crate. All failures
//! are terminal for the operation that raised them and are reported to the caller;
//! nothing here is retried automatically.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for refused operations
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// by whatever dispatch layer sits in front of the services.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "NOT_FOUND")
    fn error_code(&self) -> &'static str;

    /// Whether resubmitting the same operation may succeed
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage failure: {message}")]
    Storage {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{entity} {id} has no version {version}")]
    VersionNotFound {
        entity: &'static str,
        id: Uuid,
        version: i32,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Storage {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidArgument(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidArgument(format!("UUID parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidArgument(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::Database(_) => (500, "DATABASE_ERROR", true, true, LogLevel::Error),
        AppError::Storage { .. } => (500, "STORAGE_FAILURE", true, true, LogLevel::Error),
        AppError::InvalidArgument(_) => (400, "INVALID_ARGUMENT", false, false, LogLevel::Debug),
        AppError::Unauthenticated(_) => (401, "UNAUTHENTICATED", false, false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, false, LogLevel::Debug),
        AppError::VersionNotFound { .. } => {
            (404, "VERSION_NOT_FOUND", false, false, LogLevel::Debug)
        }
        AppError::Forbidden(_) => (403, "FORBIDDEN", false, false, LogLevel::Warn),
        AppError::Conflict(_) => (409, "CONFLICT", false, false, LogLevel::Debug),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage { .. } => "Storage",
            AppError::InvalidArgument(_) => "InvalidArgument",
            AppError::Unauthenticated(_) => "Unauthenticated",
            AppError::NotFound(_) => "NotFound",
            AppError::VersionNotFound { .. } => "VersionNotFound",
            AppError::Forbidden(_) => "Forbidden",
            AppError::Conflict(_) => "Conflict",
            AppError::Internal(_) => "Internal",
        }
    }

    /// True for failures of the persistence layer rather than of the request.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Storage { .. })
    }

    /// Wrap a persistence failure with a short description of the step that failed.
    pub fn storage(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::Storage {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage { .. } => "Failed to persist changes".to_string(),
            AppError::InvalidArgument(ref msg) => msg.clone(),
            AppError::Unauthenticated(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::VersionNotFound { entity, version, .. } => {
                format!("{} version {} not found", entity, version)
            }
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::Conflict(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert!(err.is_storage_failure());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_request_errors() {
        let cases = [
            (AppError::InvalidArgument("bad".into()), 400, "INVALID_ARGUMENT"),
            (AppError::Unauthenticated("who".into()), 401, "UNAUTHENTICATED"),
            (AppError::Forbidden("no".into()), 403, "FORBIDDEN"),
            (AppError::NotFound("gone".into()), 404, "NOT_FOUND"),
            (AppError::Conflict("state".into()), 409, "CONFLICT"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.http_status_code(), status);
            assert_eq!(err.error_code(), code);
            assert!(!err.is_recoverable());
            assert!(!err.is_sensitive());
            assert!(!err.is_storage_failure());
        }
    }

    #[test]
    fn test_version_not_found_message() {
        let err = AppError::VersionNotFound {
            entity: "tender",
            id: Uuid::nil(),
            version: 7,
        };
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "VERSION_NOT_FOUND");
        assert_eq!(err.client_message(), "tender version 7 not found");
    }

    #[test]
    fn test_storage_error_keeps_source_chain() {
        let err = AppError::storage(
            "Failed to write history row",
            anyhow::anyhow!("connection reset"),
        );
        assert!(err.is_storage_failure());
        assert_eq!(err.client_message(), "Failed to persist changes");
        let details = err.detailed_message();
        assert!(details.contains("Failed to write history row"));
        assert!(details.contains("Caused by: connection reset"));
    }
}
