//! Tender Core Library
//!
//! This crate provides the domain models, error types, configuration and validation
//! shared by the tender workspace: organizations and their responsible users,
//! versioned tenders and bids, decisions and reviews.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod pagination;
pub mod transitions;

// Re-export commonly used types
pub use config::{Config, DatabaseConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use pagination::{Page, PageParams, Pagination};
pub use transitions::TransitionPolicy;
