//! Data models for the application
//!
//! This module contains all data structures used throughout the application,
//! organized by domain. Each sub-module represents a specific feature area.

mod bid;
mod decision;
mod organization;
mod review;
mod tender;
mod user;
mod versioned;

// Re-export all models for convenient imports
pub use bid::*;
pub use decision::*;
pub use organization::*;
pub use review::*;
pub use tender::*;
pub use user::*;
pub use versioned::*;
