//! Tender Database Layer
//!
//! This crate provides the persistence collaborators of the tender engine: store
//! traits, the PostgreSQL repositories implementing them, the atomic versioned
//! update primitive, and an in-memory store for tests and embedding.

// Module declarations
pub mod db;
pub mod setup;
pub mod store_traits;

// Re-exports: Store traits and the rollback helper
pub use store_traits::{
    rollback, BidStore, DecisionStore, DecisionTally, IdentityStore, Mutator, ReviewStore,
    TenderStore, VersionedStore,
};

// Re-exports: Postgres repositories
pub use db::{
    BidRepository, DecisionRepository, IdentityRepository, Repositories, ReviewRepository,
    TenderRepository,
};

// Re-exports: Transaction utilities
pub use db::transaction::TransactionGuard;

pub use setup::setup_database;

#[cfg(feature = "memory")]
pub use db::memory::MemoryStore;
