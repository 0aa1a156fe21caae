//! Database repositories for the data access layer
//!
//! Each repository owns one table family and implements the matching store trait
//! from [`crate::store_traits`]. [`Repositories`] bundles them as trait objects
//! so services never see which backend they run on.

use std::sync::Arc;

use sqlx::PgPool;

use crate::store_traits::{BidStore, DecisionStore, IdentityStore, ReviewStore, TenderStore};

pub mod bid;
pub mod decision;
pub mod identity;
#[cfg(feature = "memory")]
pub mod memory;
pub mod review;
pub mod tender;
pub mod transaction;
pub mod versioned;

pub use bid::BidRepository;
pub use decision::DecisionRepository;
pub use identity::IdentityRepository;
pub use review::ReviewRepository;
pub use tender::TenderRepository;

/// The full set of stores the lifecycle services depend on
#[derive(Clone)]
pub struct Repositories {
    pub identity: Arc<dyn IdentityStore>,
    pub tenders: Arc<dyn TenderStore>,
    pub bids: Arc<dyn BidStore>,
    pub decisions: Arc<dyn DecisionStore>,
    pub reviews: Arc<dyn ReviewStore>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            identity: Arc::new(IdentityRepository::new(pool.clone())),
            tenders: Arc::new(TenderRepository::new(pool.clone())),
            bids: Arc::new(BidRepository::new(pool.clone())),
            decisions: Arc::new(DecisionRepository::new(pool.clone())),
            reviews: Arc::new(ReviewRepository::new(pool)),
        }
    }

    /// Every store backed by the same in-memory state
    #[cfg(feature = "memory")]
    pub fn memory(store: memory::MemoryStore) -> Self {
        Self {
            identity: Arc::new(store.clone()),
            tenders: Arc::new(store.clone()),
            bids: Arc::new(store.clone()),
            decisions: Arc::new(store.clone()),
            reviews: Arc::new(store),
        }
    }
}
