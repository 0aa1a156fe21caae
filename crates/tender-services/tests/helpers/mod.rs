#![allow(dead_code)]

pub mod fixtures;

use tender_core::{Pagination, TransitionPolicy};
use tender_db::{MemoryStore, Repositories};
use tender_services::TenderEngine;

/// Test application backed by the in-memory store
pub struct TestApp {
    pub store: MemoryStore,
    pub engine: TenderEngine,
}

/// Setup a test application with default pagination and permissive transitions
pub fn setup_test_app() -> TestApp {
    setup_with_policy(TransitionPolicy::Permissive)
}

/// Setup a test application that only lets status move forward
pub fn setup_strict_app() -> TestApp {
    setup_with_policy(TransitionPolicy::Strict)
}

fn setup_with_policy(policy: TransitionPolicy) -> TestApp {
    let store = MemoryStore::new();
    let engine = TenderEngine::new(
        Repositories::memory(store.clone()),
        Pagination::default(),
        policy,
    );
    TestApp { store, engine }
}

impl TestApp {
    /// A second engine over the same store, with its own in-process locks
    pub fn engine_sharing_store(&self) -> TenderEngine {
        TenderEngine::new(
            Repositories::memory(self.store.clone()),
            Pagination::default(),
            TransitionPolicy::Permissive,
        )
    }
}
