//! Engine wiring
//!
//! Builds every service over one set of repositories and shares a single
//! [`TenderLocks`] between them.

use tender_core::{Config, Pagination, TransitionPolicy};
use tender_db::{setup_database, Repositories};

use crate::services::{BidService, DecisionService, FeedbackService, TenderLocks, TenderService};

/// The operation surface of the tender engine
#[derive(Clone)]
pub struct TenderEngine {
    pub tenders: TenderService,
    pub bids: BidService,
    pub decisions: DecisionService,
    pub feedback: FeedbackService,
}

impl TenderEngine {
    pub fn new(repositories: Repositories, pagination: Pagination, policy: TransitionPolicy) -> Self {
        let tenders = TenderService::new(
            repositories.identity.clone(),
            repositories.tenders.clone(),
            pagination,
            policy,
        );
        let bids = BidService::new(
            repositories.identity.clone(),
            repositories.tenders.clone(),
            repositories.bids.clone(),
            pagination,
            policy,
        );
        let decisions = DecisionService::new(
            repositories.identity.clone(),
            repositories.decisions.clone(),
            tenders.clone(),
            bids.clone(),
            TenderLocks::new(),
        );
        let feedback = FeedbackService::new(
            repositories.identity,
            repositories.tenders,
            repositories.bids,
            repositories.reviews,
            pagination,
        );

        Self {
            tenders,
            bids,
            decisions,
            feedback,
        }
    }

    /// Engine with pagination bounds and transition policy taken from configuration
    pub fn from_config(repositories: Repositories, config: &Config) -> Self {
        Self::new(
            repositories,
            Pagination::from_config(config),
            TransitionPolicy::from_strict_flag(config.strict_status_transitions()),
        )
    }

    /// Connect to PostgreSQL, apply migrations and build the engine.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let pool = setup_database(config).await?;

        tracing::info!(
            environment = config.environment(),
            strict_status_transitions = config.strict_status_transitions(),
            "Tender engine ready"
        );
        Ok(Self::from_config(Repositories::postgres(pool), config))
    }
}
