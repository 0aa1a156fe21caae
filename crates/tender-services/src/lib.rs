//! Tender Services
//!
//! Lifecycle engine for procurement tenders and bids: authorization, versioned
//! status and content changes, quorum-based decisions and bid feedback.

pub mod engine;
pub mod services;
pub mod telemetry;

pub use engine::TenderEngine;
pub use services::{
    AuthorizationEvaluator, BidService, DecisionService, FeedbackService, Target, TenderLocks,
    TenderService,
};
