//! Lifecycle services
//!
//! Every operation resolves the acting user first, then the target entity, then
//! authorization, then entity state, then enumeration values, and stops at the
//! first failure.

pub mod authz;
pub mod bid;
pub mod decision;
pub mod feedback;
pub mod locks;
pub mod tender;

pub use authz::{AuthorizationEvaluator, Target};
pub use bid::BidService;
pub use decision::DecisionService;
pub use feedback::FeedbackService;
pub use locks::TenderLocks;
pub use tender::TenderService;
