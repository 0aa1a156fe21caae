//! Status transition rules.
//!
//! By default any status may be set on a tender or bid through an edit. The strict
//! policy only lets status move forward along the lifecycle:
//!
//! - tender: `Created -> Published -> Closed`
//! - bid: `Created -> Published -> Canceled`
//!
//! Re-applying the current status is always accepted. Rollbacks are not checked.

use crate::error::AppError;
use crate::models::{BidStatus, TenderStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

impl TransitionPolicy {
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        }
    }

    pub fn check_tender(&self, from: TenderStatus, to: TenderStatus) -> Result<(), AppError> {
        if *self == TransitionPolicy::Permissive || from == to {
            return Ok(());
        }
        let allowed = matches!(
            (from, to),
            (TenderStatus::Created, TenderStatus::Published)
                | (TenderStatus::Published, TenderStatus::Closed)
        );
        if allowed {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "Tender status cannot change from {} to {}",
                from, to
            )))
        }
    }

    pub fn check_bid(&self, from: BidStatus, to: BidStatus) -> Result<(), AppError> {
        if *self == TransitionPolicy::Permissive || from == to {
            return Ok(());
        }
        let allowed = matches!(
            (from, to),
            (BidStatus::Created, BidStatus::Published) | (BidStatus::Published, BidStatus::Canceled)
        );
        if allowed {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "Bid status cannot change from {} to {}",
                from, to
            )))
        }
    }
}
