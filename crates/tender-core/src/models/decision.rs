use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Verdict of a responsible user on a bid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "decision_type"))]
pub enum DecisionKind {
    Approved,
    Rejected,
}

impl Display for DecisionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DecisionKind::Approved => write!(f, "Approved"),
            DecisionKind::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for DecisionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Approved" => Ok(DecisionKind::Approved),
            "Rejected" => Ok(DecisionKind::Rejected),
            _ => Err(AppError::InvalidArgument(format!(
                "Invalid decision value: {}",
                s
            ))),
        }
    }
}

/// Decision entity. Append-only; the same user may decide on a bid repeatedly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: Uuid,
    pub bid_id: Uuid,
    pub author_id: Uuid,
    pub decision_type: DecisionKind,
    pub created_at: DateTime<Utc>,
}

impl Decision {
    pub fn new(bid_id: Uuid, author_id: Uuid, decision_type: DecisionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            bid_id,
            author_id,
            decision_type,
            created_at: Utc::now(),
        }
    }
}
