use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::constants::{MAX_FEEDBACK_LENGTH, MAX_USERNAME_LENGTH};

/// Review (feedback) left on a bid, keyed by the bid's literal author id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub bid_id: Uuid,
    pub bid_author_id: Uuid,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(bid_id: Uuid, bid_author_id: Uuid, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            bid_id,
            bid_author_id,
            description,
            created_at: Utc::now(),
        }
    }
}

/// Request DTO for leaving feedback on a bid
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    pub bid_id: Uuid,
    #[validate(length(min = 1, max = MAX_USERNAME_LENGTH, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, max = MAX_FEEDBACK_LENGTH, message = "Feedback must be between 1 and 1000 characters"))]
    pub feedback: String,
}

/// Review as returned by feedback listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for FeedbackEntry {
    fn from(review: Review) -> Self {
        FeedbackEntry {
            id: review.id,
            description: review.description,
            created_at: review.created_at,
        }
    }
}
