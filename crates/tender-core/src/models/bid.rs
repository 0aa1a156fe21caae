use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::versioned::{HistoryRecord, Versioned};
use crate::constants::{MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH};
use crate::error::AppError;

/// Bid lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "bid_status"))]
pub enum BidStatus {
    Created,
    Published,
    Canceled,
}

impl Display for BidStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            BidStatus::Created => write!(f, "Created"),
            BidStatus::Published => write!(f, "Published"),
            BidStatus::Canceled => write!(f, "Canceled"),
        }
    }
}

impl FromStr for BidStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(BidStatus::Created),
            "Published" => Ok(BidStatus::Published),
            "Canceled" => Ok(BidStatus::Canceled),
            _ => Err(AppError::InvalidArgument(format!(
                "Invalid bid status: {}",
                s
            ))),
        }
    }
}

/// Status values accepted by the bid edit operation.
///
/// This set differs from [`BidStatus`]: it accepts `Closed` and not `Canceled`.
/// `Closed` passes validation but has no bid lifecycle counterpart, so applying it
/// is refused with `Conflict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableBidStatus {
    Created,
    Published,
    Closed,
}

impl FromStr for EditableBidStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(EditableBidStatus::Created),
            "Published" => Ok(EditableBidStatus::Published),
            "Closed" => Ok(EditableBidStatus::Closed),
            _ => Err(AppError::InvalidArgument(format!(
                "Invalid status value: {}",
                s
            ))),
        }
    }
}

impl EditableBidStatus {
    pub fn to_bid_status(self) -> Result<BidStatus, AppError> {
        match self {
            EditableBidStatus::Created => Ok(BidStatus::Created),
            EditableBidStatus::Published => Ok(BidStatus::Published),
            EditableBidStatus::Closed => Err(AppError::Conflict(
                "Bids cannot be closed; only tenders are".to_string(),
            )),
        }
    }
}

/// Who a bid is submitted on behalf of
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "author_type"))]
pub enum AuthorType {
    Organization,
    User,
}

impl Display for AuthorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AuthorType::Organization => write!(f, "Organization"),
            AuthorType::User => write!(f, "User"),
        }
    }
}

impl FromStr for AuthorType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Organization" => Ok(AuthorType::Organization),
            "User" => Ok(AuthorType::User),
            _ => Err(AppError::InvalidArgument(format!(
                "Invalid author type: {}",
                s
            ))),
        }
    }
}

/// Bid entity. `author_type` and `author_id` are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: BidStatus,
    pub tender_id: Uuid,
    pub author_type: AuthorType,
    pub author_id: Uuid,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

/// The mutable fields of a bid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidContent {
    pub name: String,
    pub description: String,
    pub status: BidStatus,
}

/// Snapshot of a bid taken immediately before a mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct BidHistory {
    pub id: Uuid,
    pub bid_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: BidStatus,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

impl Bid {
    /// A freshly submitted bid: status `Created`, version 1.
    pub fn new(
        name: String,
        description: String,
        tender_id: Uuid,
        author_type: AuthorType,
        author_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            status: BidStatus::Created,
            tender_id,
            author_type,
            author_id,
            version: 1,
            created_at: Utc::now(),
        }
    }
}

impl Versioned for Bid {
    type Content = BidContent;
    type History = BidHistory;

    const KIND: &'static str = "bid";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn content(&self) -> BidContent {
        BidContent {
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
        }
    }

    fn snapshot(&self, history_id: Uuid, taken_at: DateTime<Utc>) -> BidHistory {
        BidHistory {
            id: history_id,
            bid_id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            version: self.version,
            created_at: taken_at,
        }
    }

    fn with_content(self, content: BidContent, version: i32) -> Self {
        Self {
            name: content.name,
            description: content.description,
            status: content.status,
            version,
            ..self
        }
    }
}

impl HistoryRecord for BidHistory {
    type Content = BidContent;

    fn version(&self) -> i32 {
        self.version
    }

    fn content(&self) -> BidContent {
        BidContent {
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
        }
    }
}

/// Request DTO for submitting a bid
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBidRequest {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Bid name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = MAX_DESCRIPTION_LENGTH,
        message = "Bid description must be between 1 and 500 characters"
    ))]
    pub description: String,
    pub tender_id: Uuid,
    pub author_type: String,
    pub author_id: Uuid,
}

/// Partial update of a bid. Only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BidPatch {
    #[serde(default)]
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Bid name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = MAX_DESCRIPTION_LENGTH,
        message = "Bid description must be between 1 and 500 characters"
    ))]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A [`BidPatch`] whose status has been parsed against the edit status set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BidChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<EditableBidStatus>,
}

impl BidPatch {
    /// Parse the status field, failing with `InvalidArgument` when it is outside
    /// the edit status set.
    pub fn resolve(self) -> Result<BidChanges, AppError> {
        Ok(BidChanges {
            name: self.name,
            description: self.description,
            status: self
                .status
                .as_deref()
                .map(str::parse::<EditableBidStatus>)
                .transpose()?,
        })
    }
}

impl BidChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.status.is_none()
    }

    pub fn apply(&self, current: BidContent, status: Option<BidStatus>) -> BidContent {
        BidContent {
            name: self.name.clone().unwrap_or(current.name),
            description: self.description.clone().unwrap_or(current.description),
            status: status.unwrap_or(current.status),
        }
    }
}
