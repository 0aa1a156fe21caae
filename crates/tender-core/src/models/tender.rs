use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::versioned::{HistoryRecord, Versioned};
use crate::constants::{MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MAX_USERNAME_LENGTH};
use crate::error::AppError;

/// Category of service a tender asks for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "service_type"))]
pub enum ServiceType {
    Construction,
    Delivery,
    Manufacture,
}

impl Display for ServiceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ServiceType::Construction => write!(f, "Construction"),
            ServiceType::Delivery => write!(f, "Delivery"),
            ServiceType::Manufacture => write!(f, "Manufacture"),
        }
    }
}

impl FromStr for ServiceType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Construction" => Ok(ServiceType::Construction),
            "Delivery" => Ok(ServiceType::Delivery),
            "Manufacture" => Ok(ServiceType::Manufacture),
            _ => Err(AppError::InvalidArgument(format!(
                "Invalid service type: {}",
                s
            ))),
        }
    }
}

/// Tender lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "status"))]
pub enum TenderStatus {
    Created,
    Published,
    Closed,
}

impl Display for TenderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TenderStatus::Created => write!(f, "Created"),
            TenderStatus::Published => write!(f, "Published"),
            TenderStatus::Closed => write!(f, "Closed"),
        }
    }
}

impl FromStr for TenderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(TenderStatus::Created),
            "Published" => Ok(TenderStatus::Published),
            "Closed" => Ok(TenderStatus::Closed),
            _ => Err(AppError::InvalidArgument(format!(
                "Invalid tender status: {}",
                s
            ))),
        }
    }
}

/// Tender entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub status: TenderStatus,
    pub organization_id: Uuid,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

/// The mutable fields of a tender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenderContent {
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub status: TenderStatus,
}

/// Snapshot of a tender taken immediately before a mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TenderHistory {
    pub id: Uuid,
    pub tender_id: Uuid,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub status: TenderStatus,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

impl Tender {
    /// A freshly created tender: status `Created`, version 1.
    pub fn new(
        name: String,
        description: String,
        service_type: ServiceType,
        organization_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            service_type,
            status: TenderStatus::Created,
            organization_id,
            version: 1,
            created_at: Utc::now(),
        }
    }
}

impl Versioned for Tender {
    type Content = TenderContent;
    type History = TenderHistory;

    const KIND: &'static str = "tender";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn content(&self) -> TenderContent {
        TenderContent {
            name: self.name.clone(),
            description: self.description.clone(),
            service_type: self.service_type,
            status: self.status,
        }
    }

    fn snapshot(&self, history_id: Uuid, taken_at: DateTime<Utc>) -> TenderHistory {
        TenderHistory {
            id: history_id,
            tender_id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            service_type: self.service_type,
            status: self.status,
            version: self.version,
            created_at: taken_at,
        }
    }

    fn with_content(self, content: TenderContent, version: i32) -> Self {
        Self {
            name: content.name,
            description: content.description,
            service_type: content.service_type,
            status: content.status,
            version,
            ..self
        }
    }
}

impl HistoryRecord for TenderHistory {
    type Content = TenderContent;

    fn version(&self) -> i32 {
        self.version
    }

    fn content(&self) -> TenderContent {
        TenderContent {
            name: self.name.clone(),
            description: self.description.clone(),
            service_type: self.service_type,
            status: self.status,
        }
    }
}

/// Request DTO for creating a new tender
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenderRequest {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Tender name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = MAX_DESCRIPTION_LENGTH,
        message = "Tender description must be between 1 and 500 characters"
    ))]
    pub description: String,
    pub service_type: String,
    pub organization_id: Uuid,
    #[validate(length(min = 1, max = MAX_USERNAME_LENGTH, message = "Creator username is required"))]
    pub creator_username: String,
}

/// Partial update of a tender. Only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TenderPatch {
    #[serde(default)]
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Tender name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = MAX_DESCRIPTION_LENGTH,
        message = "Tender description must be between 1 and 500 characters"
    ))]
    pub description: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A [`TenderPatch`] whose enumerations have been parsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenderChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<ServiceType>,
    pub status: Option<TenderStatus>,
}

impl TenderPatch {
    /// Parse the enumerated fields, failing with `InvalidArgument` on unknown values.
    pub fn resolve(self) -> Result<TenderChanges, AppError> {
        Ok(TenderChanges {
            name: self.name,
            description: self.description,
            service_type: self
                .service_type
                .as_deref()
                .map(str::parse::<ServiceType>)
                .transpose()?,
            status: self
                .status
                .as_deref()
                .map(str::parse::<TenderStatus>)
                .transpose()?,
        })
    }
}

impl TenderChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.service_type.is_none()
            && self.status.is_none()
    }

    pub fn apply(&self, current: TenderContent) -> TenderContent {
        TenderContent {
            name: self.name.clone().unwrap_or(current.name),
            description: self.description.clone().unwrap_or(current.description),
            service_type: self.service_type.unwrap_or(current.service_type),
            status: self.status.unwrap_or(current.status),
        }
    }
}
