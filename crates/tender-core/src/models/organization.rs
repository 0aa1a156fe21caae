use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Legal form of an organization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "organization_type"))]
pub enum OrganizationType {
    #[serde(rename = "IE")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "IE"))]
    Ie,
    #[serde(rename = "LLC")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "LLC"))]
    Llc,
    #[serde(rename = "JSC")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "JSC"))]
    Jsc,
}

impl Display for OrganizationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OrganizationType::Ie => write!(f, "IE"),
            OrganizationType::Llc => write!(f, "LLC"),
            OrganizationType::Jsc => write!(f, "JSC"),
        }
    }
}

impl FromStr for OrganizationType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IE" => Ok(OrganizationType::Ie),
            "LLC" => Ok(OrganizationType::Llc),
            "JSC" => Ok(OrganizationType::Jsc),
            _ => Err(AppError::InvalidArgument(format!(
                "Invalid organization type: {}",
                s
            ))),
        }
    }
}

/// Organization entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub organization_type: Option<OrganizationType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(name: impl Into<String>, organization_type: OrganizationType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            organization_type: Some(organization_type),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A user being responsible for (a member of) an organization. This relation is
/// the only authorization primitive for organization-scoped actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Membership {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
}

impl Membership {
    pub fn new(organization_id: Uuid, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_type_round_trips_through_text() {
        for kind in [OrganizationType::Ie, OrganizationType::Llc, OrganizationType::Jsc] {
            assert_eq!(kind.to_string().parse::<OrganizationType>().unwrap(), kind);
        }
        assert!("GmbH".parse::<OrganizationType>().is_err());
    }
}
