use std::sync::Arc;

use tender_core::models::{AuthorType, Bid, Tender, User};
use tender_core::AppError;
use tender_db::IdentityStore;
use uuid::Uuid;

/// What a user wants to act on
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Tender(&'a Tender),
    Bid(&'a Bid),
}

/// Decides whether a user may act on a tender or bid, and resolves acting users.
#[derive(Clone)]
pub struct AuthorizationEvaluator {
    identity: Arc<dyn IdentityStore>,
}

impl AuthorizationEvaluator {
    pub fn new(identity: Arc<dyn IdentityStore>) -> Self {
        Self { identity }
    }

    /// Acting user by username, `Unauthenticated` when unknown.
    pub async fn resolve_user(&self, username: &str) -> Result<User, AppError> {
        self.identity
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::Unauthenticated(format!("User {} does not exist", username)))
    }

    /// Acting user by id, `Unauthenticated` when unknown.
    pub async fn resolve_user_by_id(&self, id: Uuid) -> Result<User, AppError> {
        self.identity
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated(format!("User {} does not exist", id)))
    }

    /// Rules:
    ///
    /// - tender: the user is responsible for the owning organization
    /// - user-authored bid: the user is the author
    /// - organization-authored bid: the user is the literal author id, or shares
    ///   an organization with it
    pub async fn can_act(&self, user: &User, target: Target<'_>) -> Result<bool, AppError> {
        match target {
            Target::Tender(tender) => {
                self.identity
                    .is_responsible(user.id, tender.organization_id)
                    .await
            }
            Target::Bid(bid) => {
                if user.id == bid.author_id {
                    return Ok(true);
                }
                match bid.author_type {
                    AuthorType::User => Ok(false),
                    AuthorType::Organization => {
                        self.identity
                            .shares_organization(user.id, bid.author_id)
                            .await
                    }
                }
            }
        }
    }

    /// [`Self::can_act`], mapping a denial to `Forbidden`.
    pub async fn ensure(&self, user: &User, target: Target<'_>) -> Result<(), AppError> {
        if self.can_act(user, target).await? {
            return Ok(());
        }
        tracing::warn!(user_id = %user.id, ?target, "Authorization denied");
        Err(AppError::Forbidden(
            "User is not allowed to act on this resource".to_string(),
        ))
    }

    /// Require the user to be a responsible member of the organization.
    pub async fn ensure_responsible(
        &self,
        user: &User,
        organization_id: Uuid,
    ) -> Result<(), AppError> {
        if self.identity.is_responsible(user.id, organization_id).await? {
            return Ok(());
        }
        tracing::warn!(user_id = %user.id, %organization_id, "User is not responsible for organization");
        Err(AppError::Forbidden(
            "User is not responsible for the organization".to_string(),
        ))
    }
}
