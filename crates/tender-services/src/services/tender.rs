use std::sync::Arc;

use tender_core::models::{
    CreateTenderRequest, ServiceType, Tender, TenderContent, TenderPatch, TenderStatus, User,
    Versioned,
};
use tender_core::{AppError, PageParams, Pagination, TransitionPolicy};
use tender_db::{rollback, IdentityStore, TenderStore};
use uuid::Uuid;
use validator::Validate;

use super::authz::{AuthorizationEvaluator, Target};

/// Tender lifecycle: creation, status changes, edits, rollback and listings
#[derive(Clone)]
pub struct TenderService {
    identity: Arc<dyn IdentityStore>,
    tenders: Arc<dyn TenderStore>,
    authz: AuthorizationEvaluator,
    pagination: Pagination,
    policy: TransitionPolicy,
}

impl TenderService {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        tenders: Arc<dyn TenderStore>,
        pagination: Pagination,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            authz: AuthorizationEvaluator::new(identity.clone()),
            identity,
            tenders,
            pagination,
            policy,
        }
    }

    /// Create a tender for an organization the creator is responsible for.
    #[tracing::instrument(skip(self, request), fields(organization_id = %request.organization_id))]
    pub async fn create(&self, request: CreateTenderRequest) -> Result<Tender, AppError> {
        request.validate()?;

        let user = self.authz.resolve_user(&request.creator_username).await?;
        self.identity
            .find_organization(request.organization_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Organization {} not found", request.organization_id))
            })?;
        self.authz
            .ensure_responsible(&user, request.organization_id)
            .await?;
        let service_type: ServiceType = request.service_type.parse()?;

        let tender = Tender::new(
            request.name,
            request.description,
            service_type,
            request.organization_id,
        );
        let created = self.tenders.insert_tender(&tender).await?;

        tracing::info!(tender_id = %created.id, user_id = %user.id, "Tender created");
        Ok(created)
    }

    /// Published tenders, optionally restricted to some service types. No authentication.
    #[tracing::instrument(skip(self))]
    pub async fn list_published(
        &self,
        service_types: &[String],
        params: PageParams,
    ) -> Result<Vec<Tender>, AppError> {
        let page = self.pagination.resolve(params)?;
        let filter = service_types
            .iter()
            .map(|s| s.parse::<ServiceType>())
            .collect::<Result<Vec<_>, _>>()?;

        self.tenders.list_published(&filter, page).await
    }

    /// Tenders of every organization the user is responsible for.
    #[tracing::instrument(skip(self))]
    pub async fn list_mine(
        &self,
        username: &str,
        params: PageParams,
    ) -> Result<Vec<Tender>, AppError> {
        let page = self.pagination.resolve(params)?;
        let user = self.authz.resolve_user(username).await?;

        self.tenders.list_for_member(user.id, page).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_status(
        &self,
        username: &str,
        tender_id: Uuid,
    ) -> Result<TenderStatus, AppError> {
        let (_, tender) = self.load_for_actor(username, tender_id).await?;
        Ok(tender.status)
    }

    /// Set any status of the tender enumeration. Subject to the transition policy.
    #[tracing::instrument(skip(self))]
    pub async fn set_status(
        &self,
        username: &str,
        tender_id: Uuid,
        status: &str,
    ) -> Result<Tender, AppError> {
        let (user, tender) = self.load_for_actor(username, tender_id).await?;
        let status: TenderStatus = status.parse()?;
        let policy = self.policy;

        let updated = self
            .tenders
            .apply_versioned_update(
                tender.id,
                Box::new(move |current: &Tender| -> Result<TenderContent, AppError> {
                    policy.check_tender(current.status, status)?;
                    Ok(TenderContent {
                        status,
                        ..current.content()
                    })
                }),
            )
            .await?;

        tracing::info!(
            tender_id = %updated.id,
            user_id = %user.id,
            status = %updated.status,
            version = updated.version,
            "Tender status updated"
        );
        Ok(updated)
    }

    /// Partial update. A patch without fields returns the tender unchanged.
    #[tracing::instrument(skip(self, patch))]
    pub async fn edit(
        &self,
        username: &str,
        tender_id: Uuid,
        patch: TenderPatch,
    ) -> Result<Tender, AppError> {
        let (user, tender) = self.load_for_actor(username, tender_id).await?;
        patch.validate()?;
        let changes = patch.resolve()?;
        if changes.is_empty() {
            return Ok(tender);
        }
        let policy = self.policy;

        let updated = self
            .tenders
            .apply_versioned_update(
                tender.id,
                Box::new(move |current: &Tender| -> Result<TenderContent, AppError> {
                    if let Some(status) = changes.status {
                        policy.check_tender(current.status, status)?;
                    }
                    Ok(changes.apply(current.content()))
                }),
            )
            .await?;

        tracing::info!(
            tender_id = %updated.id,
            user_id = %user.id,
            version = updated.version,
            "Tender edited"
        );
        Ok(updated)
    }

    /// Restore the content of an earlier version as a new version.
    #[tracing::instrument(skip(self))]
    pub async fn rollback(
        &self,
        username: &str,
        tender_id: Uuid,
        version: i32,
    ) -> Result<Tender, AppError> {
        let (user, tender) = self.load_for_actor(username, tender_id).await?;
        if version < 1 {
            return Err(AppError::InvalidArgument(
                "Version must be at least 1".to_string(),
            ));
        }

        let restored = rollback::<Tender, dyn TenderStore>(self.tenders.as_ref(), tender.id, version)
            .await?;

        tracing::info!(
            tender_id = %restored.id,
            user_id = %user.id,
            from_version = version,
            version = restored.version,
            "Tender rolled back"
        );
        Ok(restored)
    }

    /// Close the tender after a reached quorum. Already closed tenders are returned
    /// as they are, without a new version.
    pub(crate) async fn close(&self, tender_id: Uuid) -> Result<Tender, AppError> {
        let tender = self.find(tender_id).await?;
        if tender.status == TenderStatus::Closed {
            tracing::debug!(%tender_id, "Tender already closed");
            return Ok(tender);
        }

        let closed = self
            .tenders
            .apply_versioned_update(
                tender_id,
                Box::new(|current: &Tender| -> Result<TenderContent, AppError> {
                    Ok(TenderContent {
                        status: TenderStatus::Closed,
                        ..current.content()
                    })
                }),
            )
            .await?;

        tracing::info!(%tender_id, version = closed.version, "Tender closed by quorum");
        Ok(closed)
    }

    pub(crate) async fn find(&self, tender_id: Uuid) -> Result<Tender, AppError> {
        self.tenders
            .find(tender_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tender {} not found", tender_id)))
    }

    async fn load_for_actor(
        &self,
        username: &str,
        tender_id: Uuid,
    ) -> Result<(User, Tender), AppError> {
        let user = self.authz.resolve_user(username).await?;
        let tender = self.find(tender_id).await?;
        self.authz.ensure(&user, Target::Tender(&tender)).await?;
        Ok((user, tender))
    }
}
