// service/dispute_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::MarketStore,
    dtos::marketdtos::{CreateDisputeDto, ResolveDisputeDto},
    models::{marketmodel::*, usermodel::User},
    service::{
        access::{require_role, ADMIN_ONLY, PARTICIPANTS},
        error::ServiceError,
    },
};

#[derive(Debug, Clone)]
pub struct DisputeService {
    db_client: Arc<dyn MarketStore>,
}

impl DisputeService {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    pub async fn create_dispute(
        &self,
        raiser: &User,
        dispute_data: CreateDisputeDto,
    ) -> Result<Dispute, ServiceError> {
        require_role(raiser, PARTICIPANTS)?;

        let job_id = dispute_data.job_id;
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if !job.is_participant(raiser.id) {
            return Err(ServiceError::UnauthorizedJobAccess(raiser.id, job_id));
        }

        let against_user_id = dispute_data.against_user_id;
        if self
            .db_client
            .get_user(Some(against_user_id), None)
            .await?
            .is_none()
        {
            return Err(ServiceError::UserNotFound(against_user_id));
        }

        let dispute = self
            .db_client
            .create_dispute(
                job_id,
                raiser.id,
                dispute_data.against_user_id,
                dispute_data.reason,
            )
            .await?;

        tracing::info!(
            "Dispute {} raised on job {} by {} against {}",
            dispute.id,
            job_id,
            raiser.id,
            dispute.against
        );
        Ok(dispute)
    }

    pub async fn list_all_disputes(&self, admin: &User) -> Result<Vec<Dispute>, ServiceError> {
        require_role(admin, ADMIN_ONLY)?;

        let disputes = self.db_client.get_disputes().await?;
        Ok(disputes)
    }

    pub async fn resolve_dispute(
        &self,
        dispute_id: Uuid,
        admin: &User,
        resolution_data: ResolveDisputeDto,
    ) -> Result<Dispute, ServiceError> {
        require_role(admin, ADMIN_ONLY)?;

        let dispute = self
            .db_client
            .get_dispute_by_id(dispute_id)
            .await?
            .ok_or(ServiceError::DisputeNotFound(dispute_id))?;

        if dispute.status != DisputeStatus::Open {
            return Err(ServiceError::InvalidDisputeStatus(dispute_id, dispute.status));
        }
        if resolution_data.status == DisputeStatus::Open {
            return Err(ServiceError::Validation(
                "Dispute status must be resolved or rejected".to_string(),
            ));
        }

        let resolved = self
            .db_client
            .resolve_dispute(
                dispute_id,
                resolution_data.status,
                resolution_data.resolution,
                admin.id,
            )
            .await?
            .ok_or(ServiceError::InvalidDisputeStatus(dispute_id, dispute.status))?;

        tracing::info!(
            "Dispute {} marked '{}' by admin {}",
            dispute_id,
            resolved.status.to_str(),
            admin.id
        );
        Ok(resolved)
    }
}
