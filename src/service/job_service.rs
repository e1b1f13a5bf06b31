// service/job_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::MarketStore,
    dtos::marketdtos::*,
    models::{marketmodel::*, usermodel::User},
    service::{
        access::{require_role, ADMIN_ONLY, BROWSERS, CLIENT_ONLY},
        error::ServiceError,
        user_summary,
    },
    utils::decimal,
};

const BUDGET_RANGE: &str = "Budget must be between 0.01 and 999999999999.99";

#[derive(Debug, Clone)]
pub struct JobService {
    db_client: Arc<dyn MarketStore>,
}

impl JobService {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    pub async fn create_job(
        &self,
        client: &User,
        job_data: CreateJobDto,
    ) -> Result<Job, ServiceError> {
        require_role(client, CLIENT_ONLY)?;

        if !decimal::is_storable_amount(job_data.budget) {
            return Err(ServiceError::Validation(BUDGET_RANGE.to_string()));
        }

        let job = self
            .db_client
            .create_job(
                client.id,
                job_data.title,
                job_data.description,
                job_data.category,
                job_data.budget,
                job_data.deadline,
            )
            .await?;

        tracing::info!("Job {} posted by client {}", job.id, client.id);
        Ok(job)
    }

    /// Owner-only edit, allowed while the job is still open.
    pub async fn update_job(
        &self,
        job_id: Uuid,
        client: &User,
        patch: UpdateJobDto,
    ) -> Result<Job, ServiceError> {
        require_role(client, CLIENT_ONLY)?;

        let job = self.owned_job(job_id, client.id).await?;
        if job.status != JobStatus::Open {
            return Err(ServiceError::InvalidJobStatus(job_id, job.status));
        }

        if matches!(patch.budget, Some(budget) if !decimal::is_storable_amount(budget)) {
            return Err(ServiceError::Validation(BUDGET_RANGE.to_string()));
        }

        let updated = self
            .db_client
            .update_open_job(
                job_id,
                patch.title,
                patch.description,
                patch.category,
                patch.budget,
                patch.deadline,
            )
            .await?;

        // Lost a race with acceptance or closure between the read and the write
        match updated {
            Some(job) => Ok(job),
            None => {
                let current = self
                    .db_client
                    .get_job_by_id(job_id)
                    .await?
                    .ok_or(ServiceError::JobNotFound(job_id))?;
                Err(ServiceError::InvalidJobStatus(job_id, current.status))
            }
        }
    }

    /// Cancels the job regardless of its current status. An attached contract
    /// is left as it is.
    pub async fn close_job(&self, job_id: Uuid, client: &User) -> Result<Job, ServiceError> {
        require_role(client, CLIENT_ONLY)?;

        let job = self.owned_job(job_id, client.id).await?;
        if let Some(contract_id) = job.contract_id {
            tracing::warn!(
                "Closing job {} while it still references contract {}",
                job_id,
                contract_id
            );
        }

        let job = self
            .db_client
            .update_job_status(job_id, JobStatus::Cancelled)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        tracing::info!("Job {} closed by client {}", job_id, client.id);
        Ok(job)
    }

    pub async fn moderate_job(
        &self,
        job_id: Uuid,
        admin: &User,
        status: JobStatus,
    ) -> Result<Job, ServiceError> {
        require_role(admin, ADMIN_ONLY)?;

        let job = self
            .db_client
            .update_job_status(job_id, status)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        tracing::info!(
            "Job {} moderated to '{}' by admin {}",
            job_id,
            status.to_str(),
            admin.id
        );
        Ok(job)
    }

    pub async fn list_jobs(
        &self,
        principal: &User,
        query: JobQueryDto,
    ) -> Result<Vec<Job>, ServiceError> {
        require_role(principal, BROWSERS)?;

        let jobs = self
            .db_client
            .get_jobs(query.category, query.budget, query.status)
            .await?;
        Ok(jobs)
    }

    pub async fn get_job(&self, job_id: Uuid) -> Result<JobDetailDto, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        let client = user_summary(self.db_client.as_ref(), job.client_id).await?;
        let hired_freelancer = match job.hired_freelancer_id {
            Some(freelancer_id) => user_summary(self.db_client.as_ref(), freelancer_id).await?,
            None => None,
        };
        let applications = self.db_client.get_job_applications(job_id).await?;

        Ok(JobDetailDto {
            job,
            client,
            applications,
            hired_freelancer,
        })
    }

    pub async fn list_client_jobs(&self, client: &User) -> Result<Vec<Job>, ServiceError> {
        require_role(client, CLIENT_ONLY)?;

        let jobs = self.db_client.get_client_jobs(client.id).await?;
        Ok(jobs)
    }

    async fn owned_job(&self, job_id: Uuid, client_id: Uuid) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.client_id != client_id {
            return Err(ServiceError::UnauthorizedJobAccess(client_id, job_id));
        }
        Ok(job)
    }
}
