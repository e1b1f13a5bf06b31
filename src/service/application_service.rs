// service/application_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::MarketStore,
    dtos::marketdtos::*,
    models::{marketmodel::*, usermodel::User},
    service::{
        access::{require_role, CLIENT_ONLY, FREELANCER_ONLY},
        error::{is_unique_violation, ServiceError},
        user_summary,
    },
    utils::decimal::{format_amount, is_storable_amount},
};

#[derive(Debug, Clone)]
pub struct ApplicationService {
    db_client: Arc<dyn MarketStore>,
}

impl ApplicationService {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    pub async fn submit_application(
        &self,
        job_id: Uuid,
        freelancer: &User,
        application_data: CreateApplicationDto,
    ) -> Result<Application, ServiceError> {
        require_role(freelancer, FREELANCER_ONLY)?;

        if !is_storable_amount(application_data.bid_amount) {
            return Err(ServiceError::Validation(
                "Bid amount must be between 0.01 and 999999999999.99".to_string(),
            ));
        }

        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotAvailable(job_id))?;
        if job.status != JobStatus::Open {
            return Err(ServiceError::JobNotAvailable(job_id));
        }

        if self
            .db_client
            .get_application_for_freelancer(job_id, freelancer.id)
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicateApplication(job_id, freelancer.id));
        }

        let application = self
            .db_client
            .create_application(
                job_id,
                freelancer.id,
                application_data.cover_letter,
                application_data.bid_amount,
                application_data.delivery_timeline,
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    ServiceError::DuplicateApplication(job_id, freelancer.id)
                } else {
                    ServiceError::Database(e)
                }
            })?;

        self.db_client
            .append_job_application(job_id, application.id)
            .await?;

        tracing::info!(
            "Freelancer {} applied to job {} with application {}",
            freelancer.id,
            job_id,
            application.id
        );
        Ok(application)
    }

    pub async fn list_applications_for_job(
        &self,
        job_id: Uuid,
        client: &User,
    ) -> Result<Vec<ApplicationResponseDto>, ServiceError> {
        require_role(client, CLIENT_ONLY)?;

        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;
        if job.client_id != client.id {
            return Err(ServiceError::UnauthorizedJobAccess(client.id, job_id));
        }

        let applications = self.db_client.get_job_applications(job_id).await?;
        let mut responses = Vec::with_capacity(applications.len());
        for application in applications {
            let freelancer =
                user_summary(self.db_client.as_ref(), application.freelancer_id).await?;
            responses.push(ApplicationResponseDto {
                application,
                freelancer,
            });
        }

        Ok(responses)
    }

    /// Accepts a pending application and opens the contract for it.
    ///
    /// The open -> in progress swap on the job row is the gate: of two
    /// concurrent accepts on the same job exactly one wins, the other gets a
    /// conflict and changes nothing.
    pub async fn accept_application(
        &self,
        application_id: Uuid,
        client: &User,
    ) -> Result<AcceptedApplicationDto, ServiceError> {
        require_role(client, CLIENT_ONLY)?;

        let (application, job) = self.pending_for_owner(application_id, client).await?;

        let claimed = self
            .db_client
            .claim_open_job(job.id, application.freelancer_id)
            .await?;
        if claimed.is_none() {
            let current = self
                .db_client
                .get_job_by_id(job.id)
                .await?
                .ok_or(ServiceError::JobNotFound(job.id))?;
            tracing::warn!(
                "Accept of application {} lost the race for job {}",
                application_id,
                job.id
            );
            return Err(ServiceError::InvalidJobStatus(job.id, current.status));
        }

        let accepted = match self
            .db_client
            .transition_application(
                application_id,
                ApplicationStatus::Pending,
                ApplicationStatus::Accepted,
            )
            .await
        {
            Ok(Some(accepted)) => accepted,
            Ok(None) => {
                self.release_claim(job.id, application.freelancer_id).await;
                let status = self
                    .db_client
                    .get_application_by_id(application_id)
                    .await?
                    .map(|a| a.status)
                    .unwrap_or(ApplicationStatus::Withdrawn);
                return Err(ServiceError::InvalidApplicationStatus(application_id, status));
            }
            Err(e) => {
                self.release_claim(job.id, application.freelancer_id).await;
                return Err(e.into());
            }
        };

        let terms = format!(
            "Job: {}\nBid Amount: ${}\nDelivery Timeline: {}",
            job.title,
            format_amount(&accepted.bid_amount),
            accepted.delivery_timeline
        );

        let contract = match self
            .db_client
            .create_contract(job.id, client.id, accepted.freelancer_id, terms)
            .await
        {
            Ok(contract) => contract,
            Err(e) => {
                tracing::error!("Failed to create contract for job {}: {}", job.id, e);
                // The claim may only be released once no accepted application remains
                match self
                    .db_client
                    .transition_application(
                        application_id,
                        ApplicationStatus::Accepted,
                        ApplicationStatus::Pending,
                    )
                    .await
                {
                    Ok(Some(_)) => self.release_claim(job.id, accepted.freelancer_id).await,
                    Ok(None) => tracing::error!(
                        "Application {} was no longer accepted, job {} stays claimed",
                        application_id,
                        job.id
                    ),
                    Err(revert_err) => tracing::error!(
                        "Failed to revert application {}, job {} stays claimed: {}",
                        application_id,
                        job.id,
                        revert_err
                    ),
                }
                return Err(e.into());
            }
        };

        let job = self.db_client.attach_job_contract(job.id, contract.id).await?;
        let rejected = self
            .db_client
            .reject_other_applications(job.id, application_id)
            .await?;

        tracing::info!(
            "Application {} accepted for job {}: contract {} created, {} other application(s) rejected",
            application_id,
            job.id,
            contract.id,
            rejected
        );

        Ok(AcceptedApplicationDto {
            application: accepted,
            job,
            contract,
        })
    }

    pub async fn reject_application(
        &self,
        application_id: Uuid,
        client: &User,
    ) -> Result<Application, ServiceError> {
        require_role(client, CLIENT_ONLY)?;

        let (application, _) = self.pending_for_owner(application_id, client).await?;

        let rejected = self
            .db_client
            .transition_application(
                application_id,
                ApplicationStatus::Pending,
                ApplicationStatus::Rejected,
            )
            .await?
            .ok_or(ServiceError::InvalidApplicationStatus(
                application_id,
                application.status,
            ))?;

        tracing::info!("Application {} rejected by client {}", application_id, client.id);
        Ok(rejected)
    }

    pub async fn withdraw_application(
        &self,
        application_id: Uuid,
        freelancer: &User,
    ) -> Result<Application, ServiceError> {
        require_role(freelancer, FREELANCER_ONLY)?;

        let application = self
            .db_client
            .get_application_by_id(application_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(application_id))?;

        if application.freelancer_id != freelancer.id {
            return Err(ServiceError::UnauthorizedApplicationAccess(
                freelancer.id,
                application_id,
            ));
        }
        if application.status.is_terminal() {
            return Err(ServiceError::InvalidApplicationStatus(
                application_id,
                application.status,
            ));
        }

        let withdrawn = self
            .db_client
            .transition_application(
                application_id,
                ApplicationStatus::Pending,
                ApplicationStatus::Withdrawn,
            )
            .await?
            .ok_or(ServiceError::InvalidApplicationStatus(
                application_id,
                application.status,
            ))?;

        tracing::info!("Application {} withdrawn by freelancer {}", application_id, freelancer.id);
        Ok(withdrawn)
    }

    async fn pending_for_owner(
        &self,
        application_id: Uuid,
        client: &User,
    ) -> Result<(Application, Job), ServiceError> {
        let application = self
            .db_client
            .get_application_by_id(application_id)
            .await?
            .ok_or(ServiceError::ApplicationNotFound(application_id))?;

        let job = self
            .db_client
            .get_job_by_id(application.job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(application.job_id))?;

        if job.client_id != client.id {
            return Err(ServiceError::UnauthorizedApplicationAccess(
                client.id,
                application_id,
            ));
        }
        if application.status.is_terminal() {
            return Err(ServiceError::InvalidApplicationStatus(
                application_id,
                application.status,
            ));
        }

        Ok((application, job))
    }

    async fn release_claim(&self, job_id: Uuid, freelancer_id: Uuid) {
        if let Err(e) = self.db_client.release_job_claim(job_id, freelancer_id).await {
            tracing::error!("Failed to release claim on job {}: {}", job_id, e);
        }
    }
}
