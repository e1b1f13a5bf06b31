// db/marketdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::BigDecimal, Error};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::marketmodel::*;
use crate::utils::decimal;

const JOB_COLUMNS: &str = r#"
    id, client_id, title, description, category, budget, deadline, status,
    application_ids, hired_freelancer_id, contract_id, created_at, updated_at
"#;

const APPLICATION_COLUMNS: &str = r#"
    id, job_id, freelancer_id, cover_letter, bid_amount, delivery_timeline, status, created_at
"#;

const CONTRACT_COLUMNS: &str = r#"
    id, job_id, client_id, freelancer_id, terms, start_date, end_date, status
"#;

const RATING_COLUMNS: &str = r#"
    id, job_id, from_user_id, to_user_id, rating, review, created_at
"#;

const DISPUTE_COLUMNS: &str = r#"
    id, job_id, raised_by, against, reason, status, resolution, admin_id, created_at, resolved_at
"#;

fn to_decimal(value: f64, field: &str) -> Result<BigDecimal, Error> {
    decimal::from_f64(value).ok_or_else(|| Error::Decode(format!("Invalid {}", field).into()))
}

#[async_trait]
pub trait MarketExt {
    //Job management
    async fn create_job(
        &self,
        client_id: Uuid,
        title: String,
        description: String,
        category: String,
        budget: f64,
        deadline: DateTime<Utc>,
    ) -> Result<Job, Error>;

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    async fn get_jobs(
        &self,
        category: Option<String>,
        max_budget: Option<f64>,
        status: Option<JobStatus>,
    ) -> Result<Vec<Job>, Error>;

    async fn get_client_jobs(&self, client_id: Uuid) -> Result<Vec<Job>, Error>;

    /// Applies the patch only while the job is still open.
    async fn update_open_job(
        &self,
        job_id: Uuid,
        title: Option<String>,
        description: Option<String>,
        category: Option<String>,
        budget: Option<f64>,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Option<Job>, Error>;

    async fn update_job_status(
        &self,
        job_id: Uuid,
        status: JobStatus,
    ) -> Result<Option<Job>, Error>;

    /// Compare-and-swap open -> in progress. `None` when the job was not open.
    async fn claim_open_job(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Option<Job>, Error>;

    /// Undo a claim that never got a contract attached.
    async fn release_job_claim(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Option<Job>, Error>;

    async fn attach_job_contract(
        &self,
        job_id: Uuid,
        contract_id: Uuid,
    ) -> Result<Job, Error>;

    async fn append_job_application(
        &self,
        job_id: Uuid,
        application_id: Uuid,
    ) -> Result<Job, Error>;

    //Applications
    async fn create_application(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
        cover_letter: String,
        bid_amount: f64,
        delivery_timeline: String,
    ) -> Result<Application, Error>;

    async fn get_application_by_id(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Application>, Error>;

    async fn get_application_for_freelancer(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Option<Application>, Error>;

    async fn get_job_applications(&self, job_id: Uuid) -> Result<Vec<Application>, Error>;

    /// Conditional status change; `None` when the application is not in `from`.
    async fn transition_application(
        &self,
        application_id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<Option<Application>, Error>;

    async fn reject_other_applications(
        &self,
        job_id: Uuid,
        accepted_id: Uuid,
    ) -> Result<u64, Error>;

    //Contracts
    async fn create_contract(
        &self,
        job_id: Uuid,
        client_id: Uuid,
        freelancer_id: Uuid,
        terms: String,
    ) -> Result<Contract, Error>;

    async fn get_contract_by_id(&self, contract_id: Uuid) -> Result<Option<Contract>, Error>;

    async fn get_active_contracts(
        &self,
        client_id: Option<Uuid>,
        freelancer_id: Option<Uuid>,
    ) -> Result<Vec<Contract>, Error>;

    /// Moves an active contract to `status` and stamps its end date.
    async fn close_contract(
        &self,
        contract_id: Uuid,
        status: ContractStatus,
    ) -> Result<Option<Contract>, Error>;

    //Ratings
    async fn create_rating(
        &self,
        job_id: Uuid,
        from_user_id: Uuid,
        to_user_id: Uuid,
        rating: i16,
        review: Option<String>,
    ) -> Result<Rating, Error>;

    async fn get_rating(
        &self,
        job_id: Uuid,
        from_user_id: Uuid,
        to_user_id: Uuid,
    ) -> Result<Option<Rating>, Error>;

    async fn get_user_ratings(&self, user_id: Uuid) -> Result<Vec<Rating>, Error>;

    //Disputes
    async fn create_dispute(
        &self,
        job_id: Uuid,
        raised_by: Uuid,
        against: Uuid,
        reason: String,
    ) -> Result<Dispute, Error>;

    async fn get_dispute_by_id(&self, dispute_id: Uuid) -> Result<Option<Dispute>, Error>;

    async fn get_disputes(&self) -> Result<Vec<Dispute>, Error>;

    /// Resolves an open dispute; `None` when it was already closed.
    async fn resolve_dispute(
        &self,
        dispute_id: Uuid,
        status: DisputeStatus,
        resolution: String,
        admin_id: Uuid,
    ) -> Result<Option<Dispute>, Error>;
}

#[async_trait]
impl MarketExt for DBClient {
    async fn create_job(
        &self,
        client_id: Uuid,
        title: String,
        description: String,
        category: String,
        budget: f64,
        deadline: DateTime<Utc>,
    ) -> Result<Job, Error> {
        let budget_bd = to_decimal(budget, "budget")?;

        sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (client_id, title, description, category, budget, deadline)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(client_id)
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(budget_bd)
        .bind(deadline)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS))
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_jobs(
        &self,
        category: Option<String>,
        max_budget: Option<f64>,
        status: Option<JobStatus>,
    ) -> Result<Vec<Job>, Error> {
        let max_budget_bd = match max_budget {
            Some(value) => Some(to_decimal(value, "budget filter")?),
            None => None,
        };

        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {}
            FROM jobs
            WHERE ($1::TEXT IS NULL OR category = $1)
              AND ($2::NUMERIC IS NULL OR budget <= $2)
              AND ($3::job_status IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#,
            JOB_COLUMNS
        ))
        .bind(category)
        .bind(max_budget_bd)
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_client_jobs(&self, client_id: Uuid) -> Result<Vec<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE client_id = $1 ORDER BY created_at DESC",
            JOB_COLUMNS
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_open_job(
        &self,
        job_id: Uuid,
        title: Option<String>,
        description: Option<String>,
        category: Option<String>,
        budget: Option<f64>,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Option<Job>, Error> {
        let budget_bd = match budget {
            Some(value) => Some(to_decimal(value, "budget")?),
            None => None,
        };

        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                budget = COALESCE($5, budget),
                deadline = COALESCE($6, deadline),
                updated_at = NOW()
            WHERE id = $1 AND status = 'open'::job_status
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(budget_bd)
        .bind(deadline)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_job_status(
        &self,
        job_id: Uuid,
        status: JobStatus,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    async fn claim_open_job(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'in_progress'::job_status,
                hired_freelancer_id = $2,
                updated_at = NOW()
            WHERE id = $1
              AND status = 'open'::job_status
              AND hired_freelancer_id IS NULL
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(freelancer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn release_job_claim(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Option<Job>, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET status = 'open'::job_status,
                hired_freelancer_id = NULL,
                updated_at = NOW()
            WHERE id = $1
              AND status = 'in_progress'::job_status
              AND hired_freelancer_id = $2
              AND contract_id IS NULL
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(freelancer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn attach_job_contract(
        &self,
        job_id: Uuid,
        contract_id: Uuid,
    ) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET contract_id = $2, updated_at = NOW()
            WHERE id = $1 AND contract_id IS NULL
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(contract_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn append_job_application(
        &self,
        job_id: Uuid,
        application_id: Uuid,
    ) -> Result<Job, Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET application_ids = array_append(application_ids, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(job_id)
        .bind(application_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_application(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
        cover_letter: String,
        bid_amount: f64,
        delivery_timeline: String,
    ) -> Result<Application, Error> {
        let bid_amount_bd = to_decimal(bid_amount, "bid amount")?;

        sqlx::query_as::<_, Application>(&format!(
            r#"
            INSERT INTO applications
            (job_id, freelancer_id, cover_letter, bid_amount, delivery_timeline)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(job_id)
        .bind(freelancer_id)
        .bind(cover_letter)
        .bind(bid_amount_bd)
        .bind(delivery_timeline)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_application_by_id(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Application>, Error> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE id = $1",
            APPLICATION_COLUMNS
        ))
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_application_for_freelancer(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Option<Application>, Error> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE job_id = $1 AND freelancer_id = $2",
            APPLICATION_COLUMNS
        ))
        .bind(job_id)
        .bind(freelancer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_job_applications(&self, job_id: Uuid) -> Result<Vec<Application>, Error> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            SELECT {}
            FROM applications
            WHERE job_id = $1
            ORDER BY created_at DESC
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn transition_application(
        &self,
        application_id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<Option<Application>, Error> {
        sqlx::query_as::<_, Application>(&format!(
            r#"
            UPDATE applications
            SET status = $3
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(application_id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
    }

    async fn reject_other_applications(
        &self,
        job_id: Uuid,
        accepted_id: Uuid,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = 'rejected'::application_status
            WHERE job_id = $1 AND id <> $2
            "#
        )
        .bind(job_id)
        .bind(accepted_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn create_contract(
        &self,
        job_id: Uuid,
        client_id: Uuid,
        freelancer_id: Uuid,
        terms: String,
    ) -> Result<Contract, Error> {
        sqlx::query_as::<_, Contract>(&format!(
            r#"
            INSERT INTO contracts (job_id, client_id, freelancer_id, terms)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            CONTRACT_COLUMNS
        ))
        .bind(job_id)
        .bind(client_id)
        .bind(freelancer_id)
        .bind(terms)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_contract_by_id(&self, contract_id: Uuid) -> Result<Option<Contract>, Error> {
        sqlx::query_as::<_, Contract>(&format!(
            "SELECT {} FROM contracts WHERE id = $1",
            CONTRACT_COLUMNS
        ))
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_active_contracts(
        &self,
        client_id: Option<Uuid>,
        freelancer_id: Option<Uuid>,
    ) -> Result<Vec<Contract>, Error> {
        sqlx::query_as::<_, Contract>(&format!(
            r#"
            SELECT {}
            FROM contracts
            WHERE status = 'active'::contract_status
              AND ($1::UUID IS NULL OR client_id = $1)
              AND ($2::UUID IS NULL OR freelancer_id = $2)
            ORDER BY start_date DESC
            "#,
            CONTRACT_COLUMNS
        ))
        .bind(client_id)
        .bind(freelancer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn close_contract(
        &self,
        contract_id: Uuid,
        status: ContractStatus,
    ) -> Result<Option<Contract>, Error> {
        sqlx::query_as::<_, Contract>(&format!(
            r#"
            UPDATE contracts
            SET status = $2, end_date = NOW()
            WHERE id = $1 AND status = 'active'::contract_status
            RETURNING {}
            "#,
            CONTRACT_COLUMNS
        ))
        .bind(contract_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_rating(
        &self,
        job_id: Uuid,
        from_user_id: Uuid,
        to_user_id: Uuid,
        rating: i16,
        review: Option<String>,
    ) -> Result<Rating, Error> {
        sqlx::query_as::<_, Rating>(&format!(
            r#"
            INSERT INTO ratings (job_id, from_user_id, to_user_id, rating, review)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            RATING_COLUMNS
        ))
        .bind(job_id)
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(rating)
        .bind(review)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_rating(
        &self,
        job_id: Uuid,
        from_user_id: Uuid,
        to_user_id: Uuid,
    ) -> Result<Option<Rating>, Error> {
        sqlx::query_as::<_, Rating>(&format!(
            r#"
            SELECT {}
            FROM ratings
            WHERE job_id = $1 AND from_user_id = $2 AND to_user_id = $3
            "#,
            RATING_COLUMNS
        ))
        .bind(job_id)
        .bind(from_user_id)
        .bind(to_user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_ratings(&self, user_id: Uuid) -> Result<Vec<Rating>, Error> {
        sqlx::query_as::<_, Rating>(&format!(
            r#"
            SELECT {}
            FROM ratings
            WHERE to_user_id = $1
            ORDER BY created_at DESC
            "#,
            RATING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_dispute(
        &self,
        job_id: Uuid,
        raised_by: Uuid,
        against: Uuid,
        reason: String,
    ) -> Result<Dispute, Error> {
        sqlx::query_as::<_, Dispute>(&format!(
            r#"
            INSERT INTO disputes (job_id, raised_by, against, reason)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            DISPUTE_COLUMNS
        ))
        .bind(job_id)
        .bind(raised_by)
        .bind(against)
        .bind(reason)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_dispute_by_id(&self, dispute_id: Uuid) -> Result<Option<Dispute>, Error> {
        sqlx::query_as::<_, Dispute>(&format!(
            "SELECT {} FROM disputes WHERE id = $1",
            DISPUTE_COLUMNS
        ))
        .bind(dispute_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_disputes(&self) -> Result<Vec<Dispute>, Error> {
        sqlx::query_as::<_, Dispute>(&format!(
            "SELECT {} FROM disputes ORDER BY created_at DESC",
            DISPUTE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn resolve_dispute(
        &self,
        dispute_id: Uuid,
        status: DisputeStatus,
        resolution: String,
        admin_id: Uuid,
    ) -> Result<Option<Dispute>, Error> {
        sqlx::query_as::<_, Dispute>(&format!(
            r#"
            UPDATE disputes
            SET status = $2, resolution = $3, admin_id = $4, resolved_at = NOW()
            WHERE id = $1 AND status = 'open'::dispute_status
            RETURNING {}
            "#,
            DISPUTE_COLUMNS
        ))
        .bind(dispute_id)
        .bind(status)
        .bind(resolution)
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await
    }
}
