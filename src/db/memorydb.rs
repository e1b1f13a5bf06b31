//! In-memory store used by the service and router tests.
//!
//! Rows are kept in insertion order, so "newest first" is a reverse walk.
//! Conditional updates run under one lock, matching the row-level atomicity
//! of the Postgres statements in `marketdb`.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::{marketdb::MarketExt, userdb::UserExt};
use crate::models::{
    marketmodel::*,
    usermodel::{User, UserRole},
};
use crate::utils::decimal;

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
    contracts: Vec<Contract>,
    ratings: Vec<Rating>,
    disputes: Vec<Dispute>,
}

/// A write that fails once, the next time it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    ContractInsert,
    ApplicationRevert,
}

#[derive(Debug, Default)]
pub struct MemoryDB {
    tables: Mutex<Tables>,
    faults: Mutex<Vec<Fault>>,
}

impl MemoryDB {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&self, fault: Fault) {
        self.faults.lock().unwrap().push(fault);
    }

    fn take_fault(&self, fault: Fault) -> Result<(), Error> {
        let mut faults = self.faults.lock().unwrap();
        match faults.iter().position(|f| *f == fault) {
            Some(index) => {
                faults.remove(index);
                Err(Error::PoolClosed)
            }
            None => Ok(()),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.lock().unwrap();
        f(&mut tables)
    }
}

fn money(value: f64) -> Result<sqlx::types::BigDecimal, Error> {
    decimal::from_f64(value).ok_or_else(|| Error::Decode("Invalid amount".into()))
}

fn unique_violation() -> Error {
    Error::Protocol("duplicate key value violates unique constraint".into())
}

#[async_trait]
impl UserExt for MemoryDB {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, Error> {
        Ok(self.with(|t| {
            t.users
                .iter()
                .find(|u| match (user_id, email) {
                    (Some(id), _) => u.id == id,
                    (None, Some(email)) => u.email == email,
                    (None, None) => false,
                })
                .cloned()
        }))
    }

    async fn get_users(&self) -> Result<Vec<User>, Error> {
        Ok(self.with(|t| t.users.iter().rev().cloned().collect()))
    }

    async fn save_user(
        &self,
        name: String,
        email: String,
        password: String,
        role: UserRole,
        bio: Option<String>,
        skills: Vec<String>,
        company: Option<String>,
    ) -> Result<User, Error> {
        self.with(|t| {
            if t.users.iter().any(|u| u.email == email) {
                return Err(unique_violation());
            }
            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                name,
                email,
                password,
                role,
                bio,
                skills,
                company,
                rating: 0.0,
                ratings_count: 0,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            t.users.push(user.clone());
            Ok(user)
        })
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        name: Option<String>,
        bio: Option<String>,
        skills: Option<Vec<String>>,
        company: Option<String>,
    ) -> Result<User, Error> {
        self.with(|t| {
            let user = t
                .users
                .iter_mut()
                .find(|u| u.id == user_id)
                .ok_or(Error::RowNotFound)?;
            if let Some(name) = name {
                user.name = name;
            }
            if bio.is_some() {
                user.bio = bio;
            }
            if let Some(skills) = skills {
                user.skills = skills;
            }
            if company.is_some() {
                user.company = company;
            }
            user.updated_at = Utc::now();
            Ok(user.clone())
        })
    }

    async fn deactivate_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        Ok(self.with(|t| {
            t.users.iter_mut().find(|u| u.id == user_id).map(|user| {
                user.is_active = false;
                user.clone()
            })
        }))
    }

    async fn update_user_rating(
        &self,
        user_id: Uuid,
        rating: f64,
        ratings_count: i32,
    ) -> Result<(), Error> {
        self.with(|t| {
            if let Some(user) = t.users.iter_mut().find(|u| u.id == user_id) {
                user.rating = rating;
                user.ratings_count = ratings_count;
            }
        });
        Ok(())
    }
}

#[async_trait]
impl MarketExt for MemoryDB {
    async fn create_job(
        &self,
        client_id: Uuid,
        title: String,
        description: String,
        category: String,
        budget: f64,
        deadline: DateTime<Utc>,
    ) -> Result<Job, Error> {
        let budget = money(budget)?;
        Ok(self.with(|t| {
            let now = Utc::now();
            let job = Job {
                id: Uuid::new_v4(),
                client_id,
                title,
                description,
                category,
                budget,
                deadline,
                status: JobStatus::Open,
                application_ids: Vec::new(),
                hired_freelancer_id: None,
                contract_id: None,
                created_at: now,
                updated_at: now,
            };
            t.jobs.push(job.clone());
            job
        }))
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        Ok(self.with(|t| t.jobs.iter().find(|j| j.id == job_id).cloned()))
    }

    async fn get_jobs(
        &self,
        category: Option<String>,
        max_budget: Option<f64>,
        status: Option<JobStatus>,
    ) -> Result<Vec<Job>, Error> {
        let max_budget = match max_budget {
            Some(value) => Some(money(value)?),
            None => None,
        };
        Ok(self.with(|t| {
            t.jobs
                .iter()
                .rev()
                .filter(|j| category.as_ref().map_or(true, |c| &j.category == c))
                .filter(|j| max_budget.as_ref().map_or(true, |b| &j.budget <= b))
                .filter(|j| status.map_or(true, |s| j.status == s))
                .cloned()
                .collect()
        }))
    }

    async fn get_client_jobs(&self, client_id: Uuid) -> Result<Vec<Job>, Error> {
        Ok(self.with(|t| {
            t.jobs
                .iter()
                .rev()
                .filter(|j| j.client_id == client_id)
                .cloned()
                .collect()
        }))
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
        let budget = match budget {
            Some(value) => Some(money(value)?),
            None => None,
        };
        Ok(self.with(|t| {
            let job = t
                .jobs
                .iter_mut()
                .find(|j| j.id == job_id && j.status == JobStatus::Open)?;
            if let Some(title) = title {
                job.title = title;
            }
            if let Some(description) = description {
                job.description = description;
            }
            if let Some(category) = category {
                job.category = category;
            }
            if let Some(budget) = budget {
                job.budget = budget;
            }
            if let Some(deadline) = deadline {
                job.deadline = deadline;
            }
            job.updated_at = Utc::now();
            Some(job.clone())
        }))
    }

    async fn update_job_status(
        &self,
        job_id: Uuid,
        status: JobStatus,
    ) -> Result<Option<Job>, Error> {
        Ok(self.with(|t| {
            t.jobs.iter_mut().find(|j| j.id == job_id).map(|job| {
                job.status = status;
                job.updated_at = Utc::now();
                job.clone()
            })
        }))
    }

    async fn claim_open_job(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Option<Job>, Error> {
        Ok(self.with(|t| {
            let job = t.jobs.iter_mut().find(|j| {
                j.id == job_id && j.status == JobStatus::Open && j.hired_freelancer_id.is_none()
            })?;
            job.status = JobStatus::InProgress;
            job.hired_freelancer_id = Some(freelancer_id);
            job.updated_at = Utc::now();
            Some(job.clone())
        }))
    }

    async fn release_job_claim(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Option<Job>, Error> {
        Ok(self.with(|t| {
            let job = t.jobs.iter_mut().find(|j| {
                j.id == job_id
                    && j.status == JobStatus::InProgress
                    && j.hired_freelancer_id == Some(freelancer_id)
                    && j.contract_id.is_none()
            })?;
            job.status = JobStatus::Open;
            job.hired_freelancer_id = None;
            job.updated_at = Utc::now();
            Some(job.clone())
        }))
    }

    async fn attach_job_contract(
        &self,
        job_id: Uuid,
        contract_id: Uuid,
    ) -> Result<Job, Error> {
        self.with(|t| {
            let job = t
                .jobs
                .iter_mut()
                .find(|j| j.id == job_id && j.contract_id.is_none())
                .ok_or(Error::RowNotFound)?;
            job.contract_id = Some(contract_id);
            job.updated_at = Utc::now();
            Ok(job.clone())
        })
    }

    async fn append_job_application(
        &self,
        job_id: Uuid,
        application_id: Uuid,
    ) -> Result<Job, Error> {
        self.with(|t| {
            let job = t
                .jobs
                .iter_mut()
                .find(|j| j.id == job_id)
                .ok_or(Error::RowNotFound)?;
            job.application_ids.push(application_id);
            job.updated_at = Utc::now();
            Ok(job.clone())
        })
    }

    async fn create_application(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
        cover_letter: String,
        bid_amount: f64,
        delivery_timeline: String,
    ) -> Result<Application, Error> {
        let bid_amount = money(bid_amount)?;
        self.with(|t| {
            if t
                .applications
                .iter()
                .any(|a| a.job_id == job_id && a.freelancer_id == freelancer_id)
            {
                return Err(unique_violation());
            }
            let application = Application {
                id: Uuid::new_v4(),
                job_id,
                freelancer_id,
                cover_letter,
                bid_amount,
                delivery_timeline,
                status: ApplicationStatus::Pending,
                created_at: Utc::now(),
            };
            t.applications.push(application.clone());
            Ok(application)
        })
    }

    async fn get_application_by_id(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Application>, Error> {
        Ok(self.with(|t| t.applications.iter().find(|a| a.id == application_id).cloned()))
    }

    async fn get_application_for_freelancer(
        &self,
        job_id: Uuid,
        freelancer_id: Uuid,
    ) -> Result<Option<Application>, Error> {
        Ok(self.with(|t| {
            t.applications
                .iter()
                .find(|a| a.job_id == job_id && a.freelancer_id == freelancer_id)
                .cloned()
        }))
    }

    async fn get_job_applications(&self, job_id: Uuid) -> Result<Vec<Application>, Error> {
        Ok(self.with(|t| {
            t.applications
                .iter()
                .rev()
                .filter(|a| a.job_id == job_id)
                .cloned()
                .collect()
        }))
    }

    async fn transition_application(
        &self,
        application_id: Uuid,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Result<Option<Application>, Error> {
        if from == ApplicationStatus::Accepted {
            self.take_fault(Fault::ApplicationRevert)?;
        }
        Ok(self.with(|t| {
            let application = t
                .applications
                .iter_mut()
                .find(|a| a.id == application_id && a.status == from)?;
            application.status = to;
            Some(application.clone())
        }))
    }

    async fn reject_other_applications(
        &self,
        job_id: Uuid,
        accepted_id: Uuid,
    ) -> Result<u64, Error> {
        Ok(self.with(|t| {
            let mut rejected = 0;
            for application in t
                .applications
                .iter_mut()
                .filter(|a| a.job_id == job_id && a.id != accepted_id)
            {
                application.status = ApplicationStatus::Rejected;
                rejected += 1;
            }
            rejected
        }))
    }

    async fn create_contract(
        &self,
        job_id: Uuid,
        client_id: Uuid,
        freelancer_id: Uuid,
        terms: String,
    ) -> Result<Contract, Error> {
        self.take_fault(Fault::ContractInsert)?;
        self.with(|t| {
            if t.contracts.iter().any(|c| c.job_id == job_id) {
                return Err(unique_violation());
            }
            let contract = Contract {
                id: Uuid::new_v4(),
                job_id,
                client_id,
                freelancer_id,
                terms,
                start_date: Utc::now(),
                end_date: None,
                status: ContractStatus::Active,
            };
            t.contracts.push(contract.clone());
            Ok(contract)
        })
    }

    async fn get_contract_by_id(&self, contract_id: Uuid) -> Result<Option<Contract>, Error> {
        Ok(self.with(|t| t.contracts.iter().find(|c| c.id == contract_id).cloned()))
    }

    async fn get_active_contracts(
        &self,
        client_id: Option<Uuid>,
        freelancer_id: Option<Uuid>,
    ) -> Result<Vec<Contract>, Error> {
        Ok(self.with(|t| {
            t.contracts
                .iter()
                .rev()
                .filter(|c| c.status == ContractStatus::Active)
                .filter(|c| client_id.map_or(true, |id| c.client_id == id))
                .filter(|c| freelancer_id.map_or(true, |id| c.freelancer_id == id))
                .cloned()
                .collect()
        }))
    }

    async fn close_contract(
        &self,
        contract_id: Uuid,
        status: ContractStatus,
    ) -> Result<Option<Contract>, Error> {
        Ok(self.with(|t| {
            let contract = t
                .contracts
                .iter_mut()
                .find(|c| c.id == contract_id && c.status == ContractStatus::Active)?;
            contract.status = status;
            contract.end_date = Some(Utc::now());
            Some(contract.clone())
        }))
    }

    async fn create_rating(
        &self,
        job_id: Uuid,
        from_user_id: Uuid,
        to_user_id: Uuid,
        rating: i16,
        review: Option<String>,
    ) -> Result<Rating, Error> {
        self.with(|t| {
            if t.ratings.iter().any(|r| {
                r.job_id == job_id && r.from_user_id == from_user_id && r.to_user_id == to_user_id
            }) {
                return Err(unique_violation());
            }
            let rating = Rating {
                id: Uuid::new_v4(),
                job_id,
                from_user_id,
                to_user_id,
                rating,
                review,
                created_at: Utc::now(),
            };
            t.ratings.push(rating.clone());
            Ok(rating)
        })
    }

    async fn get_rating(
        &self,
        job_id: Uuid,
        from_user_id: Uuid,
        to_user_id: Uuid,
    ) -> Result<Option<Rating>, Error> {
        Ok(self.with(|t| {
            t.ratings
                .iter()
                .find(|r| {
                    r.job_id == job_id
                        && r.from_user_id == from_user_id
                        && r.to_user_id == to_user_id
                })
                .cloned()
        }))
    }

    async fn get_user_ratings(&self, user_id: Uuid) -> Result<Vec<Rating>, Error> {
        Ok(self.with(|t| {
            t.ratings
                .iter()
                .rev()
                .filter(|r| r.to_user_id == user_id)
                .cloned()
                .collect()
        }))
    }

    async fn create_dispute(
        &self,
        job_id: Uuid,
        raised_by: Uuid,
        against: Uuid,
        reason: String,
    ) -> Result<Dispute, Error> {
        Ok(self.with(|t| {
            let dispute = Dispute {
                id: Uuid::new_v4(),
                job_id,
                raised_by,
                against,
                reason,
                status: DisputeStatus::Open,
                resolution: None,
                admin_id: None,
                created_at: Utc::now(),
                resolved_at: None,
            };
            t.disputes.push(dispute.clone());
            dispute
        }))
    }

    async fn get_dispute_by_id(&self, dispute_id: Uuid) -> Result<Option<Dispute>, Error> {
        Ok(self.with(|t| t.disputes.iter().find(|d| d.id == dispute_id).cloned()))
    }

    async fn get_disputes(&self) -> Result<Vec<Dispute>, Error> {
        Ok(self.with(|t| t.disputes.iter().rev().cloned().collect()))
    }

    async fn resolve_dispute(
        &self,
        dispute_id: Uuid,
        status: DisputeStatus,
        resolution: String,
        admin_id: Uuid,
    ) -> Result<Option<Dispute>, Error> {
        Ok(self.with(|t| {
            let dispute = t
                .disputes
                .iter_mut()
                .find(|d| d.id == dispute_id && d.status == DisputeStatus::Open)?;
            dispute.status = status;
            dispute.resolution = Some(resolution);
            dispute.admin_id = Some(admin_id);
            dispute.resolved_at = Some(Utc::now());
            Some(dispute.clone())
        }))
    }
}
