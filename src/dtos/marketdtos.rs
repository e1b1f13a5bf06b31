use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{marketmodel::*, usermodel::User};

fn validate_future_deadline(deadline: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *deadline <= Utc::now() {
        let mut error = ValidationError::new("deadline_in_past");
        error.message = Some("Deadline must be a future date".into());
        return Err(error);
    }
    Ok(())
}

//Job DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobDto {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 5000, message = "Description must be between 1 and 5000 characters"))]
    pub description: String,

    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,

    #[validate(range(min = 0.01, max = 999_999_999_999.99, message = "Budget must be between 0.01 and 999999999999.99"))]
    pub budget: f64,

    #[validate(custom = "validate_future_deadline")]
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobDto {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "Description must be between 1 and 5000 characters"))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Category cannot be empty"))]
    pub category: Option<String>,

    #[validate(range(min = 0.01, max = 999_999_999_999.99, message = "Budget must be between 0.01 and 999999999999.99"))]
    pub budget: Option<f64>,

    #[validate(custom = "validate_future_deadline")]
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerateJobDto {
    pub status: JobStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobQueryDto {
    pub category: Option<String>,
    // Upper bound on budget
    pub budget: Option<f64>,
    pub status: Option<JobStatus>,
}

//Application DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationDto {
    #[validate(length(min = 1, max = 5000, message = "Cover letter is required"))]
    pub cover_letter: String,

    #[validate(range(min = 0.01, max = 999_999_999_999.99, message = "Bid amount must be between 0.01 and 999999999999.99"))]
    pub bid_amount: f64,

    #[validate(length(min = 1, max = 255, message = "Delivery timeline is required"))]
    pub delivery_timeline: String,
}

//Rating DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingDto {
    pub job_id: Uuid,

    pub to_user_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,

    #[validate(length(max = 2000, message = "Review must not exceed 2000 characters"))]
    pub review: Option<String>,
}

//Dispute DTOs
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDisputeDto {
    pub job_id: Uuid,

    pub against_user_id: Uuid,

    #[validate(length(min = 1, max = 5000, message = "Reason is required"))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResolveDisputeDto {
    #[validate(length(min = 1, max = 5000, message = "Resolution is required"))]
    pub resolution: String,

    pub status: DisputeStatus,
}

//Response DTOs
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

/// Public face of a user embedded in other resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    pub company: Option<String>,
    pub rating: f64,
    pub ratings_count: i32,
}

impl UserSummaryDto {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            skills: user.skills.clone(),
            company: user.company.clone(),
            rating: user.rating,
            ratings_count: user.ratings_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponseDto {
    #[serde(flatten)]
    pub application: Application,
    pub freelancer: Option<UserSummaryDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetailDto {
    #[serde(flatten)]
    pub job: Job,
    pub client: Option<UserSummaryDto>,
    pub applications: Vec<Application>,
    pub hired_freelancer: Option<UserSummaryDto>,
}

#[derive(Debug, Serialize)]
pub struct AcceptedApplicationDto {
    pub application: Application,
    pub job: Job,
    pub contract: Contract,
}
