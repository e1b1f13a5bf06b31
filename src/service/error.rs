use thiserror::Error;
use uuid::Uuid;
use crate::{
    models::{marketmodel::*, usermodel::UserRole},
    error::HttpError,
};
use axum::http::StatusCode;

/// Coarse classification every workflow failure falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Conflict,
    Unexpected,
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job not found")]
    JobNotFound(Uuid),

    #[error("Application not found")]
    ApplicationNotFound(Uuid),

    #[error("Contract not found")]
    ContractNotFound(Uuid),

    #[error("Dispute not found")]
    DisputeNotFound(Uuid),

    #[error("User not found")]
    UserNotFound(Uuid),

    #[error("Access denied")]
    PermissionDenied(UserRole),

    #[error("Unauthorized")]
    UnauthorizedJobAccess(Uuid, Uuid),

    #[error("Unauthorized")]
    UnauthorizedApplicationAccess(Uuid, Uuid),

    #[error("Unauthorized")]
    UnauthorizedContractAccess(Uuid, Uuid),

    #[error("Job not available for applications")]
    JobNotAvailable(Uuid),

    #[error("Job is {1:?}, expected it to be open")]
    InvalidJobStatus(Uuid, JobStatus),

    #[error("Application already processed")]
    InvalidApplicationStatus(Uuid, ApplicationStatus),

    #[error("Contract is not active")]
    InvalidContractStatus(Uuid, ContractStatus),

    #[error("Dispute is already resolved or rejected")]
    InvalidDisputeStatus(Uuid, DisputeStatus),

    #[error("Already applied to this job")]
    DuplicateApplication(Uuid, Uuid),

    #[error("Rating already exists for this job")]
    DuplicateRating(Uuid, Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::ApplicationNotFound(_)
            | ServiceError::ContractNotFound(_)
            | ServiceError::DisputeNotFound(_)
            | ServiceError::UserNotFound(_) => ErrorKind::NotFound,

            ServiceError::PermissionDenied(_)
            | ServiceError::UnauthorizedJobAccess(_, _)
            | ServiceError::UnauthorizedApplicationAccess(_, _)
            | ServiceError::UnauthorizedContractAccess(_, _) => ErrorKind::Unauthorized,

            ServiceError::JobNotAvailable(_)
            | ServiceError::InvalidJobStatus(_, _)
            | ServiceError::InvalidApplicationStatus(_, _)
            | ServiceError::InvalidContractStatus(_, _)
            | ServiceError::InvalidDisputeStatus(_, _)
            | ServiceError::DuplicateApplication(_, _)
            | ServiceError::DuplicateRating(_, _) => ErrorKind::Conflict,

            ServiceError::Validation(_) => ErrorKind::Validation,

            ServiceError::Database(_) => ErrorKind::Unexpected,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
            ErrorKind::Validation | ErrorKind::Conflict => StatusCode::BAD_REQUEST,
            ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Unexpected service failure: {}", error);
        }
        HttpError::new(error.to_string(), status)
    }
}

/// True when the datastore refused a write because of a unique index.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db_error| db_error.is_unique_violation())
        .unwrap_or(false)
}
