use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::errors::{DomainError, ErrorKind};
use crate::repositories::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("assignment is not open for submissions")]
    AssignmentNotAvailable,
    #[error("due date has passed and late submissions are not accepted")]
    DeadlinePassed,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Forbidden(_) => 403,
            Self::InvalidRequest(_) => 400,
            Self::AssignmentNotAvailable | Self::DeadlinePassed => 409,
            Self::Domain(err) => match err.kind() {
                ErrorKind::Validation => 400,
                ErrorKind::StateGuard => 409,
            },
            Self::Storage(StorageError::Conflict { .. }) => 409,
            Self::Storage(StorageError::Backend(_)) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidRequest(_) => "invalid_request",
            Self::AssignmentNotAvailable => "assignment_not_available",
            Self::DeadlinePassed => "deadline_passed",
            Self::Domain(err) => err.code(),
            Self::Storage(_) => "storage_error",
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::InvalidRequest(errors.to_string())
    }
}
