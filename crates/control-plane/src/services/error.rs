// Service error types
//
// Every failure a service can report. The HTTP mapping lives in
// api::common so services stay transport-agnostic.

use thiserror::Error;

use crate::storage::StoreError;

/// Result type alias for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("User not found")]
    UserNotFound,

    #[error("Environment not found")]
    EnvironmentNotFound,

    #[error("Variable not found")]
    VariableNotFound,

    #[error("User with this username already exists")]
    DuplicateUsername(String),

    #[error("Environment with this name already exists")]
    DuplicateEnvironment(String),

    #[error("Variable '{0}' already exists in this environment.")]
    DuplicateVariable(String),

    /// Payload passed deserialization but failed a domain check
    #[error("{0}")]
    InvalidInput(String),

    /// Unexpected storage or runtime fault; never shown to clients
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Internal(err.into())
    }
}
