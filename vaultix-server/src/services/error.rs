use thiserror::Error;
use vaultix_core::error::AppError;

use super::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("OTP session expired")]
    SessionExpired,

    #[error("Invalid OTP code")]
    InvalidCode,

    #[error("User not found")]
    UserNotFound,

    #[error("File not found")]
    FileNotFound,

    #[error("Request not found")]
    RequestNotFound,

    #[error("Request already decided")]
    AlreadyDecided,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::DuplicateEmail => {
                AppError::Conflict(anyhow::anyhow!("Email already registered"))
            }
            // All three handshake failures surface as the same 401 body so a
            // caller cannot tell which stage failed.
            ServiceError::InvalidCredentials
            | ServiceError::SessionExpired
            | ServiceError::InvalidCode => {
                AppError::AuthError(anyhow::anyhow!("Authentication failed"))
            }
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            ServiceError::FileNotFound => AppError::NotFound(anyhow::anyhow!("File not found")),
            ServiceError::RequestNotFound => {
                AppError::NotFound(anyhow::anyhow!("Request not found"))
            }
            ServiceError::AlreadyDecided => {
                AppError::Conflict(anyhow::anyhow!("Request already decided"))
            }
            ServiceError::Storage(e) => AppError::StorageError(anyhow::Error::new(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
