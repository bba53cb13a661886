use serde::{Deserialize, Serialize};

pub mod accounts;

/// Terminal request errors, mirrored one-to-one onto the numeric codes the
/// resolver layer branches on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    AccountNotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl AccountError {
    pub fn code(&self) -> u16 {
        match self {
            AccountError::Validation(_) => 400,
            AccountError::Unauthorized(_) => 401,
            AccountError::AccountNotFound(_) => 402,
            AccountError::Forbidden(_) => 403,
            AccountError::Conflict(_) => 409,
            AccountError::Internal(_) => 500,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint violation on the normalized email.
    #[error("duplicate key")]
    DuplicateKey,
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
}

impl From<StoreError> for AccountError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey => {
                AccountError::Internal("unexpected duplicate key".to_string())
            }
            StoreError::Db(e) => AccountError::Internal(e.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}
