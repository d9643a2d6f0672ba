//! Store-specific error types and conversions.

use idgate_core::error::IdentityError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("account not found: {0}")]
    NotFound(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl From<StoreError> for IdentityError {
    fn from(err: StoreError) -> Self {
        IdentityError::Store(err.to_string())
    }
}
