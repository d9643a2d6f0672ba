//! Token-layer error types.

use idgate_core::error::IdentityError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for IdentityError {
    fn from(err: AuthError) -> Self {
        IdentityError::Token(err.to_string())
    }
}
