//! Error types for the identity gate.

use serde::Serialize;
use thiserror::Error;

/// Message returned for any credential mismatch, whichever field was wrong.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid email or password";

/// Message returned while the store keeps an account locked.
pub const ACCOUNT_LOCKED_MESSAGE: &str = "account temporarily locked due to invalid attempts";

const STORE_UNAVAILABLE_MESSAGE: &str = "identity store unavailable";
const TOKEN_FAILURE_MESSAGE: &str = "token issuance failed";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Validation error: {}", .messages.join("; "))]
    Validation { messages: Vec<String> },

    #[error("Registration rejected: {}", .reasons.join("; "))]
    RegistrationRejected { reasons: Vec<String> },

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Account locked")]
    AccountLocked,

    #[error("Identity store error: {0}")]
    Store(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl IdentityError {
    /// Flatten the error into the user-facing messages it may expose.
    ///
    /// Store and token failures carry internal detail, so only a fixed
    /// message leaves the process.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation { messages } => messages.clone(),
            Self::RegistrationRejected { reasons } => reasons.clone(),
            Self::AuthenticationFailed => vec![INVALID_CREDENTIALS_MESSAGE.to_owned()],
            Self::AccountLocked => vec![ACCOUNT_LOCKED_MESSAGE.to_owned()],
            Self::Store(_) => vec![STORE_UNAVAILABLE_MESSAGE.to_owned()],
            Self::Token(_) => vec![TOKEN_FAILURE_MESSAGE.to_owned()],
            Self::Configuration(msg) => vec![msg.clone()],
        }
    }
}

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Ordered, user-facing error messages returned in place of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorList(pub Vec<String>);

impl ErrorList {
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<IdentityError> for ErrorList {
    fn from(err: IdentityError) -> Self {
        Self(err.messages())
    }
}

impl From<&IdentityError> for ErrorList {
    fn from(err: &IdentityError) -> Self {
        Self(err.messages())
    }
}
