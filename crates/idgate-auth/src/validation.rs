//! Request shape checks run before any store call.

use serde::Deserialize;

use idgate_core::error::{IdentityError, IdentityResult};

/// Email + password pair submitted for registration or login.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Collect every field problem; `Ok` only when there are none.
    pub fn validate(&self) -> IdentityResult<()> {
        let mut messages = Vec::new();

        let email = self.email.trim();
        if email.is_empty() {
            messages.push("email is required".to_owned());
        } else if !looks_like_email(email) {
            messages.push("email is not a valid address".to_owned());
        }

        if self.password.is_empty() {
            messages.push("password is required".to_owned());
        }

        if messages.is_empty() {
            Ok(())
        } else {
            Err(IdentityError::Validation { messages })
        }
    }
}

/// One `@`, with something on both sides.
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
