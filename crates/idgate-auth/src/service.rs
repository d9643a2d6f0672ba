//! Identity service — the register/login pipeline from credentials to
//! token response.

use idgate_core::error::{ErrorList, IdentityError};
use idgate_core::store::IdentityStore;
use tracing::{error, info};

use crate::config::AppSettings;
use crate::gate::CredentialGate;
use crate::response::TokenResponse;
use crate::token::TokenIssuer;
use crate::validation::CredentialsInput;

/// Composes [`CredentialGate`] and [`TokenIssuer`].
///
/// Every failure leaves as an [`ErrorList`] of user-facing messages.
pub struct IdentityService<S: IdentityStore> {
    gate: CredentialGate<S>,
    issuer: TokenIssuer,
}

impl<S: IdentityStore> IdentityService<S> {
    /// Fails only on invalid settings; call once at startup.
    pub fn new(store: S, settings: AppSettings) -> Result<Self, IdentityError> {
        Ok(Self {
            gate: CredentialGate::new(store),
            issuer: TokenIssuer::new(settings)?,
        })
    }

    pub fn gate(&self) -> &CredentialGate<S> {
        &self.gate
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Register an account and issue its first token.
    pub async fn register(&self, input: CredentialsInput) -> Result<TokenResponse, ErrorList> {
        let email = input.email.clone();
        let result = self
            .gate
            .register(input)
            .await
            .and_then(|principal| self.issuer.issue(&principal));
        finish("register", &email, result)
    }

    /// Authenticate and issue a token.
    pub async fn login(&self, input: CredentialsInput) -> Result<TokenResponse, ErrorList> {
        let email = input.email.clone();
        let result = self
            .gate
            .login(input)
            .await
            .and_then(|principal| self.issuer.issue(&principal));
        finish("login", &email, result)
    }
}

fn finish(
    operation: &'static str,
    email: &str,
    result: Result<TokenResponse, IdentityError>,
) -> Result<TokenResponse, ErrorList> {
    match result {
        Ok(response) => {
            info!(operation, email, "token issued");
            Ok(response)
        }
        Err(e @ (IdentityError::Store(_) | IdentityError::Token(_))) => {
            error!(operation, email, error = %e, "identity pipeline failed");
            Err(e.into())
        }
        Err(e) => {
            info!(operation, email, error = %e, "request refused");
            Err(e.into())
        }
    }
}
