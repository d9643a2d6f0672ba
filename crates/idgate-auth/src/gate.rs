//! Credential gate — decides whether a registration or login attempt
//! yields a principal.

use idgate_core::error::{IdentityError, IdentityResult};
use idgate_core::models::account::{Account, NewAccount};
use idgate_core::models::principal::Principal;
use idgate_core::store::IdentityStore;
use tracing::{debug, info, warn};

use crate::validation::CredentialsInput;

/// Credential gate.
///
/// Generic over the store so that the gate has no dependency on any
/// storage backend. Holds no mutable state of its own.
pub struct CredentialGate<S: IdentityStore> {
    store: S,
}

impl<S: IdentityStore> CredentialGate<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create an account and treat it as authenticated straight away.
    pub async fn register(&self, input: CredentialsInput) -> IdentityResult<Principal> {
        input.validate()?;
        let email = input.email.trim().to_owned();

        let account = self
            .store
            .create_user(NewAccount {
                email,
                password: input.password,
            })
            .await
            .inspect_err(|e| {
                if let IdentityError::RegistrationRejected { reasons } = e {
                    info!(count = reasons.len(), "registration rejected by store");
                }
            })?;

        self.store.sign_in(&account).await?;
        info!(user_id = %account.id, "account registered");

        self.load_principal(account).await
    }

    /// Check a password and produce the principal on success.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller. Lockout is checked before the password.
    pub async fn login(&self, input: CredentialsInput) -> IdentityResult<Principal> {
        input.validate()?;
        let email = input.email.trim();

        // 1. Look up account.
        let Some(account) = self.store.find_by_email(email).await? else {
            debug!("login for unknown email");
            return Err(IdentityError::AuthenticationFailed);
        };

        // 2. Refuse while locked.
        if self.store.is_locked_out(&account).await? {
            warn!(user_id = %account.id, "login attempt on locked account");
            return Err(IdentityError::AccountLocked);
        }

        // 3. Verify password; count the failure if it does not match.
        if !self.store.verify_password(&account, &input.password).await? {
            let locked = self.store.record_failed_attempt(&account).await?;
            if locked {
                warn!(user_id = %account.id, "account locked after failed attempt");
                return Err(IdentityError::AccountLocked);
            }
            debug!(user_id = %account.id, "password mismatch");
            return Err(IdentityError::AuthenticationFailed);
        }

        // 4. Success: clear the counter and mark the session.
        self.store.reset_failed_attempts(&account).await?;
        self.store.sign_in(&account).await?;
        info!(user_id = %account.id, "login succeeded");

        self.load_principal(account).await
    }

    async fn load_principal(&self, account: Account) -> IdentityResult<Principal> {
        let roles = self.store.get_roles(&account).await?;
        let claims = self.store.get_claims(&account).await?;
        Ok(Principal::from_account(account, roles, claims))
    }
}
