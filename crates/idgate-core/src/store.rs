//! Identity store abstraction.
//!
//! The gate never touches persistence, password hashes or lockout
//! counters directly; it asks a store. Any backend (in-memory,
//! relational, directory service) can implement [`IdentityStore`].
//! Implementations serialize conflicting updates to the same account.

use crate::error::IdentityResult;
use crate::models::{
    account::{Account, NewAccount},
    claim::Claim,
};

pub trait IdentityStore: Send + Sync {
    /// Create an account.
    ///
    /// A refusal (duplicate email, weak password) is reported as
    /// `IdentityError::RegistrationRejected` with one reason per rule.
    fn create_user(&self, input: NewAccount)
    -> impl Future<Output = IdentityResult<Account>> + Send;

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = IdentityResult<Option<Account>>> + Send;

    /// `Ok(false)` on mismatch; `Err` only when the check itself failed.
    fn verify_password(
        &self,
        account: &Account,
        password: &str,
    ) -> impl Future<Output = IdentityResult<bool>> + Send;

    fn is_locked_out(&self, account: &Account) -> impl Future<Output = IdentityResult<bool>> + Send;

    /// Count one failed attempt. Returns `true` when the account is
    /// locked out after this attempt.
    fn record_failed_attempt(
        &self,
        account: &Account,
    ) -> impl Future<Output = IdentityResult<bool>> + Send;

    fn reset_failed_attempts(
        &self,
        account: &Account,
    ) -> impl Future<Output = IdentityResult<()>> + Send;

    fn get_roles(&self, account: &Account)
    -> impl Future<Output = IdentityResult<Vec<String>>> + Send;

    fn get_claims(&self, account: &Account)
    -> impl Future<Output = IdentityResult<Vec<Claim>>> + Send;

    /// Record a local sign-in marker for the account.
    fn sign_in(&self, account: &Account) -> impl Future<Output = IdentityResult<()>> + Send;
}
