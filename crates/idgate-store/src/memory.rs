//! In-memory implementation of [`IdentityStore`].
//!
//! Accounts are keyed by lower-cased email. Passwords are hashed with
//! Argon2id (see [`crate::password`]). Every operation takes the state
//! lock once, so updates to one account are serialized.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use idgate_core::error::{IdentityError, IdentityResult};
use idgate_core::models::account::{Account, NewAccount};
use idgate_core::models::claim::Claim;
use idgate_core::store::IdentityStore;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::password;

#[derive(Debug, Clone)]
struct AccountRecord {
    id: String,
    email: String,
    password_hash: String,
    failed_login_attempts: u32,
    locked_until: Option<DateTime<Utc>>,
    roles: Vec<String>,
    claims: Vec<Claim>,
    last_sign_in_at: Option<DateTime<Utc>>,
}

impl AccountRecord {
    fn to_account(&self) -> Account {
        Account {
            id: self.id.clone(),
            email: self.email.clone(),
        }
    }

    fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Process-local identity store.
///
/// Cloning is cheap and every clone shares the same accounts.
#[derive(Clone, Default)]
pub struct MemoryIdentityStore {
    accounts: Arc<RwLock<HashMap<String, AccountRecord>>>,
    config: Arc<StoreConfig>,
}

impl MemoryIdentityStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            accounts: Arc::default(),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Grant `role` to the account registered under `email`.
    pub async fn add_role(&self, email: &str, role: impl Into<String>) -> IdentityResult<()> {
        let mut accounts = self.accounts.write().await;
        let record = accounts
            .get_mut(&normalize(email))
            .ok_or_else(|| StoreError::NotFound(email.to_owned()))?;
        record.roles.push(role.into());
        Ok(())
    }

    /// Attach a custom claim to the account registered under `email`.
    pub async fn add_claim(&self, email: &str, claim: Claim) -> IdentityResult<()> {
        let mut accounts = self.accounts.write().await;
        let record = accounts
            .get_mut(&normalize(email))
            .ok_or_else(|| StoreError::NotFound(email.to_owned()))?;
        record.claims.push(claim);
        Ok(())
    }

    pub async fn failed_attempts(&self, email: &str) -> Option<u32> {
        let accounts = self.accounts.read().await;
        accounts
            .get(&normalize(email))
            .map(|r| r.failed_login_attempts)
    }

    pub async fn is_signed_in(&self, email: &str) -> bool {
        let accounts = self.accounts.read().await;
        accounts
            .get(&normalize(email))
            .is_some_and(|r| r.last_sign_in_at.is_some())
    }

    /// Run `f` on the record behind `account` under the write lock.
    async fn with_record<T>(
        &self,
        account: &Account,
        f: impl FnOnce(&mut AccountRecord) -> T,
    ) -> IdentityResult<T> {
        let mut accounts = self.accounts.write().await;
        match accounts.get_mut(&normalize(&account.email)) {
            Some(record) if record.id == account.id => Ok(f(record)),
            _ => Err(StoreError::NotFound(account.id.clone()).into()),
        }
    }

    async fn read_record<T>(
        &self,
        account: &Account,
        f: impl FnOnce(&AccountRecord) -> T,
    ) -> IdentityResult<T> {
        let accounts = self.accounts.read().await;
        match accounts.get(&normalize(&account.email)) {
            Some(record) if record.id == account.id => Ok(f(record)),
            _ => Err(StoreError::NotFound(account.id.clone()).into()),
        }
    }
}

impl IdentityStore for MemoryIdentityStore {
    async fn create_user(&self, input: NewAccount) -> IdentityResult<Account> {
        let key = normalize(&input.email);

        let mut reasons = Vec::new();
        if self.accounts.read().await.contains_key(&key) {
            reasons.push(format!("email '{}' is already taken", input.email));
        }
        reasons.extend(self.config.password_policy.violations(&input.password));
        if !reasons.is_empty() {
            return Err(IdentityError::RegistrationRejected { reasons });
        }

        let password_hash = password::hash_password(&input.password, self.config.pepper.as_deref())?;

        let mut accounts = self.accounts.write().await;
        // Another registration may have won the race while hashing.
        if accounts.contains_key(&key) {
            return Err(IdentityError::RegistrationRejected {
                reasons: vec![format!("email '{}' is already taken", input.email)],
            });
        }

        let record = AccountRecord {
            id: Uuid::new_v4().to_string(),
            email: input.email,
            password_hash,
            failed_login_attempts: 0,
            locked_until: None,
            roles: Vec::new(),
            claims: Vec::new(),
            last_sign_in_at: None,
        };
        let account = record.to_account();
        accounts.insert(key, record);
        info!(user_id = %account.id, "account created");
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> IdentityResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&normalize(email)).map(AccountRecord::to_account))
    }

    async fn verify_password(&self, account: &Account, password: &str) -> IdentityResult<bool> {
        let hash = self
            .read_record(account, |r| r.password_hash.clone())
            .await?;
        Ok(password::verify_password(
            password,
            &hash,
            self.config.pepper.as_deref(),
        )?)
    }

    async fn is_locked_out(&self, account: &Account) -> IdentityResult<bool> {
        let now = Utc::now();
        self.read_record(account, |r| r.is_locked_at(now)).await
    }

    async fn record_failed_attempt(&self, account: &Account) -> IdentityResult<bool> {
        let max_attempts = self.config.max_failed_login_attempts;
        let lockout = Duration::seconds(self.config.lockout_duration_secs as i64);
        let now = Utc::now();

        self.with_record(account, |r| {
            r.failed_login_attempts += 1;
            if max_attempts > 0 && r.failed_login_attempts >= max_attempts {
                let until = now + lockout;
                r.locked_until = Some(until);
                r.failed_login_attempts = 0;
                info!(user_id = %r.id, %until, "account locked out");
            } else {
                debug!(user_id = %r.id, attempts = r.failed_login_attempts, "failed login recorded");
            }
            r.is_locked_at(now)
        })
        .await
    }

    async fn reset_failed_attempts(&self, account: &Account) -> IdentityResult<()> {
        self.with_record(account, |r| {
            r.failed_login_attempts = 0;
            r.locked_until = None;
        })
        .await
    }

    async fn get_roles(&self, account: &Account) -> IdentityResult<Vec<String>> {
        self.read_record(account, |r| r.roles.clone()).await
    }

    async fn get_claims(&self, account: &Account) -> IdentityResult<Vec<Claim>> {
        self.read_record(account, |r| r.claims.clone()).await
    }

    async fn sign_in(&self, account: &Account) -> IdentityResult<()> {
        let now = Utc::now();
        self.with_record(account, |r| r.last_sign_in_at = Some(now))
            .await
    }
}
