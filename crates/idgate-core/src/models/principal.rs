//! Authenticated principal.

use serde::{Deserialize, Serialize};

use super::account::Account;
use super::claim::Claim;

/// Identity produced by a successful credential check.
///
/// Request-scoped: built by the gate, consumed by the issuer, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    /// Role names in the order the store returned them.
    pub roles: Vec<String>,
    /// Store-sourced claims, in store order.
    pub custom_claims: Vec<Claim>,
}

impl Principal {
    pub fn from_account(account: Account, roles: Vec<String>, custom_claims: Vec<Claim>) -> Self {
        Self {
            id: account.id,
            email: account.email,
            roles,
            custom_claims,
        }
    }
}
