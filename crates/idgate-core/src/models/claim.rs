//! Claims and ordered claim sets.

use serde::{Deserialize, Serialize};

/// Registered claim types emitted by the token issuer.
pub mod types {
    pub const SUBJECT: &str = "sub";
    pub const EMAIL: &str = "email";
    pub const TOKEN_ID: &str = "jti";
    pub const NOT_BEFORE: &str = "nbf";
    pub const ISSUED_AT: &str = "iat";
    pub const ROLE: &str = "role";
}

/// A typed key/value fact asserted about a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// Append-only, ordered sequence of claims.
///
/// Insertion order is the order claims appear in the token and in the
/// response echo. Duplicate types are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Vec<Claim>);

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push(Claim::new(claim_type, value));
        self
    }

    #[must_use]
    pub fn extend(mut self, claims: impl IntoIterator<Item = Claim>) -> Self {
        self.0.extend(claims);
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Claim> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First value for `claim_type`, if any.
    pub fn first(&self, claim_type: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// Last value for `claim_type`, if any.
    pub fn last(&self, claim_type: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    /// All values for `claim_type`, in insertion order.
    pub fn all<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    pub fn as_slice(&self) -> &[Claim] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Claim> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ClaimSet {
    type Item = &'a Claim;
    type IntoIter = std::slice::Iter<'a, Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Claim> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
