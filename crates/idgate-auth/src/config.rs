//! Token issuance settings.

use idgate_core::error::{IdentityError, IdentityResult};
use tracing::warn;

/// Secrets shorter than this are accepted but flagged at startup.
const RECOMMENDED_SECRET_LEN: usize = 32;

const ENV_SECRET: &str = "IDGATE_SECRET";
const ENV_ISSUER: &str = "IDGATE_ISSUER";
const ENV_AUDIENCE: &str = "IDGATE_AUDIENCE";
const ENV_EXPIRATION_HOURS: &str = "IDGATE_EXPIRATION_HOURS";

/// Process-wide, read-only configuration for the token issuer.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Shared HMAC-SHA-256 signing secret.
    pub secret: String,
    /// JWT issuer (`iss` claim).
    pub issuer: String,
    /// JWT audience (`aud` claim).
    pub audience: String,
    /// Access token lifetime in hours.
    pub expiration_hours: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "idgate".into(),
            audience: "https://localhost".into(),
            expiration_hours: 2,
        }
    }
}

impl AppSettings {
    /// Read settings from `IDGATE_*` environment variables, falling back
    /// to defaults for everything but the secret, then validate.
    pub fn from_env() -> IdentityResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> IdentityResult<Self> {
        let defaults = Self::default();
        let expiration_hours = match lookup(ENV_EXPIRATION_HOURS) {
            Some(raw) => raw.trim().parse::<u32>().map_err(|e| {
                IdentityError::Configuration(format!("{ENV_EXPIRATION_HOURS}={raw:?}: {e}"))
            })?,
            None => defaults.expiration_hours,
        };

        let settings = Self {
            secret: lookup(ENV_SECRET).unwrap_or_default(),
            issuer: lookup(ENV_ISSUER).unwrap_or(defaults.issuer),
            audience: lookup(ENV_AUDIENCE).unwrap_or(defaults.audience),
            expiration_hours,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings no token could be issued with.
    pub fn validate(&self) -> IdentityResult<()> {
        if self.secret.is_empty() {
            return Err(IdentityError::Configuration(
                "signing secret is missing or empty".into(),
            ));
        }
        if self.expiration_hours == 0 {
            return Err(IdentityError::Configuration(
                "token lifetime must be at least one hour".into(),
            ));
        }
        if self.secret.len() < RECOMMENDED_SECRET_LEN {
            warn!(
                length = self.secret.len(),
                recommended = RECOMMENDED_SECRET_LEN,
                "signing secret is shorter than recommended"
            );
        }
        Ok(())
    }

    /// Token lifetime in seconds.
    pub fn expires_in_secs(&self) -> u64 {
        u64::from(self.expiration_hours) * 3600
    }
}
