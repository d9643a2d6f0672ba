//! Store policy configuration.

/// Password rules applied on account creation.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

impl PasswordPolicy {
    /// Length check only.
    pub fn minimal(min_length: usize) -> Self {
        Self {
            min_length,
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
            require_non_alphanumeric: false,
        }
    }

    /// Every rule `password` breaks, in a fixed order.
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut out = Vec::new();
        if password.chars().count() < self.min_length {
            out.push(format!(
                "password must be at least {} characters",
                self.min_length
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            out.push("password must contain at least one digit ('0'-'9')".into());
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            out.push("password must contain at least one lowercase letter ('a'-'z')".into());
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            out.push("password must contain at least one uppercase letter ('A'-'Z')".into());
        }
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            out.push("password must contain at least one non-alphanumeric character".into());
        }
        out
    }
}

/// Configuration for [`MemoryIdentityStore`](crate::MemoryIdentityStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    pub password_policy: PasswordPolicy,
    /// Consecutive failed logins before lockout (default: 5).
    pub max_failed_login_attempts: u32,
    /// Lockout duration in seconds (default: 300 = 5 min).
    pub lockout_duration_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            password_policy: PasswordPolicy::default(),
            max_failed_login_attempts: 5,
            lockout_duration_secs: 300,
        }
    }
}
