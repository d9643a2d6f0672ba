//! Identity gate store — in-memory account store with Argon2id password
//! hashing, password policy and lockout bookkeeping.

mod config;
mod error;
mod memory;
pub mod password;

pub use config::{PasswordPolicy, StoreConfig};
pub use error::StoreError;
pub use memory::MemoryIdentityStore;
