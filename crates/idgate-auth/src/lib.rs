//! Identity gate auth — credential verification, claim assembly and
//! HS256 token issuance.

pub mod config;
pub mod error;
pub mod gate;
pub mod response;
pub mod service;
pub mod token;
pub mod validation;

pub use config::AppSettings;
pub use error::AuthError;
pub use gate::CredentialGate;
pub use response::{TokenResponse, UserToken};
pub use service::IdentityService;
pub use token::{AccessTokenClaims, TokenIssuer};
pub use validation::CredentialsInput;
