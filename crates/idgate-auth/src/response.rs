//! Client-facing token response.

use idgate_core::models::claim::Claim;
use serde::{Deserialize, Serialize};

/// Successful registration/login result.
///
/// Field names on the wire are fixed for existing clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed HS256 JWT.
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// Configured token lifetime in seconds (not a countdown).
    #[serde(rename = "expiresIn")]
    pub expires_in: u64,
    #[serde(rename = "usuarioToken")]
    pub user_token: UserToken,
}

/// Echo of the identity and every claim embedded in the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserToken {
    pub id: String,
    pub email: String,
    pub claims: Vec<Claim>,
}
