//! Claim assembly, HS256 signing and verification of access tokens.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use idgate_core::error::IdentityResult;
use idgate_core::models::claim::{ClaimSet, types};
use idgate_core::models::principal::Principal;

use crate::config::AppSettings;
use crate::error::AuthError;
use crate::response::{TokenResponse, UserToken};

/// Claims as decoded from a verified access token.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject — account ID.
    pub sub: String,
    pub email: String,
    /// Unique token ID (UUID string).
    pub jti: String,
    /// Not-before (Unix timestamp).
    pub nbf: i64,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    /// Role names; a single role is encoded as a bare string.
    #[serde(default, deserialize_with = "one_or_many")]
    pub role: Vec<String>,
    /// Store-sourced claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

/// Claim types the issuer always writes itself. The payload carries a
/// single value for each, the last one in the claim set.
const SINGLE_VALUED: [&str; 5] = [
    types::SUBJECT,
    types::EMAIL,
    types::TOKEN_ID,
    types::NOT_BEFORE,
    types::ISSUED_AT,
];

/// Unix seconds for `instant`, rounded to the nearest whole second.
pub fn unix_seconds(instant: DateTime<Utc>) -> i64 {
    (instant.timestamp_millis() + 500).div_euclid(1000)
}

/// Turns principals into signed bearer tokens.
///
/// Stateless apart from the immutable settings and the keys derived
/// from them.
pub struct TokenIssuer {
    settings: AppSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    /// Validate the settings and derive the HMAC keys.
    pub fn new(settings: AppSettings) -> IdentityResult<Self> {
        settings.validate()?;
        let encoding_key = EncodingKey::from_secret(settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.secret.as_bytes());
        Ok(Self {
            settings,
            encoding_key,
            decoding_key,
        })
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// Assemble the claim set for `principal` as of now.
    pub fn build_claims(&self, principal: &Principal) -> ClaimSet {
        build_claims_at(principal, Utc::now())
    }

    /// Sign `claims` into a compact HS256 JWT.
    ///
    /// Claims sharing a type become a JSON array, except the registered
    /// ones in `SINGLE_VALUED`, where the last value wins. `nbf`/`iat`
    /// are numeric. `iss`, `aud` and `exp` always come from the
    /// settings; `exp` counts from the last `iat`.
    pub fn sign(&self, claims: &ClaimSet) -> Result<String, AuthError> {
        let issued_at = claims
            .last(types::ISSUED_AT)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or_else(|| unix_seconds(Utc::now()));
        let expires_at = issued_at + self.settings.expires_in_secs() as i64;

        let mut payload = payload_from(claims);
        payload.insert("iss".into(), Value::String(self.settings.issuer.clone()));
        payload.insert("aud".into(), Value::String(self.settings.audience.clone()));
        payload.insert("exp".into(), Value::from(expires_at));

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
    }

    /// Build, sign and shape the client response for `principal`.
    pub fn issue(&self, principal: &Principal) -> IdentityResult<TokenResponse> {
        let claims = self.build_claims(principal);
        let access_token = self.sign(&claims)?;

        Ok(TokenResponse {
            access_token,
            expires_in: self.settings.expires_in_secs(),
            user_token: UserToken {
                id: principal.id.clone(),
                email: principal.email.clone(),
                claims: claims.into_vec(),
            },
        })
    }

    /// Verify signature, expiry, not-before, issuer and audience.
    ///
    /// Resource servers holding the same settings use this to accept
    /// bearer tokens; no store lookup is performed.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.settings.issuer]);
        validation.set_audience(&[&self.settings.audience]);
        validation.set_required_spec_claims(&["sub", "exp", "nbf", "iss", "aud"]);
        validation.validate_nbf = true;

        jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            })
    }
}

/// Claim set for `principal` issued at `now`.
///
/// Order: store claims, `sub`, `email`, `jti`, `nbf`, `iat`, then one
/// `role` per role. A store claim typed `role` is kept alongside the
/// role claims; a store claim with a registered type is listed but
/// shadowed in the payload by the issuer's value that follows it.
pub(crate) fn build_claims_at(principal: &Principal, now: DateTime<Utc>) -> ClaimSet {
    let timestamp = unix_seconds(now).to_string();

    ClaimSet::new()
        .extend(principal.custom_claims.iter().cloned())
        .with(types::SUBJECT, principal.id.as_str())
        .with(types::EMAIL, principal.email.as_str())
        .with(types::TOKEN_ID, Uuid::new_v4().to_string())
        .with(types::NOT_BEFORE, timestamp.as_str())
        .with(types::ISSUED_AT, timestamp)
        .extend(
            principal
                .roles
                .iter()
                .map(|role| idgate_core::Claim::new(types::ROLE, role.as_str())),
        )
}

fn payload_from(claims: &ClaimSet) -> Map<String, Value> {
    let mut payload = Map::new();
    for claim in claims {
        let value = claim_value(&claim.claim_type, &claim.value);
        if SINGLE_VALUED.contains(&claim.claim_type.as_str()) {
            payload.insert(claim.claim_type.clone(), value);
            continue;
        }
        match payload.get_mut(&claim.claim_type) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                payload.insert(claim.claim_type.clone(), value);
            }
        }
    }
    payload
}

fn claim_value(claim_type: &str, value: &str) -> Value {
    if claim_type == types::NOT_BEFORE || claim_type == types::ISSUED_AT {
        if let Ok(secs) = value.parse::<i64>() {
            return Value::from(secs);
        }
    }
    Value::String(value.to_owned())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use idgate_core::Claim;

    use super::*;

    fn test_settings() -> AppSettings {
        AppSettings {
            secret: "a-test-secret-that-is-long-enough-for-hs256".into(),
            issuer: "idgate-test".into(),
            audience: "https://app.test".into(),
            expiration_hours: 1,
        }
    }

    fn principal(roles: &[&str]) -> Principal {
        Principal {
            id: "8d1f6a3e-0000-4000-8000-000000000001".into(),
            email: "ana@example.com".into(),
            roles: roles.iter().map(|r| (*r).to_owned()).collect(),
            custom_claims: Vec::new(),
        }
    }

    #[test]
    fn reserved_claims_then_roles_in_store_order() {
        let claims = build_claims_at(&principal(&["admin", "user"]), Utc::now());

        let types: Vec<_> = claims.iter().map(|c| c.claim_type.as_str()).collect();
        assert_eq!(types, ["sub", "email", "jti", "nbf", "iat", "role", "role"]);
        assert_eq!(claims.all("role").collect::<Vec<_>>(), ["admin", "user"]);
    }

    #[test]
    fn custom_claims_come_first_and_are_not_deduplicated() {
        let mut p = principal(&["admin"]);
        p.custom_claims = vec![Claim::new("role", "auditor"), Claim::new("tier", "gold")];

        let claims = build_claims_at(&p, Utc::now());
        assert_eq!(claims.len(), 8);
        assert_eq!(claims.as_slice()[0], Claim::new("role", "auditor"));
        assert_eq!(claims.all("role").collect::<Vec<_>>(), ["auditor", "admin"]);
    }

    #[test]
    fn timestamps_round_to_nearest_second() {
        let p = principal(&[]);
        let up = Utc.timestamp_millis_opt(1_700_000_000_600).unwrap();
        let down = Utc.timestamp_millis_opt(1_700_000_000_400).unwrap();

        assert_eq!(build_claims_at(&p, up).first("iat"), Some("1700000001"));
        assert_eq!(build_claims_at(&p, down).first("nbf"), Some("1700000000"));
    }

    #[test]
    fn issued_at_equals_not_before_and_is_now() {
        let issuer = TokenIssuer::new(test_settings()).unwrap();
        let before = Utc::now().timestamp();
        let claims = issuer.build_claims(&principal(&[]));

        let iat: i64 = claims.first("iat").unwrap().parse().unwrap();
        let nbf: i64 = claims.first("nbf").unwrap().parse().unwrap();
        assert_eq!(iat, nbf);
        assert!((iat - before).abs() <= 1);
    }

    #[test]
    fn jti_is_unique_within_the_same_second() {
        let issuer = TokenIssuer::new(test_settings()).unwrap();
        let p = principal(&["user"]);

        let r1 = issuer.issue(&p).unwrap();
        let r2 = issuer.issue(&p).unwrap();

        let jti = |r: &TokenResponse| {
            r.user_token
                .claims
                .iter()
                .find(|c| c.claim_type == "jti")
                .map(|c| c.value.clone())
                .unwrap()
        };
        assert_ne!(jti(&r1), jti(&r2));
        assert_ne!(r1.access_token, r2.access_token);
    }

    #[test]
    fn one_hour_lifetime_is_3600_seconds() {
        let issuer = TokenIssuer::new(test_settings()).unwrap();
        let response = issuer.issue(&principal(&[])).unwrap();
        assert_eq!(response.expires_in, 3600);

        let claims = issuer.verify(&response.access_token).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn jwt_roundtrip() {
        let issuer = TokenIssuer::new(test_settings()).unwrap();
        let response = issuer.issue(&principal(&["admin", "user"])).unwrap();

        let claims = issuer.verify(&response.access_token).unwrap();
        assert_eq!(claims.sub, "8d1f6a3e-0000-4000-8000-000000000001");
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.iss, "idgate-test");
        assert_eq!(claims.aud, "https://app.test");
        assert_eq!(claims.role, ["admin", "user"]);
        assert_eq!(claims.iat, claims.nbf);
    }

    #[test]
    fn single_role_and_custom_claims_survive_roundtrip() {
        let issuer = TokenIssuer::new(test_settings()).unwrap();
        let mut p = principal(&["user"]);
        p.custom_claims = vec![Claim::new("tier", "gold")];

        let token = issuer.issue(&p).unwrap().access_token;
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.role, ["user"]);
        assert_eq!(claims.extra.get("tier"), Some(&Value::from("gold")));
    }

    #[test]
    fn echo_lists_exactly_the_embedded_claims() {
        let issuer = TokenIssuer::new(test_settings()).unwrap();
        let response = issuer.issue(&principal(&["admin"])).unwrap();

        let claims = issuer.verify(&response.access_token).unwrap();
        let echoed = |t: &str| {
            response
                .user_token
                .claims
                .iter()
                .find(|c| c.claim_type == t)
                .map(|c| c.value.clone())
                .unwrap()
        };
        assert_eq!(echoed("jti"), claims.jti);
        assert_eq!(echoed("iat"), claims.iat.to_string());
        assert_eq!(echoed("role"), "admin");
        assert_eq!(response.user_token.claims.len(), 6);
    }

    #[test]
    fn store_issued_at_does_not_move_expiry() {
        let issuer = TokenIssuer::new(test_settings()).unwrap();
        let mut p = principal(&[]);
        p.custom_claims = vec![Claim::new("iat", "0"), Claim::new("nbf", "0")];

        let before = Utc::now().timestamp();
        let response = issuer.issue(&p).unwrap();
        let claims = issuer.verify(&response.access_token).unwrap();

        assert!((claims.iat - before).abs() <= 1);
        assert_eq!(claims.nbf, claims.iat);
        assert_eq!(claims.exp, claims.iat + 3600);
        // The echo still lists the store claim ahead of the issuer's.
        assert_eq!(response.user_token.claims[0], Claim::new("iat", "0"));
    }

    #[test]
    fn sign_counts_expiry_from_last_issued_at() {
        let issuer = TokenIssuer::new(test_settings()).unwrap();
        let now = unix_seconds(Utc::now());
        let claims = ClaimSet::new()
            .with("iat", "0")
            .with("sub", "1")
            .with("email", "ana@example.com")
            .with("nbf", now.to_string())
            .with("iat", now.to_string());

        let token = issuer.sign(&claims).unwrap();
        let verified = issuer.verify(&token).unwrap();
        assert_eq!(verified.iat, now);
        assert_eq!(verified.exp, now + 3600);
    }

    #[test]
    fn store_email_or_subject_keeps_token_verifiable() {
        let issuer = TokenIssuer::new(test_settings()).unwrap();
        let mut p = principal(&["user"]);
        p.custom_claims = vec![
            Claim::new("email", "alt@example.com"),
            Claim::new("sub", "someone-else"),
            Claim::new("jti", "fixed"),
        ];

        let response = issuer.issue(&p).unwrap();
        let claims = issuer.verify(&response.access_token).unwrap();
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.sub, "8d1f6a3e-0000-4000-8000-000000000001");
        assert_ne!(claims.jti, "fixed");
        assert_eq!(claims.role, ["user"]);
    }

    #[test]
    fn tampering_with_any_payload_byte_fails_verification() {
        let issuer = TokenIssuer::new(test_settings()).unwrap();
        let token = issuer.issue(&principal(&["admin"])).unwrap().access_token;

        let payload_start = token.find('.').unwrap() + 1;
        let payload_end = token.rfind('.').unwrap();
        for i in payload_start..payload_end {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(issuer.verify(&tampered).is_err(), "byte {i} accepted");
        }
    }

    #[test]
    fn wrong_secret_issuer_or_audience_is_rejected() {
        let issuer = TokenIssuer::new(test_settings()).unwrap();
        let token = issuer.issue(&principal(&[])).unwrap().access_token;

        let others = [
            AppSettings {
                secret: "another-secret-that-is-long-enough-for-hs".into(),
                ..test_settings()
            },
            AppSettings {
                issuer: "someone-else".into(),
                ..test_settings()
            },
            AppSettings {
                audience: "https://elsewhere.test".into(),
                ..test_settings()
            },
        ];
        for settings in others {
            let verifier = TokenIssuer::new(settings).unwrap();
            assert!(matches!(
                verifier.verify(&token),
                Err(AuthError::TokenInvalid(_))
            ));
        }
    }

    #[test]
    fn empty_secret_fails_construction() {
        let settings = AppSettings {
            secret: String::new(),
            ..test_settings()
        };
        assert!(TokenIssuer::new(settings).is_err());
    }
}
