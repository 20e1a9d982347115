//! Signed, time-limited access tokens (HS256 JWT).
//!
//! Expiry is checked against an explicit clock in [`TokenService::verify_at`]
//! so the 72-hour window can be exercised without waiting.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use uuid::Uuid;

use travelog_types::api::Claims;

pub const TOKEN_TTL_HOURS: i64 = 72;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed token, bad signature, or unexpected algorithm.
    #[error("invalid token")]
    Invalid,

    #[error("token expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Check signature and expiry; does not look the user up.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is compared against `now` below
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret")
    }

    #[test]
    fn issue_verify_roundtrip() {
        let tokens = service();
        let user_id = Uuid::new_v4();

        let token = tokens.issue(user_id).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn expires_after_72_hours() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let issued = Utc::now();
        let token = tokens.issue_at(user_id, issued).unwrap();

        let just_before = issued + Duration::hours(72) - Duration::seconds(1);
        assert_eq!(tokens.verify_at(&token, just_before).unwrap(), user_id);

        let at_expiry = issued + Duration::hours(72);
        assert!(matches!(tokens.verify_at(&token, at_expiry), Err(TokenError::Expired)));

        let later = issued + Duration::days(10);
        assert!(matches!(tokens.verify_at(&token, later), Err(TokenError::Expired)));
    }

    #[test]
    fn tampered_signature_rejected() {
        let tokens = service();
        let a = tokens.issue(Uuid::new_v4()).unwrap();
        let b = tokens.issue(Uuid::new_v4()).unwrap();

        // Payload of `b` with the signature of `a`
        let a_sig = a.rsplit('.').next().unwrap();
        let b_unsigned = b.rsplit_once('.').unwrap().0;
        let forged = format!("{}.{}", b_unsigned, a_sig);

        assert!(matches!(tokens.verify(&forged), Err(TokenError::Invalid)));
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = TokenService::new("other-secret").issue(Uuid::new_v4()).unwrap();
        assert!(matches!(service().verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn malformed_rejected() {
        let tokens = service();
        assert!(matches!(tokens.verify(""), Err(TokenError::Invalid)));
        assert!(matches!(tokens.verify("not-a-token"), Err(TokenError::Invalid)));
        assert!(matches!(tokens.verify("a.b.c"), Err(TokenError::Invalid)));
    }

    #[test]
    fn payload_carries_user_id() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        let data = decode::<serde_json::Value>(&token, &DecodingKey::from_secret(&[]), &validation)
            .unwrap();

        assert_eq!(data.claims["userId"], user_id.to_string());
        let lifetime = data.claims["exp"].as_i64().unwrap() - data.claims["iat"].as_i64().unwrap();
        assert_eq!(lifetime, 72 * 3600);
    }
}
