//! Token issue/verify on top of `jsonwebtoken` (HS256).

use chrono::{DateTime, Duration, Utc};
use craftlens_core::UserId;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

/// Access-token lifetime.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token encoding failed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token is malformed or has an invalid signature")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verification seam for the API layer.
///
/// Tests can substitute a validator that mints claims directly instead of
/// going through real tokens.
pub trait JwtValidator: Send + Sync + 'static {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError>;
}

/// HS256 issue + verify with a shared secret.
pub struct Hs256TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Hs256TokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time-window checks run through validate_claims with an explicit
        // clock, so the library's own exp handling is disabled.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `user_id` valid for [`TOKEN_TTL_DAYS`] from `now`.
    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = JwtClaims {
            sub: user_id,
            issued_at: now,
            expires_at: now + Duration::days(TOKEN_TTL_DAYS),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(JwtError::Encode)
    }
}

impl JwtValidator for Hs256TokenService {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, JwtError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(JwtError::Invalid)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn issued_token_round_trips() {
        let svc = Hs256TokenService::new(SECRET);
        let user_id = UserId::new();
        let now = Utc::now();

        let token = svc.issue(user_id, now).unwrap();
        let claims = svc.validate(&token, now + Duration::hours(1)).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn token_expires_after_ttl() {
        let svc = Hs256TokenService::new(SECRET);
        let now = Utc::now();

        let token = svc.issue(UserId::new(), now).unwrap();
        let err = svc
            .validate(&token, now + Duration::days(TOKEN_TTL_DAYS) + Duration::seconds(1))
            .unwrap_err();
        assert!(matches!(err, JwtError::Claims(TokenValidationError::Expired)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = Hs256TokenService::new(SECRET);
        let verifier = Hs256TokenService::new(b"other-secret");
        let now = Utc::now();

        let token = issuer.issue(UserId::new(), now).unwrap();
        let err = verifier.validate(&token, now).unwrap_err();
        assert!(matches!(err, JwtError::Invalid(_)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let svc = Hs256TokenService::new(SECRET);
        assert!(matches!(
            svc.validate("not-a-jwt", Utc::now()).unwrap_err(),
            JwtError::Invalid(_)
        ));
    }
}
