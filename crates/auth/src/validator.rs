//! Token decoding and signature verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::claims::{validate_claims, AdminClaims, TokenValidationError};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token decode/signature failure: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Validates a bearer token and yields its claims.
///
/// Trait-shaped so the HTTP layer can be exercised with a stub validator.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AdminClaims, JwtError>;
}

/// HS256 validator over a shared secret.
///
/// Time-window checks run against the explicit `now` via
/// [`validate_claims`], not jsonwebtoken's wall-clock `exp` handling, so
/// validation stays deterministic in tests.
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: Vec<u8>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(&secret),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<AdminClaims, JwtError> {
        let data = jsonwebtoken::decode::<AdminClaims>(token, &self.key, &self.validation)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
