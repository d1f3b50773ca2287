use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::user::{Role, User};

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),

    #[error("token expired")]
    Expired,
}

/// Identity snapshot taken when the token was issued. Role or email changes
/// made later are not visible until the user logs in again.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Claims {
    pub(crate) user_id: Uuid,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) role: Role,
    pub(crate) iss: String,
    pub(crate) sub: String,
    pub(crate) iat: i64,
    pub(crate) nbf: i64,
    pub(crate) exp: i64,
}

pub(crate) struct JwtService {
    secret: String,
    ttl_seconds: i64,
    issuer: String,
}

impl JwtService {
    pub(crate) const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;
    pub(crate) const DEFAULT_ISSUER: &'static str = "blog-api";

    pub(crate) fn new(secret: &str, ttl_seconds: i64, issuer: &str) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            Self::DEFAULT_TTL_SECONDS
        };

        JwtService {
            secret: secret.into(),
            ttl_seconds,
            issuer: issuer.into(),
        }
    }

    pub(crate) fn generate_token(&self, user: &User) -> Result<String, JwtError> {
        self.generate_token_at(user, Utc::now())
    }

    pub(crate) fn generate_token_at(
        &self,
        user: &User,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let iat = issued_at.timestamp();
        let exp = (issued_at + Duration::seconds(self.ttl_seconds)).timestamp();

        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            iss: self.issuer.clone(),
            sub: user.username.clone(),
            iat,
            nbf: iat,
            exp,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(JwtError::Encode)
    }

    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify_token_at(token, Utc::now())
    }

    /// Checks signature, issuer and structure, then rejects tokens whose
    /// expiry is at or before `now`.
    pub(crate) fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Decode(err),
        })?;

        if token_data.claims.exp <= now.timestamp() {
            return Err(JwtError::Expired);
        }

        Ok(token_data.claims)
    }
}
