//! Argon2id password hashing.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::warn;

use crate::domain::error::DomainError;

pub(crate) fn hash_password(raw_password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = argon2()?
        .hash_password(raw_password.as_bytes(), &salt)
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;
    Ok(password_hash.to_string())
}

/// Fails closed: a mismatch, an unparsable stored hash or any hasher error
/// all come back as [`DomainError::InvalidCredentials`].
pub(crate) fn verify_password(raw_password: &str, password_hash: &str) -> Result<(), DomainError> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|err| {
        warn!(error = %err, "stored password hash is not parsable");
        DomainError::InvalidCredentials
    })?;

    argon2()
        .map_err(|_| DomainError::InvalidCredentials)?
        .verify_password(raw_password.as_bytes(), &parsed_hash)
        .map_err(|_| DomainError::InvalidCredentials)
}

fn argon2() -> Result<Argon2<'static>, DomainError> {
    let params = Params::new(19 * 1024, 2, 1, None)
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}
