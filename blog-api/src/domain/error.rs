use std::fmt::Display;

use thiserror::Error;

/// Failures shared by every blog operation. The HTTP layer maps each variant
/// to exactly one status code.
#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} is already taken")]
    AlreadyExists(String),

    #[error("forbidden")]
    Forbidden,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unexpected(String),
}

impl DomainError {
    pub(crate) fn not_found(entity: &str, key: impl Display) -> Self {
        DomainError::NotFound(format!("{entity} {key}"))
    }

    pub(crate) fn invalid(field: &'static str, message: &'static str) -> Self {
        DomainError::Validation { field, message }
    }
}

#[cfg(test)]
mod tests {
    use super::DomainError;

    #[test]
    fn messages_name_the_offending_resource() {
        assert_eq!(
            DomainError::not_found("post", "hello-world").to_string(),
            "post hello-world not found"
        );
        assert_eq!(
            DomainError::AlreadyExists("username".to_string()).to_string(),
            "username is already taken"
        );
        assert_eq!(
            DomainError::invalid("title", "must not be empty").to_string(),
            "title: must not be empty"
        );
    }
}
