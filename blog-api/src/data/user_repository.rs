use async_trait::async_trait;
use uuid::Uuid;

use super::Pagination;
use crate::domain::error::DomainError;
use crate::domain::user::{Role, User};

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) role: Role,
}

/// Full set of mutable profile columns. `password_hash: None` keeps the
/// stored hash.
#[derive(Debug, Clone)]
pub(crate) struct UserPatch {
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) role: Role,
    pub(crate) password_hash: Option<String>,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError>;
    /// Active users only.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    /// Includes soft-deleted users, for resolving authors of existing content.
    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, DomainError>;
    async fn list_users(&self, pagination: Pagination) -> Result<Vec<User>, DomainError>;
    async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>, DomainError>;
    async fn soft_delete_user(&self, id: Uuid) -> Result<bool, DomainError>;
}
