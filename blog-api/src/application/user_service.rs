use std::sync::Arc;

use uuid::Uuid;

use crate::data::Pagination;
use crate::data::user_repository::{UserPatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::policy::{Actor, permitted_role_change};
use crate::domain::user::{UpdateUserRequest, User};
use crate::infrastructure::password::hash_password;

pub(crate) struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub(crate) fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub(crate) async fn me(&self, actor: Actor) -> Result<User, DomainError> {
        self.load(actor.id).await
    }

    pub(crate) async fn list_users(
        &self,
        actor: Actor,
        pagination: Pagination,
    ) -> Result<Vec<User>, DomainError> {
        actor.authorize_admin()?;
        self.users.list_users(pagination).await
    }

    /// Applies a partial profile update. A `role` sent by a non-admin is
    /// dropped while the remaining fields still apply.
    pub(crate) async fn update_user(
        &self,
        actor: Actor,
        user_id: Uuid,
        req: UpdateUserRequest,
    ) -> Result<User, DomainError> {
        let req = req.validate()?;
        let current = self.load(user_id).await?;
        actor.authorize_owner(current.id)?;

        let email = match req.email {
            Some(email) if email != current.email => {
                if let Some(other) = self.users.find_by_email(&email).await?
                    && other.user.id != current.id
                {
                    return Err(DomainError::AlreadyExists("email".to_string()));
                }
                email
            }
            _ => current.email,
        };
        let password_hash = req
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?;

        let patch = UserPatch {
            email,
            first_name: req.first_name.unwrap_or(current.first_name),
            last_name: req.last_name.unwrap_or(current.last_name),
            role: permitted_role_change(actor.role, req.role).unwrap_or(current.role),
            password_hash,
        };

        self.users
            .update_user(user_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))
    }

    pub(crate) async fn delete_user(&self, actor: Actor, user_id: Uuid) -> Result<(), DomainError> {
        let current = self.load(user_id).await?;
        actor.authorize_owner(current.id)?;

        if !self.users.soft_delete_user(user_id).await? {
            return Err(DomainError::not_found("user", user_id));
        }
        Ok(())
    }

    async fn load(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))
    }
}
