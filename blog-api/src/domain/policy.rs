//! Authorization rules shared by every mutating operation.
//!
//! Services load the target first and then ask this module, so a missing
//! resource reports "not found" and an existing one reports "forbidden".

use uuid::Uuid;

use super::error::DomainError;
use super::post::PostStatus;
use super::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub(crate) fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub(crate) fn ensure(self) -> Result<(), DomainError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(DomainError::Forbidden),
        }
    }
}

/// Identity of the caller as decoded from its access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Actor {
    pub(crate) id: Uuid,
    pub(crate) role: Role,
}

impl Actor {
    pub(crate) fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub(crate) fn authorize_owner(&self, owner_id: Uuid) -> Result<(), DomainError> {
        can_mutate(self.id, self.role, owner_id).ensure()
    }

    pub(crate) fn authorize_admin(&self) -> Result<(), DomainError> {
        can_administer(self.role).ensure()
    }
}

/// Admins may mutate anything; everybody else only what they own.
pub(crate) fn can_mutate(actor_id: Uuid, actor_role: Role, owner_id: Uuid) -> Decision {
    if actor_role.is_admin() || actor_id == owner_id {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Categories and the user directory have no owner: admins only.
pub(crate) fn can_administer(actor_role: Role) -> Decision {
    if actor_role.is_admin() {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Role-gating for routes: the caller's role must be one of `allowed`.
pub(crate) fn has_any_role(actor_role: Role, allowed: &[Role]) -> Decision {
    if allowed.contains(&actor_role) {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Role requested on a profile update, kept only when an admin asked for it.
/// A non-admin request is dropped without an error.
pub(crate) fn permitted_role_change(actor_role: Role, requested: Option<Role>) -> Option<Role> {
    requested.filter(|_| actor_role.is_admin())
}

/// Public read paths only ever return published posts. Drafts are reported
/// as missing, to their author as well.
pub(crate) fn publicly_visible(status: PostStatus) -> bool {
    matches!(status, PostStatus::Published)
}
