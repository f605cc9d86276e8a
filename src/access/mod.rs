//! Role-gated account management.
//!
//! [`AccessManager`] layers authorization and business rules on top of the
//! [`IdentityRegistry`]:
//! - Create identity (administrators only)
//! - List identities (ungated)
//! - Change password (self, or administrators for anyone)
//! - Update profile (self, or administrators for anyone)
//! - Delete identity (administrators only, never the last administrator)
//! - Change role (administrators only, never demoting the last administrator)
//!
//! The acting identity is passed explicitly to every call and re-resolved
//! against the live registry, so a caller holding a stale copy is judged
//! by the current role.

use tracing::info;

use crate::auth::{
    normalize_username, require_administrator, require_self_or_administrator,
    validate_national_id, validate_password,
};
use crate::error::AccessError;
use crate::identity::{Identity, IdentitySummary, NewProfile, ProfilePatch, Role};
use crate::registry::IdentityRegistry;

/// Authorization layer over an [`IdentityRegistry`].
pub struct AccessManager<'a> {
    registry: &'a IdentityRegistry,
}

impl<'a> AccessManager<'a> {
    /// Create a new AccessManager.
    pub fn new(registry: &'a IdentityRegistry) -> Self {
        Self { registry }
    }

    /// Create an identity on behalf of an administrator.
    ///
    /// A non-empty national ID in `profile` is checked for uniqueness
    /// before the password is hashed.
    pub fn create_identity(
        &self,
        actor: Option<&Identity>,
        username: &str,
        password: &str,
        profile: NewProfile,
        role: Role,
    ) -> Result<Identity, AccessError> {
        {
            let state = self.registry.read();
            require_administrator(state.resolve_actor(actor), "create users")?;
            if let Some(national_id) = profile.national_id() {
                validate_national_id(national_id)?;
                state.ensure_national_id_free(national_id, None)?;
            }
        }

        let pending = self.registry.prepare(username, password, role, profile)?;

        let mut state = self.registry.write();
        let actor_name = require_administrator(state.resolve_actor(actor), "create users")?
            .username
            .clone();
        let created = state.insert(pending)?.clone();
        info!(
            username = %created.username,
            role = %created.role,
            by = %actor_name,
            "User created"
        );
        Ok(created)
    }

    /// List every identity without credentials, oldest first.
    pub fn list_identities(&self) -> Vec<IdentitySummary> {
        self.registry
            .read()
            .identities()
            .into_iter()
            .map(Identity::summary)
            .collect()
    }

    /// Replace the password of `target`.
    pub fn change_password(
        &self,
        actor: Option<&Identity>,
        target: &str,
        new_password: &str,
    ) -> Result<(), AccessError> {
        let target = normalize_username(target);
        {
            let state = self.registry.read();
            require_self_or_administrator(
                state.resolve_actor(actor),
                &target,
                "change the password",
            )?;
            if !state.contains(&target) {
                return Err(AccessError::NotFound(target));
            }
        }
        validate_password(new_password)?;

        let digest = self.registry.hasher().hash(new_password)?;

        let mut state = self.registry.write();
        let actor_name = require_self_or_administrator(
            state.resolve_actor(actor),
            &target,
            "change the password",
        )?
        .username
        .clone();
        state.set_password_digest(&target, digest)?;
        info!(username = %target, by = %actor_name, "Password changed");
        Ok(())
    }

    /// Apply a sparse patch to the profile of `target`.
    ///
    /// A new national ID must be well formed and not held by anyone else.
    /// Setting the current value again is accepted.
    pub fn update_profile(
        &self,
        actor: Option<&Identity>,
        target: &str,
        patch: ProfilePatch,
    ) -> Result<Identity, AccessError> {
        let target = normalize_username(target);
        let mut state = self.registry.write();

        let actor_name = require_self_or_administrator(
            state.resolve_actor(actor),
            &target,
            "update the profile",
        )?
        .username
        .clone();
        let current = state
            .get(&target)
            .ok_or_else(|| AccessError::NotFound(target.clone()))?;

        if let Some(national_id) = patch.new_national_id() {
            if current.profile.national_id.as_deref() != Some(national_id) {
                validate_national_id(national_id)?;
            }
        }

        let updated = state.patch_profile(&target, patch)?.clone();
        info!(username = %target, by = %actor_name, "Profile updated");
        Ok(updated)
    }

    /// Delete `target` and its profile.
    ///
    /// Deleting the logged-in identity also ends the session.
    pub fn delete_identity(
        &self,
        actor: Option<&Identity>,
        target: &str,
    ) -> Result<Identity, AccessError> {
        let target = normalize_username(target);
        let mut state = self.registry.write();

        let actor_name = require_administrator(state.resolve_actor(actor), "delete users")?
            .username
            .clone();
        let removed = state.remove(&target)?;
        info!(username = %removed.username, by = %actor_name, "User deleted");
        Ok(removed)
    }

    /// Change the role of `target`.
    ///
    /// Assigning the role the target already has succeeds without change.
    pub fn change_role(
        &self,
        actor: Option<&Identity>,
        target: &str,
        new_role: Role,
    ) -> Result<Identity, AccessError> {
        let target = normalize_username(target);
        let mut state = self.registry.write();

        let actor_name = require_administrator(state.resolve_actor(actor), "change roles")?
            .username
            .clone();
        let updated = state.set_role(&target, new_role)?.clone();
        info!(username = %target, role = %new_role, by = %actor_name, "Role changed");
        Ok(updated)
    }
}
