//! Registry state guarded by the registry lock.
//!
//! Every method here runs inside a critical section and enforces the
//! uniqueness and last-administrator invariants at commit time.

use std::collections::HashMap;

use chrono::Utc;

use crate::error::AccessError;
use crate::identity::{Identity, ProfilePatch, Role};

#[derive(Debug, Default)]
pub(crate) struct RegistryState {
    /// Identities keyed by normalized username.
    identities: HashMap<String, Identity>,
    /// National ID -> owning username.
    national_ids: HashMap<String, String>,
    /// Username of the logged-in identity.
    session: Option<String>,
}

impl RegistryState {
    pub fn get(&self, username: &str) -> Option<&Identity> {
        self.identities.get(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.identities.contains_key(username)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// All identities, oldest first.
    pub fn identities(&self) -> Vec<&Identity> {
        let mut all: Vec<&Identity> = self.identities.values().collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.username.cmp(&b.username))
        });
        all
    }

    /// Look up the live record for a caller-held identity.
    ///
    /// Returns `None` if the identity was deleted since the caller read it.
    pub fn resolve_actor(&self, actor: Option<&Identity>) -> Option<&Identity> {
        actor
            .and_then(|a| self.identities.get(&a.username))
            .filter(|live| actor.is_some_and(|a| a.id == live.id))
    }

    pub fn administrator_count(&self) -> usize {
        self.identities
            .values()
            .filter(|i| i.role == Role::Administrator)
            .count()
    }

    /// Fail with `DuplicateNationalId` if another identity holds `national_id`.
    ///
    /// `owner` is excluded from the scan so an identity never conflicts
    /// with itself.
    pub fn ensure_national_id_free(
        &self,
        national_id: &str,
        owner: Option<&str>,
    ) -> Result<(), AccessError> {
        match self.national_ids.get(national_id) {
            Some(holder) if Some(holder.as_str()) != owner => {
                Err(AccessError::DuplicateNationalId(national_id.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Fail with `LastAdminProtected` if `target` is the sole administrator.
    pub fn ensure_not_last_administrator(&self, target: &Identity) -> Result<(), AccessError> {
        if target.role == Role::Administrator && self.administrator_count() <= 1 {
            return Err(AccessError::LastAdminProtected);
        }
        Ok(())
    }

    pub fn insert(&mut self, identity: Identity) -> Result<&Identity, AccessError> {
        if self.contains(&identity.username) {
            return Err(AccessError::DuplicateUsername(identity.username));
        }
        if let Some(ref national_id) = identity.profile.national_id {
            self.ensure_national_id_free(national_id, None)?;
            self.national_ids
                .insert(national_id.clone(), identity.username.clone());
        }
        let username = identity.username.clone();
        Ok(self.identities.entry(username).or_insert(identity))
    }

    /// Remove an identity and its profile, closing its session if active.
    pub fn remove(&mut self, username: &str) -> Result<Identity, AccessError> {
        let target = self
            .get(username)
            .ok_or_else(|| AccessError::NotFound(username.to_string()))?;
        self.ensure_not_last_administrator(target)?;

        let removed = self
            .identities
            .remove(username)
            .ok_or_else(|| AccessError::NotFound(username.to_string()))?;
        if let Some(ref national_id) = removed.profile.national_id {
            self.national_ids.remove(national_id);
        }
        if self.session.as_deref() == Some(username) {
            self.session = None;
        }
        Ok(removed)
    }

    pub fn set_role(&mut self, username: &str, role: Role) -> Result<&Identity, AccessError> {
        let target = self
            .get(username)
            .ok_or_else(|| AccessError::NotFound(username.to_string()))?;
        if role != Role::Administrator {
            self.ensure_not_last_administrator(target)?;
        }
        let target = self.get_mut(username)?;
        target.role = role;
        Ok(target)
    }

    pub fn set_password_digest(&mut self, username: &str, digest: String) -> Result<(), AccessError> {
        self.get_mut(username)?.password_digest = digest;
        Ok(())
    }

    /// Apply a sparse profile patch, keeping the national ID index in step.
    pub fn patch_profile(
        &mut self,
        username: &str,
        patch: ProfilePatch,
    ) -> Result<&Identity, AccessError> {
        let current = self
            .get(username)
            .ok_or_else(|| AccessError::NotFound(username.to_string()))?
            .profile
            .national_id
            .clone();

        if let Some(ref new_id) = patch.national_id {
            if let Some(ref id) = new_id {
                self.ensure_national_id_free(id, Some(username))?;
            }
            if *new_id != current {
                if let Some(ref old) = current {
                    self.national_ids.remove(old);
                }
                if let Some(ref id) = new_id {
                    self.national_ids.insert(id.clone(), username.to_string());
                }
            }
        }

        let target = self.get_mut(username)?;
        target.profile.apply(patch);
        Ok(target)
    }

    pub fn session_identity(&self) -> Option<&Identity> {
        self.session.as_deref().and_then(|u| self.identities.get(u))
    }

    /// Open the single session slot for `username` and stamp its login time.
    pub fn open_session(&mut self, username: &str) -> Result<&Identity, AccessError> {
        let identity = self.get_mut(username)?;
        identity.last_login = Some(Utc::now());
        self.session = Some(username.to_string());
        self.get(username)
            .ok_or_else(|| AccessError::NotFound(username.to_string()))
    }

    pub fn close_session(&mut self) -> Option<String> {
        self.session.take()
    }

    fn get_mut(&mut self, username: &str) -> Result<&mut Identity, AccessError> {
        self.identities
            .get_mut(username)
            .ok_or_else(|| AccessError::NotFound(username.to_string()))
    }
}
