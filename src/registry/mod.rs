//! Identity registry.
//!
//! The registry owns every identity, the national ID index and the single
//! session slot behind one lock. Password hashing and verification run
//! outside the lock; every invariant is re-checked under the write lock
//! before a change is committed.

mod snapshot;
mod state;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::auth::{
    normalize_username, validate_national_id, validate_password, validate_username,
    CredentialHasher,
};
use crate::config::BootstrapConfig;
use crate::error::AccessError;
use crate::identity::{Identity, NewProfile, Profile, Role, UserId};

pub use snapshot::{RegistrySnapshot, SNAPSHOT_VERSION};
pub(crate) use state::RegistryState;

/// In-memory store of identities with a single session slot.
#[derive(Debug)]
pub struct IdentityRegistry {
    state: RwLock<RegistryState>,
    hasher: Arc<dyn CredentialHasher>,
    bootstrap: BootstrapConfig,
}

impl IdentityRegistry {
    /// Create a registry and seed the default administrator.
    pub fn new(
        hasher: Arc<dyn CredentialHasher>,
        bootstrap: BootstrapConfig,
    ) -> Result<Self, AccessError> {
        let registry = Self {
            state: RwLock::new(RegistryState::default()),
            hasher,
            bootstrap,
        };
        registry.bootstrap_default_administrator()?;
        Ok(registry)
    }

    /// Create the default administrator if no administrator exists.
    ///
    /// Returns `true` if an identity was created. Calling it again is a
    /// no-op.
    pub fn bootstrap_default_administrator(&self) -> Result<bool, AccessError> {
        if self.read().administrator_count() > 0 {
            return Ok(false);
        }

        let pending = self.prepare(
            &self.bootstrap.username,
            &self.bootstrap.password,
            Role::Administrator,
            self.bootstrap.profile(),
        )?;

        let mut state = self.write();
        // Another thread may have seeded while we were hashing.
        if state.administrator_count() > 0 {
            return Ok(false);
        }
        let created = state.insert(pending)?;
        info!(username = %created.username, "Default administrator created");
        Ok(true)
    }

    /// Register a new identity.
    ///
    /// Fails with `DuplicateUsername` if the normalized username is taken,
    /// `DuplicateNationalId` if the profile's national ID is held by
    /// someone else, or one of the validation kinds for malformed input.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
        profile: NewProfile,
    ) -> Result<Identity, AccessError> {
        let pending = self.prepare(username, password, role, profile)?;
        let mut state = self.write();
        let created = state.insert(pending)?.clone();
        info!(username = %created.username, role = %created.role, "User registered");
        Ok(created)
    }

    /// Authenticate and open the session slot.
    ///
    /// Unknown usernames and wrong passwords both yield
    /// `InvalidCredentials`. A successful login replaces any session
    /// already open.
    pub fn login(&self, username: &str, password: &str) -> Result<Identity, AccessError> {
        let username = normalize_username(username);

        let digest = match self.read().get(&username) {
            Some(identity) => identity.password_digest.clone(),
            None => {
                warn!(username = %username, "Login failed: unknown user");
                return Err(AccessError::InvalidCredentials);
            }
        };

        match self.hasher.verify(password, &digest) {
            Ok(true) => {}
            Ok(false) => {
                warn!(username = %username, "Login failed: wrong password");
                return Err(AccessError::InvalidCredentials);
            }
            Err(e) => {
                warn!(username = %username, error = %e, "Login failed: unreadable digest");
                return Err(AccessError::InvalidCredentials);
            }
        }

        let mut state = self.write();
        // The account may have been deleted or its password changed meanwhile.
        let unchanged = state
            .get(&username)
            .is_some_and(|identity| identity.password_digest == digest);
        if !unchanged {
            warn!(username = %username, "Login failed: account changed during login");
            return Err(AccessError::InvalidCredentials);
        }

        let identity = state.open_session(&username)?.clone();
        info!(username = %identity.username, role = %identity.role, "User logged in");
        Ok(identity)
    }

    /// Close the current session.
    ///
    /// Returns the username whose session was closed.
    pub fn logout(&self) -> Result<String, AccessError> {
        let username = self
            .write()
            .close_session()
            .ok_or(AccessError::NoActiveSession)?;
        info!(username = %username, "User logged out");
        Ok(username)
    }

    /// The logged-in identity, as currently stored.
    pub fn current_session(&self) -> Option<Identity> {
        self.read().session_identity().cloned()
    }

    /// Look up an identity by username (case-insensitive).
    pub fn find_by_username(&self, username: &str) -> Option<Identity> {
        self.read().get(&normalize_username(username)).cloned()
    }

    /// All identities, oldest first.
    pub fn identities(&self) -> Vec<Identity> {
        self.read().identities().into_iter().cloned().collect()
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the registry holds no identities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of administrators.
    pub fn administrator_count(&self) -> usize {
        self.read().administrator_count()
    }

    pub(crate) fn hasher(&self) -> &dyn CredentialHasher {
        self.hasher.as_ref()
    }

    /// Validate input, fail fast on visible conflicts, then hash.
    ///
    /// The returned identity is not yet stored; the caller commits it
    /// under the write lock, where uniqueness is checked again.
    pub(crate) fn prepare(
        &self,
        username: &str,
        password: &str,
        role: Role,
        profile: NewProfile,
    ) -> Result<Identity, AccessError> {
        validate_username(username)?;
        validate_password(password)?;
        if let Some(national_id) = profile.national_id() {
            validate_national_id(national_id)?;
        }

        let username = normalize_username(username);
        {
            let state = self.read();
            if state.contains(&username) {
                return Err(AccessError::DuplicateUsername(username));
            }
            if let Some(national_id) = profile.national_id() {
                state.ensure_national_id_free(national_id, None)?;
            }
        }

        self.new_identity(username, password, role, profile)
    }

    /// Hash the password and build an unstored identity.
    ///
    /// `username` must already be normalized.
    fn new_identity(
        &self,
        username: String,
        password: &str,
        role: Role,
        profile: NewProfile,
    ) -> Result<Identity, AccessError> {
        debug!(username = %username, "Hashing password");
        let password_digest = self.hasher.hash(password)?;

        Ok(Identity {
            id: UserId::new(),
            username,
            password_digest,
            role,
            profile: Profile::from_new(profile),
            created_at: Utc::now(),
            last_login: None,
        })
    }

    /// Lock the state for reading, recovering from poisoning.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Lock the state for writing, recovering from poisoning.
    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
