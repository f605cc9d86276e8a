//! Registry snapshots.
//!
//! A snapshot is the full identity set serialized as JSON. It carries
//! password digests only; the session slot is never persisted.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{IdentityRegistry, RegistryState};
use crate::auth::{normalize_username, validate_national_id, validate_username};
use crate::error::AccessError;
use crate::identity::{Identity, Role};
use crate::{PadronError, Result};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of every identity in a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub identities: Vec<Identity>,
}

impl RegistrySnapshot {
    /// Write the snapshot to `path` as pretty-printed JSON.
    ///
    /// Parent directories are created as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a snapshot written by [`RegistrySnapshot::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let snapshot: Self = serde_json::from_str(&content)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PadronError::Config(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }
}

impl IdentityRegistry {
    /// Copy every identity into a snapshot.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            identities: self.identities(),
        }
    }

    /// Replace the registry contents with `snapshot`.
    ///
    /// Usernames and national IDs must be valid and unique, and every
    /// digest must be a hash the registry's hasher can read. Otherwise the
    /// registry is left untouched. The session is closed.
    ///
    /// If the snapshot holds no administrator, an identity named like the
    /// default administrator is promoted; failing that, the default
    /// administrator is seeded, without its national ID if another
    /// identity already holds it.
    pub fn restore(&self, snapshot: RegistrySnapshot) -> std::result::Result<(), AccessError> {
        let mut restored = RegistryState::default();
        for mut identity in snapshot.identities {
            validate_username(&identity.username)?;
            identity.username = normalize_username(&identity.username);
            if let Some(ref national_id) = identity.profile.national_id {
                validate_national_id(national_id)?;
            }
            self.hasher.check_digest(&identity.password_digest)?;
            restored.insert(identity)?;
        }

        if restored.administrator_count() == 0 {
            self.reseed_administrator(&mut restored)?;
        }

        let count = restored.len();
        *self.write() = restored;
        info!(identities = count, "Registry restored from snapshot");
        Ok(())
    }

    fn reseed_administrator(
        &self,
        restored: &mut RegistryState,
    ) -> std::result::Result<(), AccessError> {
        let username = normalize_username(&self.bootstrap.username);
        if restored.contains(&username) {
            restored.set_role(&username, Role::Administrator)?;
            warn!(username = %username, "No administrator in snapshot, promoted default administrator account");
            return Ok(());
        }

        let mut profile = self.bootstrap.profile();
        let clash = profile
            .national_id()
            .is_some_and(|id| restored.ensure_national_id_free(id, None).is_err());
        if clash {
            warn!(username = %username, "Bootstrap national ID already taken, seeding without it");
            profile.national_id = None;
        }

        let seed = self.new_identity(
            username,
            &self.bootstrap.password,
            Role::Administrator,
            profile,
        )?;
        let created = restored.insert(seed)?;
        info!(username = %created.username, "Default administrator seeded into restored registry");
        Ok(())
    }
}
