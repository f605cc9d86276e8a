//! Identity model.
//!
//! This module defines the Identity struct and Role enum for account
//! management.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Profile;

/// Account role for permission management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account, may only act on itself.
    #[default]
    Standard,
    /// Administrator, may act on any account.
    #[serde(rename = "admin", alias = "administrator")]
    Administrator,
}

impl Role {
    /// Convert role to its short string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Standard => "standard",
            Role::Administrator => "admin",
        }
    }

    /// Get display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Standard => "Standard user",
            Role::Administrator => "Administrator",
        }
    }

    /// Check if this is the administrator role.
    pub fn is_administrator(&self) -> bool {
        *self == Role::Administrator
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "administrator" => Ok(Role::Administrator),
            "standard" => Ok(Role::Standard),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// Unique identity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An account: credentials, role, and an owned profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique user ID, immutable.
    pub id: UserId,
    /// Login name, lowercase, unique.
    pub username: String,
    /// Password digest (Argon2 PHC string). Never plaintext.
    pub password_digest: String,
    /// Role for permissions.
    pub role: Role,
    /// Owned personal data.
    pub profile: Profile,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last successful login.
    pub last_login: Option<DateTime<Utc>>,
}

impl Identity {
    /// Check if this identity is an administrator.
    pub fn is_administrator(&self) -> bool {
        self.role.is_administrator()
    }

    /// Project into the public listing shape.
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            username: self.username.clone(),
            role: self.role,
            profile: self.profile.clone(),
        }
    }
}

/// Listing entry: everything about an identity except its credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySummary {
    pub username: String,
    pub role: Role,
    pub profile: Profile,
}
