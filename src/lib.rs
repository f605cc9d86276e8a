//! Padron - identity and access management core.
//!
//! An in-memory registry of user accounts with a single session slot,
//! role-gated account management, and an interactive console.

pub mod access;
pub mod auth;
pub mod config;
pub mod console;
pub mod error;
pub mod identity;
pub mod logging;
pub mod registry;

pub use access::AccessManager;
pub use auth::{Argon2Hasher, CredentialHasher, PasswordError, ValidationError};
pub use config::Config;
pub use console::Console;
pub use error::{AccessError, ErrorKind, PadronError, Result};
pub use identity::{
    Identity, IdentitySummary, NewProfile, Profile, ProfileId, ProfilePatch, Role, UserId,
};
pub use registry::{IdentityRegistry, RegistrySnapshot};
