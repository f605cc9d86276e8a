//! Test helpers for integration tests.
//!
//! Provides a fast-hashing registry and account seeding helpers.

#![allow(dead_code)]

use std::sync::Arc;

use padron::config::BootstrapConfig;
use padron::{Argon2Hasher, Identity, IdentityRegistry, NewProfile, Role};

/// Password used for every seeded account.
pub const TEST_PASSWORD: &str = "Clave123";

/// Default administrator credentials.
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Argon2 with the smallest accepted costs, so tests stay fast.
pub fn fast_hasher() -> Arc<Argon2Hasher> {
    Arc::new(Argon2Hasher::new(8, 1, 1).unwrap())
}

/// Create a registry seeded with the default administrator.
pub fn setup_registry() -> IdentityRegistry {
    IdentityRegistry::new(fast_hasher(), BootstrapConfig::default()).unwrap()
}

/// Same as [`setup_registry`], shareable across threads.
pub fn setup_shared_registry() -> Arc<IdentityRegistry> {
    Arc::new(setup_registry())
}

/// The default administrator as currently stored.
pub fn admin(registry: &IdentityRegistry) -> Identity {
    registry.find_by_username(ADMIN_USERNAME).unwrap()
}

/// Register a standard user with [`TEST_PASSWORD`] and an empty profile.
pub fn create_standard_user(registry: &IdentityRegistry, username: &str) -> Identity {
    registry
        .register(username, TEST_PASSWORD, Role::Standard, NewProfile::new())
        .unwrap()
}

/// Register an administrator with [`TEST_PASSWORD`] and an empty profile.
pub fn create_administrator(registry: &IdentityRegistry, username: &str) -> Identity {
    registry
        .register(username, TEST_PASSWORD, Role::Administrator, NewProfile::new())
        .unwrap()
}
