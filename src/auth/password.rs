//! Password hashing for padron.
//!
//! Uses Argon2id for salted, deliberately slow password hashing. The
//! registry only sees the [`CredentialHasher`] trait, so tests and
//! alternative deployments can plug in their own work factor.

use std::fmt::Debug;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use thiserror::Error;

use crate::config::HashingConfig;

/// Password-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Argon2 rejected the configured parameters.
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),

    /// Stored digest is not a valid PHC string.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// One-way, salted password hashing primitive.
pub trait CredentialHasher: Send + Sync + Debug {
    /// Hash a plaintext password into an opaque digest.
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Check a plaintext password against a digest produced by [`hash`].
    ///
    /// Returns `Ok(false)` on mismatch and `Err` only when the digest is
    /// unreadable.
    ///
    /// [`hash`]: CredentialHasher::hash
    fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordError>;

    /// Check that `digest` has the shape of a stored hash.
    ///
    /// Used on digests that did not come from [`hash`] in this process,
    /// such as snapshot contents.
    ///
    /// [`hash`]: CredentialHasher::hash
    fn check_digest(&self, digest: &str) -> Result<(), PasswordError>;
}

/// Argon2id implementation of [`CredentialHasher`].
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Create a hasher with explicit Argon2 costs.
    ///
    /// * `memory_kib` - Memory cost in KiB
    /// * `iterations` - Time cost
    /// * `parallelism` - Lanes
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    /// Create a hasher from the `[hashing]` configuration section.
    pub fn from_config(config: &HashingConfig) -> Result<Self, PasswordError> {
        Self::new(config.memory_kib, config.iterations, config.parallelism)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(digest).map_err(|_| PasswordError::InvalidHash)?;
        // Parameters come from the stored digest, not from self.params.
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn check_digest(&self, digest: &str) -> Result<(), PasswordError> {
        let parsed = PasswordHash::new(digest).map_err(|_| PasswordError::InvalidHash)?;
        if parsed.hash.is_none() || Algorithm::new(parsed.algorithm.as_str()).is_err() {
            return Err(PasswordError::InvalidHash);
        }
        Ok(())
    }
}
