//! Authentication module for padron.
//!
//! This module provides password hashing, input validation predicates,
//! and role-based permission gates.

mod password;
pub mod permission;
pub mod validation;

pub use password::{Argon2Hasher, CredentialHasher, PasswordError};
pub use permission::{require_administrator, require_authenticated, require_self_or_administrator};
pub use validation::{
    normalize_username, validate_national_id, validate_password, validate_username,
    ValidationError,
};
