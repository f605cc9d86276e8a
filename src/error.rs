//! Error types for padron.

use thiserror::Error;

use crate::auth::{PasswordError, ValidationError};

/// Machine-checkable kind of an [`AccessError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateUsername,
    DuplicateNationalId,
    InvalidCredentials,
    NoActiveSession,
    Unauthenticated,
    Forbidden,
    NotFound,
    LastAdminProtected,
    InvalidPassword,
    InvalidNationalId,
    InvalidUsername,
    Hashing,
}

/// Outcome of a rejected registry or access-manager operation.
///
/// Every variant is an expected, locally recoverable condition except
/// [`AccessError::Hashing`], which reports a failure of the hashing
/// primitive itself.
#[derive(Error, Debug)]
pub enum AccessError {
    /// Username is already registered (case-insensitive).
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    /// National ID is already held by another profile.
    #[error("national ID '{0}' is already registered to another user")]
    DuplicateNationalId(String),

    /// Unknown username or wrong password. Deliberately undifferentiated.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Logout requested while nobody is logged in.
    #[error("no user is logged in")]
    NoActiveSession,

    /// The operation needs a logged-in user.
    #[error("you must be logged in to perform this operation")]
    Unauthenticated,

    /// The acting user lacks the required role.
    #[error("access denied: {0}")]
    Forbidden(String),

    /// Target user does not exist.
    #[error("user '{0}' not found")]
    NotFound(String),

    /// Operation would leave the registry without an administrator.
    #[error("cannot delete or demote the only remaining administrator")]
    LastAdminProtected,

    /// Password failed the strength predicate.
    #[error("invalid password: {0}")]
    InvalidPassword(ValidationError),

    /// National ID failed the format predicate.
    #[error("invalid national ID: {0}")]
    InvalidNationalId(ValidationError),

    /// Username failed the sanity predicate.
    #[error("invalid username: {0}")]
    InvalidUsername(ValidationError),

    /// The hashing primitive failed.
    #[error("{0}")]
    Hashing(#[from] PasswordError),
}

impl AccessError {
    /// Get the machine-checkable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccessError::DuplicateUsername(_) => ErrorKind::DuplicateUsername,
            AccessError::DuplicateNationalId(_) => ErrorKind::DuplicateNationalId,
            AccessError::InvalidCredentials => ErrorKind::InvalidCredentials,
            AccessError::NoActiveSession => ErrorKind::NoActiveSession,
            AccessError::Unauthenticated => ErrorKind::Unauthenticated,
            AccessError::Forbidden(_) => ErrorKind::Forbidden,
            AccessError::NotFound(_) => ErrorKind::NotFound,
            AccessError::LastAdminProtected => ErrorKind::LastAdminProtected,
            AccessError::InvalidPassword(_) => ErrorKind::InvalidPassword,
            AccessError::InvalidNationalId(_) => ErrorKind::InvalidNationalId,
            AccessError::InvalidUsername(_) => ErrorKind::InvalidUsername,
            AccessError::Hashing(_) => ErrorKind::Hashing,
        }
    }
}

impl From<ValidationError> for AccessError {
    fn from(e: ValidationError) -> Self {
        if e.is_password_error() {
            AccessError::InvalidPassword(e)
        } else if e.is_national_id_error() {
            AccessError::InvalidNationalId(e)
        } else {
            AccessError::InvalidUsername(e)
        }
    }
}

/// Common error type for padron process-level operations.
#[derive(Error, Debug)]
pub enum PadronError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Snapshot (de)serialization error.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Registry or access-control error.
    #[error("{0}")]
    Access(#[from] AccessError),
}

/// Result type alias for padron operations.
pub type Result<T> = std::result::Result<T, PadronError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(
            AccessError::DuplicateUsername("ana".into()).kind(),
            ErrorKind::DuplicateUsername
        );
        assert_eq!(
            AccessError::InvalidCredentials.kind(),
            ErrorKind::InvalidCredentials
        );
        assert_eq!(
            AccessError::LastAdminProtected.kind(),
            ErrorKind::LastAdminProtected
        );
        assert_eq!(
            AccessError::Forbidden("x".into()).kind(),
            ErrorKind::Forbidden
        );
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: AccessError = ValidationError::PasswordTooShort.into();
        assert_eq!(err.kind(), ErrorKind::InvalidPassword);

        let err: AccessError = ValidationError::NationalIdNotNumeric.into();
        assert_eq!(err.kind(), ErrorKind::InvalidNationalId);

        let err: AccessError = ValidationError::UsernameEmpty.into();
        assert_eq!(err.kind(), ErrorKind::InvalidUsername);
    }

    #[test]
    fn test_messages_name_the_rule() {
        let err = AccessError::DuplicateNationalId("30123456".into());
        assert!(err.to_string().contains("30123456"));

        let err = AccessError::NotFound("pepe".into());
        assert_eq!(err.to_string(), "user 'pepe' not found");

        let err = AccessError::InvalidPassword(ValidationError::PasswordMissingDigit);
        assert!(err.to_string().contains("digit"));
    }

    #[test]
    fn test_invalid_credentials_does_not_leak() {
        let msg = AccessError::InvalidCredentials.to_string();
        assert!(!msg.contains("not found"));
        assert!(!msg.contains("wrong"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PadronError = io_err.into();
        assert!(matches!(err, PadronError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_access_error_wraps_into_padron_error() {
        let err: PadronError = AccessError::NoActiveSession.into();
        assert_eq!(err.to_string(), "no user is logged in");
    }
}
