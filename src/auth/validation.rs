//! Input validation predicates.
//!
//! These gate every mutation that stores a password or a national ID,
//! and the username of every new identity.

use thiserror::Error;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum national ID length.
pub const MIN_NATIONAL_ID_LENGTH: usize = 7;

/// Maximum national ID length.
pub const MAX_NATIONAL_ID_LENGTH: usize = 8;

/// Maximum username length in characters.
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// Password has no alphabetic character.
    #[error("password must contain at least one letter")]
    PasswordMissingLetter,

    /// Password has no digit.
    #[error("password must contain at least one digit")]
    PasswordMissingDigit,

    /// National ID contains something other than digits.
    #[error("national ID must contain digits only")]
    NationalIdNotNumeric,

    /// National ID has the wrong number of digits.
    #[error(
        "national ID must be {MIN_NATIONAL_ID_LENGTH} to {MAX_NATIONAL_ID_LENGTH} digits long"
    )]
    NationalIdLength,

    /// Username is empty.
    #[error("username cannot be empty")]
    UsernameEmpty,

    /// Username is too long.
    #[error("username must be at most {MAX_USERNAME_LENGTH} characters")]
    UsernameTooLong,

    /// Username contains whitespace or control characters.
    #[error("username cannot contain whitespace or control characters")]
    UsernameInvalidChars,
}

impl ValidationError {
    /// Check if this error comes from the password predicate.
    pub fn is_password_error(&self) -> bool {
        matches!(
            self,
            ValidationError::PasswordTooShort
                | ValidationError::PasswordMissingLetter
                | ValidationError::PasswordMissingDigit
        )
    }

    /// Check if this error comes from the national ID predicate.
    pub fn is_national_id_error(&self) -> bool {
        matches!(
            self,
            ValidationError::NationalIdNotNumeric | ValidationError::NationalIdLength
        )
    }
}

/// Validate a password.
///
/// Requirements:
/// - At least 6 characters
/// - At least one alphabetic character
/// - At least one ASCII digit (`0`-`9`)
///
/// # Examples
///
/// ```
/// use padron::auth::validation::validate_password;
///
/// assert!(validate_password("Clave123").is_ok());
/// assert!(validate_password("abc12").is_err()); // too short
/// assert!(validate_password("abcdefg").is_err()); // no digit
/// ```
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if !password.chars().any(char::is_alphabetic) {
        return Err(ValidationError::PasswordMissingLetter);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordMissingDigit);
    }
    Ok(())
}

/// Validate a national ID (DNI).
///
/// Requirements:
/// - Digits only
/// - 7 or 8 digits long
///
/// # Examples
///
/// ```
/// use padron::auth::validation::validate_national_id;
///
/// assert!(validate_national_id("30123456").is_ok());
/// assert!(validate_national_id("1234567").is_ok());
/// assert!(validate_national_id("12345678A").is_err());
/// ```
pub fn validate_national_id(national_id: &str) -> Result<(), ValidationError> {
    if national_id.is_empty() || !national_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NationalIdNotNumeric);
    }
    let len = national_id.len();
    if !(MIN_NATIONAL_ID_LENGTH..=MAX_NATIONAL_ID_LENGTH).contains(&len) {
        return Err(ValidationError::NationalIdLength);
    }
    Ok(())
}

/// Validate a username before normalization.
///
/// Leading and trailing whitespace is ignored; what remains must be
/// non-empty, at most 32 characters, and free of whitespace and control
/// characters.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::UsernameEmpty);
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong);
    }
    if username
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(ValidationError::UsernameInvalidChars);
    }
    Ok(())
}

/// Normalize a username for storage and lookup.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}
