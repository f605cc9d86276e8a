//! Permission checking for padron.
//!
//! Role gates consulted by the access manager. Role differences are
//! expressed as explicit branches on [`Role`], never through per-role
//! types.

use crate::error::AccessError;
use crate::identity::{Identity, Role};

/// Require a logged-in actor.
///
/// # Examples
///
/// ```
/// use padron::auth::permission::require_authenticated;
/// use padron::ErrorKind;
///
/// let err = require_authenticated(None).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::Unauthenticated);
/// ```
pub fn require_authenticated(actor: Option<&Identity>) -> Result<&Identity, AccessError> {
    actor.ok_or(AccessError::Unauthenticated)
}

/// Require an administrator actor.
///
/// A missing actor is reported as `Forbidden`, same as a standard one:
/// administrator-only operations are denied without distinguishing why.
///
/// * `action` - Short description used in the error message
pub fn require_administrator<'a>(
    actor: Option<&'a Identity>,
    action: &str,
) -> Result<&'a Identity, AccessError> {
    match actor {
        Some(actor) if actor.role == Role::Administrator => Ok(actor),
        _ => Err(AccessError::Forbidden(format!(
            "only administrators can {action}"
        ))),
    }
}

/// Require an actor acting on their own account, or an administrator.
///
/// Rules:
/// - No actor: `Unauthenticated`
/// - Administrators may act on any account
/// - Standard users may only act on their own username
///
/// `target_username` must already be normalized.
pub fn require_self_or_administrator<'a>(
    actor: Option<&'a Identity>,
    target_username: &str,
    action: &str,
) -> Result<&'a Identity, AccessError> {
    let actor = require_authenticated(actor)?;
    match actor.role {
        Role::Administrator => Ok(actor),
        Role::Standard if actor.username == target_username => Ok(actor),
        Role::Standard => Err(AccessError::Forbidden(format!(
            "you can only {action} of your own account"
        ))),
    }
}
