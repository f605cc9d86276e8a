//! Identity and profile data model.

mod profile;
mod user;

pub use profile::{NewProfile, Profile, ProfileId, ProfilePatch};
pub use user::{Identity, IdentitySummary, Role, UserId};
