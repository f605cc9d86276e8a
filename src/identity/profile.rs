//! Profile model.
//!
//! A profile is the personal-data record owned by exactly one identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique profile identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(Uuid);

impl ProfileId {
    /// Generate a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Personal data attached to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique profile ID, immutable.
    pub id: ProfileId,
    /// National ID (DNI), unique across the registry when present.
    pub national_id: Option<String>,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Email address.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Birth date, free-form (the console suggests YYYY-MM-DD).
    pub birth_date: Option<String>,
}

impl Profile {
    /// Build a profile with a fresh ID from creation data.
    pub fn from_new(data: NewProfile) -> Self {
        Self {
            id: ProfileId::new(),
            national_id: non_empty(data.national_id),
            given_name: data.given_name,
            family_name: data.family_name,
            email: non_empty(data.email),
            phone: non_empty(data.phone),
            address: non_empty(data.address),
            birth_date: non_empty(data.birth_date),
        }
    }

    /// Get the full name, "given family".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
            .trim()
            .to_string()
    }

    /// Check if every personal field is unset.
    pub fn is_blank(&self) -> bool {
        self.national_id.is_none()
            && self.given_name.is_empty()
            && self.family_name.is_empty()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.birth_date.is_none()
    }

    /// Apply a sparse patch in place. Absent fields are left untouched.
    pub(crate) fn apply(&mut self, patch: ProfilePatch) {
        if let Some(national_id) = patch.national_id {
            self.national_id = national_id;
        }
        if let Some(given_name) = patch.given_name {
            self.given_name = given_name;
        }
        if let Some(family_name) = patch.family_name {
            self.family_name = family_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(birth_date) = patch.birth_date {
            self.birth_date = birth_date;
        }
    }

    /// List the non-empty fields as (label, value) pairs for display.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = Vec::new();
        if let Some(ref v) = self.national_id {
            fields.push(("National ID", v.as_str()));
        }
        if !self.given_name.is_empty() {
            fields.push(("Given name", self.given_name.as_str()));
        }
        if !self.family_name.is_empty() {
            fields.push(("Family name", self.family_name.as_str()));
        }
        for (label, value) in [
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("Address", &self.address),
            ("Birth date", &self.birth_date),
        ] {
            if let Some(v) = value {
                fields.push((label, v.as_str()));
            }
        }
        fields
    }
}

/// Data for creating a new profile.
///
/// Empty strings in optional fields are stored as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProfile {
    pub national_id: Option<String>,
    pub given_name: String,
    pub family_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<String>,
}

impl NewProfile {
    /// Create an all-empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the national ID.
    pub fn with_national_id(mut self, national_id: impl Into<String>) -> Self {
        self.national_id = Some(national_id.into());
        self
    }

    /// Set given and family name.
    pub fn with_name(mut self, given: impl Into<String>, family: impl Into<String>) -> Self {
        self.given_name = given.into();
        self.family_name = family.into();
        self
    }

    /// Set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set the postal address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the birth date.
    pub fn with_birth_date(mut self, birth_date: impl Into<String>) -> Self {
        self.birth_date = Some(birth_date.into());
        self
    }

    /// The national ID if one was given and is non-empty.
    pub fn national_id(&self) -> Option<&str> {
        self.national_id.as_deref().filter(|s| !s.is_empty())
    }
}

/// Sparse profile update.
///
/// `None` leaves a field untouched. For optional fields, `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub national_id: Option<Option<String>>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub birth_date: Option<Option<String>>,
}

impl ProfilePatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch from textual field names.
    ///
    /// Recognized names: `national_id`, `given_name`, `family_name`,
    /// `email`, `phone`, `address`, `birth_date`. Unknown names are
    /// ignored. An empty value clears an optional field.
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut patch = Self::new();
        for (key, value) in fields {
            let optional = || non_empty(Some(value.to_string()));
            match key {
                "national_id" => patch.national_id = Some(optional()),
                "given_name" => patch.given_name = Some(value.to_string()),
                "family_name" => patch.family_name = Some(value.to_string()),
                "email" => patch.email = Some(optional()),
                "phone" => patch.phone = Some(optional()),
                "address" => patch.address = Some(optional()),
                "birth_date" => patch.birth_date = Some(optional()),
                _ => {}
            }
        }
        patch
    }

    /// Set the national ID (`None` clears it).
    pub fn national_id(mut self, national_id: Option<String>) -> Self {
        self.national_id = Some(non_empty(national_id));
        self
    }

    /// Set the given name.
    pub fn given_name(mut self, given_name: impl Into<String>) -> Self {
        self.given_name = Some(given_name.into());
        self
    }

    /// Set the family name.
    pub fn family_name(mut self, family_name: impl Into<String>) -> Self {
        self.family_name = Some(family_name.into());
        self
    }

    /// Set the email (`None` clears it).
    pub fn email(mut self, email: Option<String>) -> Self {
        self.email = Some(non_empty(email));
        self
    }

    /// Set the phone (`None` clears it).
    pub fn phone(mut self, phone: Option<String>) -> Self {
        self.phone = Some(non_empty(phone));
        self
    }

    /// Set the address (`None` clears it).
    pub fn address(mut self, address: Option<String>) -> Self {
        self.address = Some(non_empty(address));
        self
    }

    /// Set the birth date (`None` clears it).
    pub fn birth_date(mut self, birth_date: Option<String>) -> Self {
        self.birth_date = Some(non_empty(birth_date));
        self
    }

    /// The new national ID, if the patch sets a non-empty one.
    pub fn new_national_id(&self) -> Option<&str> {
        self.national_id.as_ref().and_then(|v| v.as_deref())
    }

    /// Check if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.national_id.is_none()
            && self.given_name.is_none()
            && self.family_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.birth_date.is_none()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_new_drops_empty_optionals() {
        let profile = Profile::from_new(
            NewProfile::new()
                .with_national_id("")
                .with_name("Ana", "Gomez")
                .with_email(""),
        );
        assert_eq!(profile.national_id, None);
        assert_eq!(profile.email, None);
        assert_eq!(profile.full_name(), "Ana Gomez");
    }

    #[test]
    fn test_blank_profile() {
        let profile = Profile::from_new(NewProfile::new());
        assert!(profile.is_blank());
        assert!(profile.fields().is_empty());
        assert_eq!(profile.full_name(), "");
    }

    #[test]
    fn test_profile_ids_are_unique() {
        let a = Profile::from_new(NewProfile::new());
        let b = Profile::from_new(NewProfile::new());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_apply_is_sparse() {
        let mut profile = Profile::from_new(
            NewProfile::new()
                .with_national_id("30123456")
                .with_name("Ana", "Gomez")
                .with_phone("1155550000"),
        );
        let id = profile.id;

        profile.apply(ProfilePatch::new().email(Some("ana@example.com".into())));

        assert_eq!(profile.id, id);
        assert_eq!(profile.national_id.as_deref(), Some("30123456"));
        assert_eq!(profile.given_name, "Ana");
        assert_eq!(profile.phone.as_deref(), Some("1155550000"));
        assert_eq!(profile.email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn test_apply_clears_optional() {
        let mut profile = Profile::from_new(NewProfile::new().with_phone("1155550000"));
        profile.apply(ProfilePatch::new().phone(None));
        assert_eq!(profile.phone, None);
    }

    #[test]
    fn test_from_fields_ignores_unknown() {
        let patch = ProfilePatch::from_fields([
            ("given_name", "Pepe"),
            ("favourite_colour", "green"),
            ("national_id", "7654321"),
            ("email", ""),
        ]);
        assert_eq!(patch.given_name.as_deref(), Some("Pepe"));
        assert_eq!(patch.new_national_id(), Some("7654321"));
        assert_eq!(patch.email, Some(None));
        assert_eq!(patch.family_name, None);
        assert_eq!(patch.phone, None);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ProfilePatch::new().is_empty());
        assert!(ProfilePatch::from_fields([("unknown", "x")]).is_empty());
        assert!(!ProfilePatch::new().given_name("Ana").is_empty());
    }

    #[test]
    fn test_fields_lists_set_values() {
        let profile = Profile::from_new(
            NewProfile::new()
                .with_national_id("30123456")
                .with_name("Ana", "")
                .with_birth_date("1990-01-01"),
        );
        let fields = profile.fields();
        assert_eq!(
            fields,
            vec![
                ("National ID", "30123456"),
                ("Given name", "Ana"),
                ("Birth date", "1990-01-01"),
            ]
        );
    }
}
