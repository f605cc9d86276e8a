//! Interactive console.
//!
//! A line-oriented menu over any `BufRead`/`Write` pair. All account logic
//! lives in [`IdentityRegistry`] and [`AccessManager`]; this module only
//! collects input and prints outcomes.

mod menu;

pub use menu::{MenuAction, MenuMode};

use std::io::{self, BufRead, Write};

use crate::access::AccessManager;
use crate::auth::validate_password;
use crate::identity::{Identity, NewProfile, ProfilePatch, Role};
use crate::registry::IdentityRegistry;

/// Attempts allowed for entering a new password twice.
pub const MAX_PASSWORD_ATTEMPTS: usize = 5;

/// Whether the menu loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Menu loop bound to a registry.
pub struct Console<'a, R, W> {
    registry: &'a IdentityRegistry,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    /// Create a new Console.
    pub fn new(registry: &'a IdentityRegistry, input: R, output: W) -> Self {
        Self {
            registry,
            input,
            output,
        }
    }

    /// Consume the console and return its output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the menu until the user quits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            let session = self.registry.current_session();
            let mode = MenuMode::for_session(session.as_ref());
            self.show_menu(mode, session.as_ref())?;

            let Some(choice) = self.prompt("Choose an option: ")? else {
                break;
            };
            let action = MenuAction::parse(&choice, mode);
            if self.dispatch(action, session.as_ref())? == Flow::Quit {
                break;
            }
        }
        writeln!(self.output, "Goodbye.")?;
        self.output.flush()
    }

    fn show_menu(&mut self, mode: MenuMode, session: Option<&Identity>) -> io::Result<()> {
        writeln!(self.output)?;
        match session {
            Some(s) => writeln!(
                self.output,
                "=== {} ({} - {}) ===",
                mode.title(),
                s.username,
                s.role.display_name()
            )?,
            None => writeln!(self.output, "=== {} ===", mode.title())?,
        }
        for (key, action) in mode.items() {
            writeln!(self.output, "  {key}. {}", action.label())?;
        }
        Ok(())
    }

    fn dispatch(&mut self, action: MenuAction, session: Option<&Identity>) -> io::Result<Flow> {
        match action {
            MenuAction::Login => self.login()?,
            MenuAction::Register => self.register()?,
            MenuAction::ListUsers => self.list_users()?,
            MenuAction::CreateUser => self.create_user(session)?,
            MenuAction::ViewProfile => self.view_profile(session)?,
            MenuAction::ChangePassword => self.change_password(session)?,
            MenuAction::UpdateProfile => self.update_profile(session)?,
            MenuAction::DeleteUser => self.delete_user(session)?,
            MenuAction::ChangeRole => self.change_role(session)?,
            MenuAction::Logout => self.logout()?,
            MenuAction::Quit => return Ok(Flow::Quit),
            MenuAction::Invalid(_) => writeln!(self.output, "Invalid option.")?,
        }
        Ok(Flow::Continue)
    }

    fn login(&mut self) -> io::Result<()> {
        let Some(username) = self.prompt("Username: ")? else {
            return Ok(());
        };
        let Some(password) = self.prompt("Password: ")? else {
            return Ok(());
        };
        match self.registry.login(&username, &password) {
            Ok(identity) => writeln!(self.output, "Welcome, {}.", display_name(&identity)),
            Err(e) => writeln!(self.output, "Error: {e}"),
        }
    }

    /// Self-registration: standard role, empty profile, then log in and
    /// fill in the profile.
    fn register(&mut self) -> io::Result<()> {
        let Some(username) = self.prompt("Choose a username: ")? else {
            return Ok(());
        };
        let Some(password) = self.prompt_new_password()? else {
            return Ok(());
        };

        if let Err(e) =
            self.registry
                .register(&username, &password, Role::Standard, NewProfile::new())
        {
            return writeln!(self.output, "Error: {e}");
        }
        let identity = match self.registry.login(&username, &password) {
            Ok(identity) => identity,
            Err(e) => return writeln!(self.output, "Error: {e}"),
        };
        writeln!(
            self.output,
            "Account '{}' created. Please complete your profile.",
            identity.username
        )?;

        let Some(profile) = self.prompt_new_profile()? else {
            return Ok(());
        };
        let manager = AccessManager::new(self.registry);
        match manager.update_profile(Some(&identity), &identity.username, profile_patch(profile)) {
            Ok(_) => writeln!(self.output, "Profile saved."),
            Err(e) => writeln!(self.output, "Error: {e}"),
        }
    }

    fn list_users(&mut self) -> io::Result<()> {
        let manager = AccessManager::new(self.registry);
        let users = manager.list_identities();
        writeln!(self.output, "{} user(s):", users.len())?;
        for user in users {
            let national_id = user.profile.national_id.as_deref().unwrap_or("-");
            writeln!(
                self.output,
                "  {:<20} {:<10} {:<10} {}",
                user.username,
                user.role.as_str(),
                national_id,
                user.profile.full_name()
            )?;
        }
        Ok(())
    }

    fn create_user(&mut self, session: Option<&Identity>) -> io::Result<()> {
        let Some(username) = self.prompt("New username: ")? else {
            return Ok(());
        };
        let Some(password) = self.prompt_new_password()? else {
            return Ok(());
        };
        let Some(profile) = self.prompt_new_profile()? else {
            return Ok(());
        };
        let Some(role) = self.prompt_role()? else {
            return Ok(());
        };

        let manager = AccessManager::new(self.registry);
        match manager.create_identity(session, &username, &password, profile, role) {
            Ok(created) => writeln!(
                self.output,
                "User '{}' created as {}.",
                created.username,
                created.role.display_name()
            ),
            Err(e) => writeln!(self.output, "Error: {e}"),
        }
    }

    fn view_profile(&mut self, session: Option<&Identity>) -> io::Result<()> {
        let Some(identity) = session else {
            return writeln!(self.output, "Nobody is logged in.");
        };
        writeln!(self.output, "Username: {}", identity.username)?;
        writeln!(self.output, "Role: {}", identity.role.display_name())?;
        if identity.profile.is_blank() {
            writeln!(self.output, "Your profile is empty.")?;
        }
        for (label, value) in identity.profile.fields() {
            writeln!(self.output, "{label}: {value}")?;
        }
        Ok(())
    }

    fn change_password(&mut self, session: Option<&Identity>) -> io::Result<()> {
        let Some(target) = self.prompt_target(session)? else {
            return Ok(());
        };
        let Some(password) = self.prompt_new_password()? else {
            return Ok(());
        };
        let manager = AccessManager::new(self.registry);
        match manager.change_password(session, &target, &password) {
            Ok(()) => writeln!(self.output, "Password changed."),
            Err(e) => writeln!(self.output, "Error: {e}"),
        }
    }

    fn update_profile(&mut self, session: Option<&Identity>) -> io::Result<()> {
        let Some(target) = self.prompt_target(session)? else {
            return Ok(());
        };
        let Some(current) = self.registry.find_by_username(&target) else {
            return writeln!(self.output, "Error: user '{target}' not found");
        };

        writeln!(
            self.output,
            "Press Enter to keep a value, '-' to clear an optional one."
        )?;
        let fields = [
            ("national_id", "National ID", current.profile.national_id.clone()),
            ("given_name", "Given name", Some(current.profile.given_name.clone())),
            ("family_name", "Family name", Some(current.profile.family_name.clone())),
            ("email", "Email", current.profile.email.clone()),
            ("phone", "Phone", current.profile.phone.clone()),
            ("address", "Address", current.profile.address.clone()),
            ("birth_date", "Birth date", current.profile.birth_date.clone()),
        ];

        let mut changes: Vec<(&str, String)> = Vec::new();
        for (key, label, value) in fields {
            let shown = value.unwrap_or_default();
            let Some(input) = self.prompt(&format!("{label} [{shown}]: "))? else {
                return Ok(());
            };
            match input.as_str() {
                "" => {}
                "-" => changes.push((key, String::new())),
                _ => changes.push((key, input)),
            }
        }

        let patch = ProfilePatch::from_fields(changes.iter().map(|(k, v)| (*k, v.as_str())));
        if patch.is_empty() {
            return writeln!(self.output, "Nothing to update.");
        }
        let manager = AccessManager::new(self.registry);
        match manager.update_profile(session, &target, patch) {
            Ok(_) => writeln!(self.output, "Profile updated."),
            Err(e) => writeln!(self.output, "Error: {e}"),
        }
    }

    fn delete_user(&mut self, session: Option<&Identity>) -> io::Result<()> {
        let Some(target) = self.prompt("Username to delete: ")? else {
            return Ok(());
        };
        let Some(confirm) = self.prompt(&format!("Delete '{target}'? (y/N): "))? else {
            return Ok(());
        };
        if !confirm.eq_ignore_ascii_case("y") {
            return writeln!(self.output, "Cancelled.");
        }
        let manager = AccessManager::new(self.registry);
        match manager.delete_identity(session, &target) {
            Ok(removed) => writeln!(self.output, "User '{}' deleted.", removed.username),
            Err(e) => writeln!(self.output, "Error: {e}"),
        }
    }

    fn change_role(&mut self, session: Option<&Identity>) -> io::Result<()> {
        let Some(target) = self.prompt("Username: ")? else {
            return Ok(());
        };
        let Some(role) = self.prompt_role()? else {
            return Ok(());
        };
        let manager = AccessManager::new(self.registry);
        match manager.change_role(session, &target, role) {
            Ok(updated) => writeln!(
                self.output,
                "User '{}' is now {}.",
                updated.username,
                updated.role.display_name()
            ),
            Err(e) => writeln!(self.output, "Error: {e}"),
        }
    }

    fn logout(&mut self) -> io::Result<()> {
        match self.registry.logout() {
            Ok(username) => writeln!(self.output, "Session of '{username}' closed."),
            Err(e) => writeln!(self.output, "Error: {e}"),
        }
    }

    /// Administrators choose the target; everyone else acts on themself.
    fn prompt_target(&mut self, session: Option<&Identity>) -> io::Result<Option<String>> {
        match session {
            Some(s) if s.is_administrator() => self.prompt("Username: "),
            Some(s) => Ok(Some(s.username.clone())),
            None => Ok(Some(String::new())),
        }
    }

    /// Ask for a new password twice until both entries match and pass
    /// the password rules.
    fn prompt_new_password(&mut self) -> io::Result<Option<String>> {
        for _ in 0..MAX_PASSWORD_ATTEMPTS {
            let Some(password) = self.prompt("New password: ")? else {
                return Ok(None);
            };
            let Some(confirm) = self.prompt("Repeat password: ")? else {
                return Ok(None);
            };
            if password != confirm {
                writeln!(self.output, "Passwords do not match.")?;
                continue;
            }
            if let Err(e) = validate_password(&password) {
                writeln!(self.output, "Error: {e}")?;
                continue;
            }
            return Ok(Some(password));
        }
        writeln!(self.output, "Too many attempts.")?;
        Ok(None)
    }

    fn prompt_new_profile(&mut self) -> io::Result<Option<NewProfile>> {
        let Some(national_id) = self.prompt_required("National ID")? else {
            return Ok(None);
        };
        let Some(given_name) = self.prompt_required("Given name")? else {
            return Ok(None);
        };
        let Some(family_name) = self.prompt_required("Family name")? else {
            return Ok(None);
        };

        let mut profile = NewProfile::new()
            .with_national_id(national_id)
            .with_name(given_name, family_name);
        let Some(email) = self.prompt("Email (optional): ")? else {
            return Ok(None);
        };
        profile = profile.with_email(email);
        let Some(phone) = self.prompt("Phone (optional): ")? else {
            return Ok(None);
        };
        profile = profile.with_phone(phone);
        let Some(address) = self.prompt("Address (optional): ")? else {
            return Ok(None);
        };
        profile = profile.with_address(address);
        let Some(birth_date) = self.prompt("Birth date (optional): ")? else {
            return Ok(None);
        };
        Ok(Some(profile.with_birth_date(birth_date)))
    }

    fn prompt_role(&mut self) -> io::Result<Option<Role>> {
        loop {
            let Some(input) = self.prompt("Role (admin/standard) [standard]: ")? else {
                return Ok(None);
            };
            if input.is_empty() {
                return Ok(Some(Role::Standard));
            }
            match input.parse::<Role>() {
                Ok(role) => return Ok(Some(role)),
                Err(e) => writeln!(self.output, "Error: {e}")?,
            }
        }
    }

    fn prompt_required(&mut self, label: &str) -> io::Result<Option<String>> {
        loop {
            let Some(value) = self.prompt(&format!("{label}: "))? else {
                return Ok(None);
            };
            if !value.is_empty() {
                return Ok(Some(value));
            }
            writeln!(self.output, "{label} is required.")?;
        }
    }

    /// Print `label` and read one trimmed line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn display_name(identity: &Identity) -> String {
    let full_name = identity.profile.full_name();
    if full_name.is_empty() {
        identity.username.clone()
    } else {
        full_name
    }
}

/// Turn a freshly entered profile into a patch that sets every field.
fn profile_patch(profile: NewProfile) -> ProfilePatch {
    ProfilePatch::new()
        .national_id(profile.national_id)
        .given_name(profile.given_name)
        .family_name(profile.family_name)
        .email(profile.email)
        .phone(profile.phone)
        .address(profile.address)
        .birth_date(profile.birth_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2Hasher;
    use crate::config::BootstrapConfig;
    use std::io::Cursor;
    use std::sync::Arc;

    fn create_test_registry() -> IdentityRegistry {
        let hasher = Arc::new(Argon2Hasher::new(8, 1, 1).unwrap());
        IdentityRegistry::new(hasher, BootstrapConfig::default()).unwrap()
    }

    fn run_script(registry: &IdentityRegistry, script: &str) -> String {
        let mut console = Console::new(registry, Cursor::new(script.to_string()), Vec::new());
        console.run().unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn test_quit_from_guest_menu() {
        let registry = create_test_registry();
        let output = run_script(&registry, "0\n");
        assert!(output.contains("=== Main menu ==="));
        assert!(output.contains("Goodbye."));
    }

    #[test]
    fn test_end_of_input_stops_loop() {
        let registry = create_test_registry();
        let output = run_script(&registry, "");
        assert!(output.contains("Goodbye."));
    }

    #[test]
    fn test_invalid_option() {
        let registry = create_test_registry();
        let output = run_script(&registry, "9\n0\n");
        assert!(output.contains("Invalid option."));
    }

    #[test]
    fn test_login_shows_admin_menu() {
        let registry = create_test_registry();
        let output = run_script(&registry, "1\nadmin\nadmin123\n0\n");
        assert!(output.contains("Welcome, Admin Principal."));
        assert!(output.contains("=== Administrator menu (admin - Administrator) ==="));
        assert!(output.contains("Delete user"));
    }

    #[test]
    fn test_login_failure_message() {
        let registry = create_test_registry();
        let output = run_script(&registry, "1\nadmin\nwrong\n0\n");
        assert!(output.contains("Error: invalid username or password"));
        assert!(registry.current_session().is_none());
    }

    #[test]
    fn test_password_mismatch_then_match() {
        let registry = create_test_registry();
        let script = "2\nana\nClave123\nClave124\nClave123\nClave123\n\
                      30123456\nAna\nGómez\n\n\n\n\n0\n";
        let output = run_script(&registry, script);

        assert!(output.contains("Passwords do not match."));
        assert!(output.contains("Account 'ana' created."));
        assert!(output.contains("Profile saved."));

        let ana = registry.find_by_username("ana").unwrap();
        assert_eq!(ana.profile.national_id.as_deref(), Some("30123456"));
        assert_eq!(ana.profile.email, None);
        assert_eq!(registry.current_session().unwrap().username, "ana");
    }

    #[test]
    fn test_too_many_password_attempts() {
        let registry = create_test_registry();
        let script = "2\nana\n".to_string() + &"abc\nxyz\n".repeat(MAX_PASSWORD_ATTEMPTS) + "0\n";
        let output = run_script(&registry, &script);

        assert!(output.contains("Too many attempts."));
        assert!(registry.find_by_username("ana").is_none());
    }

    #[test]
    fn test_admin_delete_last_admin_is_refused() {
        let registry = create_test_registry();
        let output = run_script(&registry, "1\nadmin\nadmin123\n5\nadmin\ny\n0\n");
        assert!(output.contains(
            "Error: cannot delete or demote the only remaining administrator"
        ));
        assert_eq!(registry.administrator_count(), 1);
    }

    #[test]
    fn test_standard_user_views_own_profile_and_logs_out() {
        let registry = create_test_registry();
        registry
            .register(
                "pepe",
                "Clave123",
                Role::Standard,
                NewProfile::new().with_name("Pepe", "Pérez"),
            )
            .unwrap();

        let output = run_script(&registry, "1\nPEPE\nClave123\n1\n4\n0\n");
        assert!(output.contains("=== User menu (pepe - Standard user) ==="));
        assert!(output.contains("Given name: Pepe"));
        assert!(output.contains("Session of 'pepe' closed."));
        assert!(registry.current_session().is_none());
    }

    #[test]
    fn test_standard_user_updates_own_profile() {
        let registry = create_test_registry();
        registry
            .register("pepe", "Clave123", Role::Standard, NewProfile::new())
            .unwrap();

        // Keep everything except phone
        let script = "1\npepe\nClave123\n3\n\n\n\n\n5550000\n\n\n0\n";
        let output = run_script(&registry, script);
        assert!(output.contains("Profile updated."));
        assert_eq!(
            registry
                .find_by_username("pepe")
                .unwrap()
                .profile
                .phone
                .as_deref(),
            Some("5550000")
        );
    }
}
