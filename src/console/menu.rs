//! Menu handling module.
//!
//! Provides menu actions and parsing for the main menu. The available
//! options depend on whether someone is logged in and on their role.

use crate::identity::{Identity, Role};

/// Which menu is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuMode {
    /// Nobody is logged in.
    Guest,
    /// A standard user is logged in.
    Standard,
    /// An administrator is logged in.
    Administrator,
}

impl MenuMode {
    /// Pick the menu for the current session.
    pub fn for_session(session: Option<&Identity>) -> Self {
        match session.map(|s| s.role) {
            None => MenuMode::Guest,
            Some(Role::Standard) => MenuMode::Standard,
            Some(Role::Administrator) => MenuMode::Administrator,
        }
    }

    /// Menu entries as (key, action) pairs, in display order.
    pub fn items(&self) -> &'static [(&'static str, MenuAction)] {
        match self {
            MenuMode::Guest => GUEST_ITEMS,
            MenuMode::Standard => STANDARD_ITEMS,
            MenuMode::Administrator => ADMINISTRATOR_ITEMS,
        }
    }

    /// Menu title.
    pub fn title(&self) -> &'static str {
        match self {
            MenuMode::Guest => "Main menu",
            MenuMode::Standard => "User menu",
            MenuMode::Administrator => "Administrator menu",
        }
    }
}

const GUEST_ITEMS: &[(&str, MenuAction)] = &[
    ("1", MenuAction::Login),
    ("2", MenuAction::Register),
    ("0", MenuAction::Quit),
];

const STANDARD_ITEMS: &[(&str, MenuAction)] = &[
    ("1", MenuAction::ViewProfile),
    ("2", MenuAction::ChangePassword),
    ("3", MenuAction::UpdateProfile),
    ("4", MenuAction::Logout),
    ("0", MenuAction::Quit),
];

const ADMINISTRATOR_ITEMS: &[(&str, MenuAction)] = &[
    ("1", MenuAction::ListUsers),
    ("2", MenuAction::CreateUser),
    ("3", MenuAction::ChangePassword),
    ("4", MenuAction::UpdateProfile),
    ("5", MenuAction::DeleteUser),
    ("6", MenuAction::ChangeRole),
    ("7", MenuAction::Logout),
    ("0", MenuAction::Quit),
];

/// Menu action representing user's choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Log in (guest).
    Login,
    /// Register a new account and log in (guest).
    Register,
    /// List all users (administrator).
    ListUsers,
    /// Create a user with a full profile (administrator).
    CreateUser,
    /// Show the own profile (standard).
    ViewProfile,
    /// Change a password (own, or anyone's for administrators).
    ChangePassword,
    /// Update a profile (own, or anyone's for administrators).
    UpdateProfile,
    /// Delete a user (administrator).
    DeleteUser,
    /// Change a user's role (administrator).
    ChangeRole,
    /// Log out.
    Logout,
    /// Quit the program.
    Quit,
    /// Invalid or unknown action.
    Invalid(String),
}

impl MenuAction {
    /// Parse a menu action from user input.
    ///
    /// Accepts the numeric key shown in the menu, plus `Q` for quit and
    /// `L` for login or logout.
    pub fn parse(input: &str, mode: MenuMode) -> Self {
        let input = input.trim().to_uppercase();
        let logged_in = mode != MenuMode::Guest;

        match input.as_str() {
            "Q" => MenuAction::Quit,
            "L" if logged_in => MenuAction::Logout,
            "L" => MenuAction::Login,
            "" => MenuAction::Invalid(String::new()),
            key => mode
                .items()
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, action)| action.clone())
                .unwrap_or_else(|| MenuAction::Invalid(key.to_string())),
        }
    }

    /// Label shown in the menu.
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Login => "Log in",
            MenuAction::Register => "Register",
            MenuAction::ListUsers => "List users",
            MenuAction::CreateUser => "Create user",
            MenuAction::ViewProfile => "View my profile",
            MenuAction::ChangePassword => "Change password",
            MenuAction::UpdateProfile => "Update profile",
            MenuAction::DeleteUser => "Delete user",
            MenuAction::ChangeRole => "Change role",
            MenuAction::Logout => "Log out",
            MenuAction::Quit => "Quit",
            MenuAction::Invalid(_) => "",
        }
    }

    /// Check if this action is invalid.
    pub fn is_invalid(&self) -> bool {
        matches!(self, MenuAction::Invalid(_))
    }
}
