//! Access control tests for padron.
//!
//! End-to-end checks of the registry and access manager through the
//! public API only.

mod common;

use common::{admin, create_administrator, create_standard_user, setup_registry, TEST_PASSWORD};
use padron::{AccessManager, ErrorKind, NewProfile, ProfilePatch, Role};

#[test]
fn test_fresh_registry_walkthrough() {
    let registry = setup_registry();

    let all = registry.identities();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].username, "admin");
    assert_eq!(all[0].role, Role::Administrator);

    let ana = registry
        .register(
            "ana",
            "Clave123",
            Role::Standard,
            NewProfile::new().with_national_id("30123456"),
        )
        .unwrap();
    assert_ne!(ana.id, all[0].id);
    assert_eq!(ana.profile.national_id.as_deref(), Some("30123456"));

    let err = registry
        .register("ana", "Other123", Role::Standard, NewProfile::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateUsername);

    let err = registry.login("ana", "wrong").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
    assert!(registry.current_session().is_none());
}

#[test]
fn test_failed_login_keeps_existing_session() {
    let registry = setup_registry();
    create_standard_user(&registry, "ana");

    registry.login("admin", "admin123").unwrap();
    assert!(registry.login("ana", "wrong").is_err());
    assert_eq!(registry.current_session().unwrap().username, "admin");
}

#[test]
fn test_username_case_insensitive() {
    let registry = setup_registry();

    let err = registry
        .register("Admin", TEST_PASSWORD, Role::Standard, NewProfile::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateUsername);

    registry
        .register("Pepe", TEST_PASSWORD, Role::Standard, NewProfile::new())
        .unwrap();
    let pepe = registry.login("PEPE", TEST_PASSWORD).unwrap();
    assert_eq!(pepe.username, "pepe");
}

#[test]
fn test_national_id_uniqueness_on_update() {
    let registry = setup_registry();
    let manager = AccessManager::new(&registry);
    let admin = admin(&registry);
    manager
        .create_identity(
            Some(&admin),
            "ana",
            TEST_PASSWORD,
            NewProfile::new().with_national_id("30123456"),
            Role::Standard,
        )
        .unwrap();
    let pepe = create_standard_user(&registry, "pepe");

    let err = manager
        .update_profile(
            Some(&pepe),
            "pepe",
            ProfilePatch::from_fields([("national_id", "30123456")]),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateNationalId);

    let ana = registry.find_by_username("ana").unwrap();
    let updated = manager
        .update_profile(
            Some(&ana),
            "ana",
            ProfilePatch::from_fields([("national_id", "30123456"), ("email", "ana@example.com")]),
        )
        .unwrap();
    assert_eq!(updated.profile.email.as_deref(), Some("ana@example.com"));
}

#[test]
fn test_last_admin_protection_with_one_and_two_admins() {
    let registry = setup_registry();
    let manager = AccessManager::new(&registry);
    let admin = admin(&registry);

    assert_eq!(
        manager
            .delete_identity(Some(&admin), "admin")
            .unwrap_err()
            .kind(),
        ErrorKind::LastAdminProtected
    );
    assert_eq!(
        manager
            .change_role(Some(&admin), "admin", Role::Standard)
            .unwrap_err()
            .kind(),
        ErrorKind::LastAdminProtected
    );

    create_administrator(&registry, "jefa");
    manager
        .change_role(Some(&admin), "admin", Role::Standard)
        .unwrap();

    let jefa = registry.find_by_username("jefa").unwrap();
    manager
        .change_role(Some(&jefa), "admin", Role::Administrator)
        .unwrap();
    manager.delete_identity(Some(&jefa), "admin").unwrap();
    assert_eq!(registry.administrator_count(), 1);
}

#[test]
fn test_password_change_round_trip() {
    let registry = setup_registry();
    let manager = AccessManager::new(&registry);
    let ana = create_standard_user(&registry, "ana");

    manager
        .change_password(Some(&ana), "ana", "NewPass1")
        .unwrap();

    assert!(registry.login("ana", "NewPass1").is_ok());
    assert_eq!(
        registry.login("ana", TEST_PASSWORD).unwrap_err().kind(),
        ErrorKind::InvalidCredentials
    );
}

#[test]
fn test_standard_user_authorization_gate() {
    let registry = setup_registry();
    let manager = AccessManager::new(&registry);
    let ana = create_standard_user(&registry, "ana");
    create_standard_user(&registry, "pepe");

    assert_eq!(
        manager
            .change_password(Some(&ana), "pepe", "NewPass1")
            .unwrap_err()
            .kind(),
        ErrorKind::Forbidden
    );
    assert_eq!(
        manager
            .update_profile(Some(&ana), "pepe", ProfilePatch::new().given_name("X"))
            .unwrap_err()
            .kind(),
        ErrorKind::Forbidden
    );

    assert!(manager
        .change_password(Some(&ana), "ana", "NewPass1")
        .is_ok());
    assert!(manager
        .update_profile(Some(&ana), "ana", ProfilePatch::new().given_name("Ana"))
        .is_ok());
}

#[test]
fn test_session_lifecycle() {
    let registry = setup_registry();
    let manager = AccessManager::new(&registry);
    create_administrator(&registry, "jefa");

    assert!(registry.current_session().is_none());
    let jefa = registry.login("jefa", TEST_PASSWORD).unwrap();
    assert!(registry.current_session().is_some());

    // Role change is visible through the session immediately
    manager
        .change_role(Some(&jefa), "jefa", Role::Standard)
        .unwrap();
    assert_eq!(registry.current_session().unwrap().role, Role::Standard);

    // Deleting the logged-in user ends the session
    manager
        .delete_identity(Some(&admin(&registry)), "jefa")
        .unwrap();
    assert!(registry.current_session().is_none());
    assert_eq!(
        registry.logout().unwrap_err().kind(),
        ErrorKind::NoActiveSession
    );
}

#[test]
fn test_listing_is_open_to_everyone() {
    let registry = setup_registry();
    let manager = AccessManager::new(&registry);
    create_standard_user(&registry, "ana");

    let listing = manager.list_identities();
    let names: Vec<&str> = listing.iter().map(|s| s.username.as_str()).collect();
    assert_eq!(names, vec!["admin", "ana"]);
}
