//! Snapshot persistence tests for padron.

mod common;

use common::{admin, create_standard_user, setup_registry, TEST_PASSWORD};
use padron::{AccessManager, ErrorKind, NewProfile, PadronError, RegistrySnapshot, Role};
use tempfile::TempDir;

#[test]
fn test_save_restore_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.json");

    let source = setup_registry();
    let manager = AccessManager::new(&source);
    manager
        .create_identity(
            Some(&admin(&source)),
            "ana",
            TEST_PASSWORD,
            NewProfile::new()
                .with_national_id("30123456")
                .with_name("Ana", "Gómez")
                .with_birth_date("1995-03-14"),
            Role::Standard,
        )
        .unwrap();
    source.snapshot().save(&path).unwrap();

    let target = setup_registry();
    target.restore(RegistrySnapshot::load(&path).unwrap()).unwrap();

    let ana = target.find_by_username("ana").unwrap();
    assert_eq!(ana, source.find_by_username("ana").unwrap());
    assert_eq!(ana.profile.birth_date.as_deref(), Some("1995-03-14"));
    assert!(target.login("ana", TEST_PASSWORD).is_ok());

    // Restored national IDs are still enforced
    let err = target
        .register(
            "pepe",
            TEST_PASSWORD,
            Role::Standard,
            NewProfile::new().with_national_id("30123456"),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateNationalId);
}

#[test]
fn test_snapshot_file_has_no_plaintext() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.json");

    let registry = setup_registry();
    create_standard_user(&registry, "ana");
    registry.snapshot().save(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(!content.contains(TEST_PASSWORD));
    assert!(!content.contains("admin123"));
    assert!(content.contains("\"username\": \"ana\""));
}

#[test]
fn test_load_corrupt_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        RegistrySnapshot::load(&path),
        Err(PadronError::Snapshot(_))
    ));
}
