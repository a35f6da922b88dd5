//! Tests for SquirrelStore
//!
//! These tests verify:
//! - Id assignment (unique, monotonic, never reused)
//! - Lookup misses are absence, not errors
//! - Update keeps id and position
//! - Delete removes exactly one record
//! - Persistence across reopen

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use squirreldb::store::{JsonCodec, RecordFile, Squirrel, SquirrelRepository, SquirrelStore};
use squirreldb::SquirrelError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store() -> (TempDir, SquirrelStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = SquirrelStore::open(temp_dir.path().join("squirrels.db")).unwrap();
    (temp_dir, store)
}

fn squirrel(id: u64, name: &str, size: &str) -> Squirrel {
    Squirrel {
        id,
        name: name.to_string(),
        size: size.to_string(),
    }
}

fn ids(store: &SquirrelStore) -> Vec<u64> {
    store.get_all().unwrap().iter().map(|s| s.id).collect()
}

// =============================================================================
// Create Tests
// =============================================================================

#[test]
fn test_new_store_is_empty() {
    let (_temp, store) = setup_temp_store();

    assert!(store.get_all().unwrap().is_empty());
}

#[test]
fn test_create_assigns_unique_ids() {
    let (_temp, store) = setup_temp_store();

    let chippy = store.create("Chippy", "small").unwrap();
    let nutty = store.create("Nutty", "large").unwrap();

    assert_ne!(chippy.id, nutty.id);
    assert_eq!(store.get_by_id(chippy.id).unwrap(), Some(chippy));
    assert_eq!(store.get_by_id(nutty.id).unwrap(), Some(nutty));
}

#[test]
fn test_create_returns_created_record() {
    let (_temp, store) = setup_temp_store();

    let created = store.create("Chippy", "small").unwrap();

    assert_eq!(created, squirrel(1, "Chippy", "small"));
    assert_eq!(store.get_all().unwrap(), vec![created]);
}

#[test]
fn test_deleted_ids_are_not_reused() {
    let (_temp, store) = setup_temp_store();

    store.create("A", "small").unwrap();
    let b = store.create("B", "small").unwrap();
    store.delete(b.id).unwrap();

    let c = store.create("C", "small").unwrap();

    assert!(c.id > b.id);
}

#[test]
fn test_deleted_ids_are_not_reused_after_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("squirrels.db");
    let deleted_id = {
        let store = SquirrelStore::open(&path).unwrap();
        store.create("A", "small").unwrap();
        let b = store.create("B", "small").unwrap();
        store.delete(b.id).unwrap();
        b.id
    };

    let store = SquirrelStore::open(&path).unwrap();
    let c = store.create("C", "small").unwrap();

    assert!(c.id > deleted_id);
}

#[test]
fn test_create_fails_when_id_space_is_exhausted() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("squirrels.db");
    RecordFile::<Squirrel>::open(&path)
        .unwrap()
        .save_all(vec![squirrel(u64::MAX, "Last", "large")])
        .unwrap();

    let store = SquirrelStore::open(&path).unwrap();

    assert!(matches!(
        store.create("x", "y"),
        Err(SquirrelError::CorruptData(_))
    ));
    assert_eq!(ids(&store), vec![u64::MAX]);
}

#[test]
fn test_repaired_store_restarts_ids_after_surviving_records() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("squirrels.db");
    fs::write(&path, b"not a store").unwrap();

    // The high-water mark is lost with the corrupt file
    RecordFile::<Squirrel>::open(&path)
        .unwrap()
        .save_all(vec![squirrel(3, "Chippy", "small")])
        .unwrap();

    let store = SquirrelStore::open(&path).unwrap();
    assert_eq!(store.create("Nutty", "large").unwrap().id, 4);
}

#[test]
fn test_concurrent_creates_get_distinct_ids() {
    let (_temp, store) = setup_temp_store();
    let store = Arc::new(store);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..5)
                    .map(|i| store.create(&format!("s{}-{}", t, i), "small").unwrap().id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all_ids: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    all_ids.sort_unstable();
    all_ids.dedup();

    assert_eq!(all_ids.len(), 20);
    assert_eq!(store.get_all().unwrap().len(), 20);
}

// =============================================================================
// Lookup Tests
// =============================================================================

#[test]
fn test_get_by_id_miss_is_none() {
    let (_temp, store) = setup_temp_store();
    store.create("Chippy", "small").unwrap();

    assert_eq!(store.get_by_id(99).unwrap(), None);
}

#[test]
fn test_get_all_preserves_insertion_order() {
    let (_temp, store) = setup_temp_store();
    store.create("C", "small").unwrap();
    store.create("A", "small").unwrap();
    store.create("B", "small").unwrap();

    let names: Vec<String> = store.get_all().unwrap().into_iter().map(|s| s.name).collect();

    assert_eq!(names, vec!["C", "A", "B"]);
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_changes_fields_and_keeps_id() {
    let (_temp, store) = setup_temp_store();
    let chippy = store.create("Chippy", "small").unwrap();
    let nutty = store.create("Nutty", "large").unwrap();

    let updated = store.update(chippy.id, "Chippy", "large").unwrap();

    assert_eq!(updated, Some(squirrel(chippy.id, "Chippy", "large")));
    assert_eq!(
        store.get_by_id(chippy.id).unwrap(),
        Some(squirrel(chippy.id, "Chippy", "large"))
    );
    assert_eq!(store.get_by_id(nutty.id).unwrap(), Some(nutty));
}

#[test]
fn test_update_keeps_position() {
    let (_temp, store) = setup_temp_store();
    store.create("A", "small").unwrap();
    let b = store.create("B", "small").unwrap();
    store.create("C", "small").unwrap();

    store.update(b.id, "Bee", "medium").unwrap();

    let names: Vec<String> = store.get_all().unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["A", "Bee", "C"]);
}

#[test]
fn test_update_miss_does_not_write() {
    let (_temp, store) = setup_temp_store();
    store.create("Chippy", "small").unwrap();
    let before = fs::read(store.path()).unwrap();

    let result = store.update(42, "Ghost", "none").unwrap();

    assert_eq!(result, None);
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_removes_exactly_one() {
    let (_temp, store) = setup_temp_store();
    store.create("A", "small").unwrap();
    store.create("B", "small").unwrap();
    store.create("C", "small").unwrap();
    assert_eq!(ids(&store), vec![1, 2, 3]);

    let removed = store.delete(2).unwrap();

    assert_eq!(removed, Some(squirrel(2, "B", "small")));
    assert_eq!(ids(&store), vec![1, 3]);
    assert_eq!(store.delete(2).unwrap(), None);
}

#[test]
fn test_delete_miss_does_not_write() {
    let (_temp, store) = setup_temp_store();
    store.create("Chippy", "small").unwrap();
    let before = fs::read(store.path()).unwrap();

    assert_eq!(store.delete(7).unwrap(), None);
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_records_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("squirrels.db");
    {
        let store = SquirrelStore::open(&path).unwrap();
        store.create("Chippy", "small").unwrap();
        store.create("Nutty", "large").unwrap();
    }

    let store = SquirrelStore::open(&path).unwrap();

    assert_eq!(
        store.get_all().unwrap(),
        vec![squirrel(1, "Chippy", "small"), squirrel(2, "Nutty", "large")]
    );
}

#[test]
fn test_json_codec_store() {
    let temp_dir = TempDir::new().unwrap();
    let store =
        SquirrelStore::open_with_codec(temp_dir.path().join("squirrels.json"), JsonCodec).unwrap();

    let chippy = store.create("Chippy", "small").unwrap();

    assert_eq!(store.get_by_id(chippy.id).unwrap(), Some(chippy));
}

#[test]
fn test_corrupt_file_errors_on_every_operation() {
    let (_temp, store) = setup_temp_store();
    fs::write(store.path(), b"not a store").unwrap();

    assert!(matches!(store.get_all(), Err(SquirrelError::CorruptData(_))));
    assert!(matches!(store.get_by_id(1), Err(SquirrelError::CorruptData(_))));
    assert!(matches!(
        store.create("A", "small"),
        Err(SquirrelError::CorruptData(_))
    ));
    assert!(matches!(
        store.update(1, "A", "small"),
        Err(SquirrelError::CorruptData(_))
    ));
    assert!(matches!(store.delete(1), Err(SquirrelError::CorruptData(_))));
}
