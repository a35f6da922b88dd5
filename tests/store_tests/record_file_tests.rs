//! Tests for RecordFile / StringStore
//!
//! These tests verify:
//! - Lazy initialization of a missing file
//! - Save/load round trips and append composition
//! - Corruption surfaces as CorruptData
//! - Codec injection
//! - Concurrent appends are not lost

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use squirreldb::store::{Commit, JsonCodec, RecordFile, StringStore, HEADER_SIZE, MAGIC};
use squirreldb::SquirrelError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_path(name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    (temp_dir, path)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_empty_file() {
    let (_temp, path) = setup_temp_path("strings.db");
    assert!(!path.exists());

    let store = StringStore::open(&path).unwrap();

    assert!(path.exists());
    assert_eq!(store.load_all().unwrap(), Vec::<String>::new());
}

#[test]
fn test_open_creates_parent_directories() {
    let (_temp, path) = setup_temp_path("nested/dir/strings.db");

    let _store = StringStore::open(&path).unwrap();

    assert!(path.exists());
}

#[test]
fn test_open_existing_file_keeps_content() {
    let (_temp, path) = setup_temp_path("strings.db");
    {
        let store = StringStore::open(&path).unwrap();
        store.save_all(strings(&["hello", "world"])).unwrap();
    }

    let store = StringStore::open(&path).unwrap();

    assert_eq!(store.load_all().unwrap(), strings(&["hello", "world"]));
}

#[test]
fn test_open_does_not_read_existing_content() {
    let (_temp, path) = setup_temp_path("strings.db");
    fs::write(&path, b"garbage").unwrap();

    // Opening succeeds; the corruption shows up on first load
    let store = StringStore::open(&path).unwrap();

    assert!(matches!(
        store.load_all(),
        Err(SquirrelError::CorruptData(_))
    ));
}

#[test]
fn test_open_unwritable_path_fails_with_io() {
    let (temp, _) = setup_temp_path("unused");
    let blocker = temp.path().join("file");
    fs::write(&blocker, b"x").unwrap();

    // A regular file cannot be used as a directory
    let result = StringStore::open(blocker.join("strings.db"));

    assert!(matches!(result, Err(SquirrelError::Io(_))));
}

// =============================================================================
// Load/Save Tests
// =============================================================================

#[test]
fn test_save_then_load_preserves_order() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();
    let records = strings(&["hello", "world", "test", "hello"]);

    store.save_all(records.clone()).unwrap();

    assert_eq!(store.load_all().unwrap(), records);
}

#[test]
fn test_save_overwrites_entire_content() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();

    store.save_all(strings(&["a", "b", "c"])).unwrap();
    store.save_all(strings(&["z"])).unwrap();

    assert_eq!(store.load_all().unwrap(), strings(&["z"]));
}

#[test]
fn test_save_leaves_no_temp_file() {
    let (temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();

    store.save_all(strings(&["a"])).unwrap();

    let entries: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("strings.db")]);
}

#[test]
fn test_save_repairs_corrupt_file() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();
    fs::write(&path, b"SQDB but not really").unwrap();

    store.save_all(strings(&["fresh"])).unwrap();

    assert_eq!(store.load_all().unwrap(), strings(&["fresh"]));
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_append_to_empty_store() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();

    store.append("first_string".to_string()).unwrap();

    assert_eq!(store.load_all().unwrap(), strings(&["first_string"]));
}

#[test]
fn test_append_adds_to_end() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();
    store.save_all(strings(&["existing1", "existing2"])).unwrap();

    store.append("new_string".to_string()).unwrap();

    assert_eq!(
        store.load_all().unwrap(),
        strings(&["existing1", "existing2", "new_string"])
    );
}

#[test]
fn test_append_on_corrupt_file_fails_without_writing() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();
    fs::write(&path, b"garbage").unwrap();

    let result = store.append("lost".to_string());

    assert!(matches!(result, Err(SquirrelError::CorruptData(_))));
    assert_eq!(fs::read(&path).unwrap(), b"garbage");
}

#[test]
fn test_concurrent_appends_are_not_lost() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = Arc::new(StringStore::open(&path).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..10 {
                    store.append(format!("t{}-{}", t, i)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.load_all().unwrap().len(), 40);
}

// =============================================================================
// Transact Tests
// =============================================================================

#[test]
fn test_transact_skip_does_not_write() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();
    store.save_all(strings(&["keep"])).unwrap();
    let before = fs::read(&path).unwrap();

    let value = store
        .transact(|table| {
            table.records.clear();
            Commit::Skip(7)
        })
        .unwrap();

    assert_eq!(value, 7);
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(store.load_all().unwrap(), strings(&["keep"]));
}

#[test]
fn test_transact_write_persists_sequence() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();

    store
        .transact(|table| {
            table.sequence = 42;
            Commit::Write(())
        })
        .unwrap();
    store.save_all(strings(&["x"])).unwrap();

    // save_all keeps the high-water mark
    assert_eq!(store.load_table().unwrap().sequence, 42);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_truncated_file_is_corrupt() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();
    store.save_all(strings(&["hello", "world"])).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

    assert!(matches!(
        store.load_all(),
        Err(SquirrelError::CorruptData(_))
    ));
}

#[test]
fn test_flipped_payload_byte_is_corrupt() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();
    store.save_all(strings(&["hello"])).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes[HEADER_SIZE] ^= 0xFF;
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        store.load_all(),
        Err(SquirrelError::CorruptData(_))
    ));
}

#[test]
fn test_empty_file_is_corrupt() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();
    fs::write(&path, b"").unwrap();

    assert!(matches!(
        store.load_all(),
        Err(SquirrelError::CorruptData(_))
    ));
}

#[test]
fn test_missing_file_on_load_is_io() {
    let (_temp, path) = setup_temp_path("strings.db");
    let store = StringStore::open(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert!(matches!(store.load_all(), Err(SquirrelError::Io(_))));
}

#[test]
fn test_wrong_record_shape_is_corrupt() {
    let (_temp, path) = setup_temp_path("numbers.db");
    {
        let store: RecordFile<u8, JsonCodec> =
            RecordFile::open_with_codec(&path, JsonCodec).unwrap();
        store.save_all(vec![1, 2, 3]).unwrap();
    }

    let store: RecordFile<String, JsonCodec> =
        RecordFile::open_with_codec(&path, JsonCodec).unwrap();

    assert!(matches!(
        store.load_all(),
        Err(SquirrelError::CorruptData(_))
    ));
}

// =============================================================================
// Codec Tests
// =============================================================================

#[test]
fn test_json_codec_round_trip() {
    let (_temp, path) = setup_temp_path("strings.json.db");
    let store: RecordFile<String, JsonCodec> =
        RecordFile::open_with_codec(&path, JsonCodec).unwrap();

    store.append("hello".to_string()).unwrap();
    store.append("world".to_string()).unwrap();

    assert_eq!(store.load_all().unwrap(), strings(&["hello", "world"]));

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..4], MAGIC);
    assert!(std::str::from_utf8(&bytes[HEADER_SIZE..])
        .unwrap()
        .contains("\"hello\""));
}
