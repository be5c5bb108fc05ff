use regex::Regex;
use reelvault_core::StorageConfig;
use reelvault_storage::{
    LocalStorage, Storage, StorageError, UploadCandidate, ValidationError,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const GIB: u64 = 1024 * 1024 * 1024;

fn config(dir: &TempDir) -> StorageConfig {
    StorageConfig::new(dir.path().join("videos"))
        .with_max_file_size_bytes(GIB)
        .with_allowed_extensions(["mp4", "mov"])
}

fn setup() -> (TempDir, LocalStorage) {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(Arc::new(config(&dir))).unwrap();
    (dir, storage)
}

#[test]
fn test_store_load_delete_round_trip() {
    let (_dir, storage) = setup();

    let key = storage.store(b"frame data", Some("clip.mp4")).unwrap();
    assert!(storage.exists(&key));
    assert_eq!(storage.load(&key).unwrap(), b"frame data");

    storage.delete(&key).unwrap();
    assert!(!storage.exists(&key));
    assert!(matches!(storage.load(&key), Err(StorageError::NotFound(_))));
}

#[test]
fn test_upload_scenario_key_and_content_type() {
    let (_dir, storage) = setup();

    let key = storage.store(b"hello", Some("my video!!.MP4")).unwrap();

    let pattern = Regex::new(r"^my_video_\d+_[0-9a-f]{8}\.MP4$").unwrap();
    assert!(pattern.is_match(&key), "unexpected key {}", key);
    assert_eq!(storage.content_type(&key).unwrap(), "video/mp4");
    assert_eq!(storage.load(&key).unwrap(), b"hello");
    assert_eq!(storage.content_length(&key).unwrap(), 5);
}

#[test]
fn test_declared_size_over_limit_rejected() {
    let (_dir, storage) = setup();

    let result = storage.validate(&UploadCandidate::new(2 * GIB, Some("clip.mp4")));
    assert!(matches!(
        result,
        Err(ValidationError::FileTooLarge { size, max }) if size == 2 * GIB && max == GIB
    ));
}

#[test]
fn test_hostile_name_stays_in_root() {
    let (_dir, storage) = setup();

    let key = storage
        .store(b"payload", Some("../../etc/passwd.mp4"))
        .unwrap();
    assert!(!key.contains('/'));

    let stored = storage.root().join(&key);
    assert!(stored.is_file());
    assert_eq!(stored.parent().unwrap(), storage.root());
}

#[test]
fn test_traversal_keys_rejected() {
    let (dir, storage) = setup();

    // A file outside the root that a traversal key would reach
    let outside = dir.path().join("secret.mp4");
    fs::write(&outside, b"secret").unwrap();

    for key in ["../secret.mp4", "../../etc/passwd", "nested/../../secret.mp4"] {
        assert!(
            matches!(storage.load(key), Err(StorageError::PathEscape { .. })),
            "load accepted {}",
            key
        );
        assert!(
            matches!(storage.delete(key), Err(StorageError::PathEscape { .. })),
            "delete accepted {}",
            key
        );
        assert!(
            matches!(storage.content_type(key), Err(StorageError::PathEscape { .. })),
            "content_type accepted {}",
            key
        );
        assert!(!storage.exists(key));
    }

    assert!(outside.exists());
}

#[test]
fn test_absolute_key_rejected() {
    let (dir, storage) = setup();
    let outside = dir.path().join("secret.mp4");
    fs::write(&outside, b"secret").unwrap();

    let key = outside.to_str().unwrap();
    assert!(matches!(
        storage.load(key),
        Err(StorageError::PathEscape { .. })
    ));
    assert!(matches!(
        storage.delete(key),
        Err(StorageError::PathEscape { .. })
    ));
    assert!(!storage.exists(key));
    assert!(outside.exists());
}

#[test]
fn test_delete_is_idempotent() {
    let (_dir, storage) = setup();

    let key = storage.store(b"x", Some("clip.mov")).unwrap();
    storage.delete(&key).unwrap();
    storage.delete(&key).unwrap();
    storage.delete("never_stored_1_0a1b2c3d.mp4").unwrap();
    storage.delete("").unwrap();
}

#[cfg(unix)]
#[test]
fn test_symlink_escape_rejected() {
    let (dir, storage) = setup();

    let outside = dir.path().join("outside.mp4");
    fs::write(&outside, b"secret").unwrap();
    std::os::unix::fs::symlink(&outside, storage.root().join("link.mp4")).unwrap();

    assert!(matches!(
        storage.load("link.mp4"),
        Err(StorageError::PathEscape { .. })
    ));
    assert!(!storage.exists("link.mp4"));
    assert_eq!(fs::read(&outside).unwrap(), b"secret");
}

#[test]
fn test_initialize_creates_root_and_is_idempotent() {
    let (_dir, storage) = setup();

    fs::remove_dir(storage.root()).unwrap();
    storage.initialize().unwrap();
    assert!(storage.root().is_dir());

    let key = storage.store(b"kept", Some("clip.mp4")).unwrap();
    storage.initialize().unwrap();
    assert_eq!(storage.load(&key).unwrap(), b"kept");
}

#[test]
fn test_root_that_is_a_file_fails() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("videos");
    fs::write(&root, b"not a directory").unwrap();

    let result = LocalStorage::new(Arc::new(StorageConfig::new(&root)));
    assert!(matches!(result, Err(StorageError::ConfigError(_))));
}

#[test]
fn test_objects_are_flat_without_sidecars() {
    let (_dir, storage) = setup();

    let first = storage.store(b"one", Some("a.mp4")).unwrap();
    let second = storage.store(b"two", Some("b.mov")).unwrap();

    let mut entries: Vec<String> = fs::read_dir(storage.root())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    entries.sort();

    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(entries, expected);
}

#[test]
fn test_rejected_upload_writes_nothing() {
    let (_dir, storage) = setup();

    assert!(matches!(
        storage.store(b"", Some("clip.mp4")),
        Err(StorageError::Validation(ValidationError::EmptyFile))
    ));
    assert!(matches!(
        storage.store(b"data", None),
        Err(StorageError::Validation(ValidationError::MissingFilename))
    ));
    assert_eq!(fs::read_dir(storage.root()).unwrap().count(), 0);
}

#[test]
fn test_non_ascii_extension_never_reaches_a_key() {
    let dir = TempDir::new().unwrap();
    let config = StorageConfig::new(dir.path().join("videos")).with_allowed_extensions(["mkv"]);
    let storage = LocalStorage::new(Arc::new(config)).unwrap();

    assert!(matches!(
        storage.store(b"hello", Some("clip.m\u{212A}v")),
        Err(StorageError::Validation(ValidationError::InvalidExtension { .. }))
    ));
    assert_eq!(fs::read_dir(storage.root()).unwrap().count(), 0);

    let key = storage.store(b"hello", Some("clip.MKV")).unwrap();
    assert!(key.is_ascii());
}
