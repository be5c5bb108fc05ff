use crate::content_type::{self, SNIFF_LEN};
use crate::guard::resolve_in_root;
use crate::naming::{generate_object_key, DEFAULT_BASE_NAME};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::validation::{UploadCandidate, UploadValidator, ValidationError};
use reelvault_core::StorageConfig;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

const WRITE_CHECK_NAME: &str = ".reelvault-write-check";

/// Local filesystem storage implementation
///
/// Objects are flat files directly under the storage root; no metadata is
/// kept alongside them.
#[derive(Clone)]
pub struct LocalStorage {
    config: Arc<StorageConfig>,
    root: PathBuf,
    validator: UploadValidator,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, preparing the configured root.
    ///
    /// The configuration is validated first. The root is created if missing,
    /// checked for writability and then held in canonical form for every
    /// later containment check.
    pub fn new(config: Arc<StorageConfig>) -> StorageResult<Self> {
        config
            .validate()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let root = prepare_root(config.root())?;
        let validator = UploadValidator::from_config(&config);

        tracing::info!(
            root = %root.display(),
            max_file_size_bytes = config.max_file_size_bytes(),
            allowed_extensions = ?config.allowed_extensions(),
            "Local storage initialized"
        );

        Ok(Self {
            config,
            root,
            validator,
        })
    }

    /// Canonical storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to its path under the root, rejecting empty and escaping keys.
    fn resolve(&self, operation: &'static str, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(ValidationError::EmptyKey.into());
        }

        resolve_in_root(&self.root, key).ok_or_else(|| {
            tracing::warn!(
                operation = operation,
                key = ?key,
                "Rejected object key outside the storage root"
            );
            StorageError::PathEscape { operation }
        })
    }

    /// Write `content` to a file that must not exist yet. A partially
    /// written file is removed before the error is returned.
    fn write_object(key: &str, path: &Path, content: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;

        let written = file.write_all(content).and_then(|_| file.sync_all());
        if written.is_err() {
            drop(file);
            if let Err(cleanup) = fs::remove_file(path) {
                tracing::error!(
                    key = %key,
                    error = %cleanup,
                    "Failed to remove partially written object"
                );
            }
        }
        written
    }
}

fn prepare_root(root: &Path) -> StorageResult<PathBuf> {
    fs::create_dir_all(root).map_err(|e| {
        StorageError::ConfigError(format!(
            "Failed to create storage directory {}: {}",
            root.display(),
            e
        ))
    })?;

    if !root.is_dir() {
        return Err(StorageError::ConfigError(format!(
            "Storage root {} is not a directory",
            root.display()
        )));
    }

    let marker = root.join(WRITE_CHECK_NAME);
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&marker)
        .and_then(|_| fs::remove_file(&marker))
        .map_err(|e| {
            StorageError::ConfigError(format!(
                "Storage root {} is not writable: {}",
                root.display(),
                e
            ))
        })?;

    root.canonicalize().map_err(|e| {
        StorageError::ConfigError(format!("Failed to canonicalize storage root: {}", e))
    })
}

fn io_error(operation: &'static str, key: &str, source: io::Error) -> StorageError {
    if source.kind() == ErrorKind::NotFound {
        StorageError::NotFound(key.to_string())
    } else {
        StorageError::Io {
            operation,
            key: key.to_string(),
            source,
        }
    }
}

impl Storage for LocalStorage {
    fn initialize(&self) -> StorageResult<()> {
        prepare_root(self.config.root()).map(|_| ())
    }

    fn validate(&self, candidate: &UploadCandidate<'_>) -> Result<(), ValidationError> {
        self.validator.validate(candidate)
    }

    fn store(&self, content: &[u8], original_name: Option<&str>) -> StorageResult<String> {
        self.validator
            .validate(&UploadCandidate::for_content(content, original_name))?;

        let key = generate_object_key(original_name.unwrap_or(DEFAULT_BASE_NAME));
        let path = self.resolve("store", &key)?;
        let start = Instant::now();

        Self::write_object(&key, &path, content).map_err(|source| StorageError::Io {
            operation: "store",
            key: key.clone(),
            source,
        })?;

        tracing::info!(
            key = %key,
            size_bytes = content.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage store successful"
        );

        Ok(key)
    }

    fn load(&self, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.resolve("load", key)?;
        let start = Instant::now();

        if !path.is_file() {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let data = fs::read(&path).map_err(|e| io_error("load", key, e))?;

        tracing::debug!(
            key = %key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage load successful"
        );

        Ok(data)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        if key.is_empty() {
            return Ok(());
        }

        let path = self.resolve("delete", key)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(key = %key, "Local storage delete successful");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(key = %key, "Object already absent");
                Ok(())
            }
            Err(e) => Err(StorageError::Io {
                operation: "delete",
                key: key.to_string(),
                source: e,
            }),
        }
    }

    fn exists(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }

        match self.resolve("exists", key) {
            Ok(path) => path.is_file(),
            Err(_) => false,
        }
    }

    fn content_type(&self, key: &str) -> StorageResult<String> {
        let path = self.resolve("content_type", key)?;

        if !path.is_file() {
            return Err(StorageError::NotFound(key.to_string()));
        }

        let file = File::open(&path).map_err(|e| io_error("content_type", key, e))?;
        let mut header = Vec::with_capacity(SNIFF_LEN);
        file.take(SNIFF_LEN as u64)
            .read_to_end(&mut header)
            .map_err(|e| io_error("content_type", key, e))?;

        Ok(content_type::resolve(key, &header))
    }

    fn content_length(&self, key: &str) -> StorageResult<u64> {
        let path = self.resolve("content_length", key)?;

        let metadata = fs::metadata(&path).map_err(|e| io_error("content_length", key, e))?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(key.to_string()));
        }

        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(dir: &TempDir) -> LocalStorage {
        let config = StorageConfig::new(dir.path().join("videos"))
            .with_max_file_size_bytes(1024)
            .with_allowed_extensions(["mp4", "mov"]);
        LocalStorage::new(Arc::new(config)).unwrap()
    }

    #[test]
    fn test_new_creates_root_without_write_check_leftover() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        assert!(storage.root().is_dir());
        assert!(!storage.root().join(WRITE_CHECK_NAME).exists());
    }

    #[test]
    fn test_invalid_config_fails_at_startup() {
        let dir = TempDir::new().unwrap();

        let zero_limit = StorageConfig::new(dir.path().join("videos")).with_max_file_size_bytes(0);
        assert!(matches!(
            LocalStorage::new(Arc::new(zero_limit)),
            Err(StorageError::ConfigError(_))
        ));

        let no_extensions =
            StorageConfig::new(dir.path().join("videos")).with_allowed_extensions(Vec::<String>::new());
        assert!(matches!(
            LocalStorage::new(Arc::new(no_extensions)),
            Err(StorageError::ConfigError(_))
        ));
    }

    #[test]
    fn test_empty_key_rejected_for_reads() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        assert!(matches!(
            storage.load(""),
            Err(StorageError::Validation(ValidationError::EmptyKey))
        ));
        assert!(matches!(
            storage.content_type(""),
            Err(StorageError::Validation(ValidationError::EmptyKey))
        ));
        assert!(!storage.exists(""));
        assert!(storage.delete("").is_ok());
    }

    #[test]
    fn test_store_rejects_before_writing() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);

        assert!(matches!(
            storage.store(&[0u8; 2048], Some("big.mp4")),
            Err(StorageError::Validation(ValidationError::FileTooLarge { .. }))
        ));
        assert!(matches!(
            storage.store(b"data", Some("clip.avi")),
            Err(StorageError::Validation(ValidationError::InvalidExtension { .. }))
        ));
        assert_eq!(fs::read_dir(storage.root()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_never_overwrites_existing_object() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let path = storage.root().join("clip_1700000000000_0a1b2c3d.mp4");
        fs::write(&path, b"original").unwrap();

        let err = LocalStorage::write_object("clip_1700000000000_0a1b2c3d.mp4", &path, b"new")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&path).unwrap(), b"original");
    }

    #[test]
    fn test_content_length() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let key = storage.store(b"12345", Some("clip.mp4")).unwrap();
        assert_eq!(storage.content_length(&key).unwrap(), 5);
        assert!(matches!(
            storage.content_length("missing.mp4"),
            Err(StorageError::NotFound(_))
        ));
    }
}
