//! Support code for the `reelvault` operator CLI.

pub mod catalog;

pub use catalog::JsonCatalog;

use anyhow::Context;
use reelvault_core::{AppError, ErrorMetadata, LogLevel};
use reelvault_storage::{Storage, StorageError, UploadCandidate};
use std::path::{Path, PathBuf};

/// Shorten `s` to at most `max_chars` characters, ending in "..." when cut.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Fail if `catalog` would live inside the storage root.
///
/// Only generated keys may exist under the root; anything else there could
/// be reached through a crafted key.
pub fn ensure_outside_root(catalog: &Path, root: &Path) -> anyhow::Result<()> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Resolve storage root {}", root.display()))?;

    let parent = match catalog.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent = parent
        .canonicalize()
        .with_context(|| format!("Resolve catalog directory {}", parent.display()))?;

    if parent.starts_with(&root) {
        anyhow::bail!("The catalog file must not be placed inside the storage root");
    }
    Ok(())
}

/// Read an upload from disk after checking its declared size and name.
///
/// Rejections surface as [`AppError`] so they are reported like every
/// other domain failure.
pub fn read_upload(
    storage: &dyn Storage,
    file: &Path,
) -> anyhow::Result<(Vec<u8>, Option<String>)> {
    let original_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string);
    let size = std::fs::metadata(file)
        .with_context(|| format!("Read metadata of {}", file.display()))?
        .len();

    storage
        .validate(&UploadCandidate::new(size, original_name.as_deref()))
        .map_err(|e| AppError::from(StorageError::from(e)))?;

    let content = std::fs::read(file).with_context(|| format!("Read {}", file.display()))?;
    Ok((content, original_name))
}

/// Log a failed command and return the level used.
///
/// Domain errors are logged at the level their metadata asks for; anything
/// else is logged as an error with its full context chain.
pub fn report_error(err: &anyhow::Error) -> LogLevel {
    let Some(app_err) = err.downcast_ref::<AppError>() else {
        tracing::error!(error = %format!("{:#}", err), "Command failed");
        return LogLevel::Error;
    };

    let code = app_err.error_code();
    let details = app_err.detailed_message();
    let level = app_err.log_level();
    match level {
        LogLevel::Error => tracing::error!(code = code, error = %details, "Command failed"),
        LogLevel::Warn => tracing::warn!(code = code, error = %details, "Command rejected"),
        LogLevel::Debug => tracing::debug!(code = code, error = %details, "Command rejected"),
    }
    level
}

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelvault_core::StorageConfig;
    use reelvault_storage::LocalStorage;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn truncate_chars_short() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
    }

    #[test]
    fn truncate_chars_long() {
        assert_eq!(truncate_chars("hello world", 8), "hello...");
        assert_eq!(truncate_chars("été à la plage", 6), "été...");
    }

    fn storage(dir: &TempDir) -> LocalStorage {
        let config = StorageConfig::new(dir.path().join("videos"))
            .with_max_file_size_bytes(16)
            .with_allowed_extensions(["mp4"]);
        LocalStorage::new(Arc::new(config)).unwrap()
    }

    #[test]
    fn read_upload_accepts_valid_file() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let file = dir.path().join("beach.mp4");
        std::fs::write(&file, b"hello").unwrap();

        let (content, name) = read_upload(&storage, &file).unwrap();
        assert_eq!(content, b"hello");
        assert_eq!(name.as_deref(), Some("beach.mp4"));
    }

    #[test]
    fn read_upload_rejections_are_app_errors() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);

        let wrong_type = dir.path().join("notes.txt");
        std::fs::write(&wrong_type, b"hello").unwrap();
        let err = read_upload(&storage, &wrong_type).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::InvalidInput(_))
        ));
        assert_eq!(report_error(&err), LogLevel::Debug);

        let too_big = dir.path().join("long.mp4");
        std::fs::write(&too_big, [0u8; 32]).unwrap();
        let err = read_upload(&storage, &too_big).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn report_error_covers_non_domain_failures() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);

        let err = read_upload(&storage, &dir.path().join("missing.mp4")).unwrap_err();
        assert!(err.downcast_ref::<AppError>().is_none());
        assert_eq!(report_error(&err), LogLevel::Error);

        let err = anyhow::Error::new(AppError::InvalidObjectKey { operation: "load" })
            .context("Failed to fetch video");
        assert_eq!(report_error(&err), LogLevel::Warn);
    }

    #[test]
    fn catalog_inside_root_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("videos");
        std::fs::create_dir_all(&root).unwrap();

        assert!(ensure_outside_root(&root.join("catalog.json"), &root).is_err());
        assert!(ensure_outside_root(&dir.path().join("catalog.json"), &root).is_ok());
    }
}
