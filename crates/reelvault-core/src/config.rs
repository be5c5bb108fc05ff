//! Configuration module
//!
//! Storage configuration is read once at startup and shared read-only
//! (typically behind an `Arc`) by the storage engine and the orchestrator.

use std::env;
use std::path::{Path, PathBuf};

const MAX_FILE_SIZE_BYTES: u64 = 1024 * 1024 * 1024;
const ALLOWED_EXTENSIONS: &str = "mp4,avi,mov,wmv,flv,webm,mkv";

const ENV_STORAGE_ROOT: &str = "REELVAULT_STORAGE_ROOT";
const ENV_MAX_FILE_SIZE_BYTES: &str = "REELVAULT_MAX_FILE_SIZE_BYTES";
const ENV_ALLOWED_EXTENSIONS: &str = "REELVAULT_ALLOWED_EXTENSIONS";

/// Storage engine configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    root: PathBuf,
    max_file_size_bytes: u64,
    allowed_extensions: Vec<String>,
}

impl StorageConfig {
    /// Configuration rooted at `root` with the default size limit and
    /// extension allow-list.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            allowed_extensions: parse_extensions(ALLOWED_EXTENSIONS),
        }
    }

    pub fn with_max_file_size_bytes(mut self, max_file_size_bytes: u64) -> Self {
        self.max_file_size_bytes = max_file_size_bytes;
        self
    }

    /// Replace the allow-list. Entries are normalized the same way as the
    /// comma-separated environment value.
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .filter_map(|e| normalize_extension(e.as_ref()))
            .collect();
        self
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = lookup(ENV_STORAGE_ROOT)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("{} must be set", ENV_STORAGE_ROOT))?;

        let max_file_size_bytes = match lookup(ENV_MAX_FILE_SIZE_BYTES) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                anyhow::anyhow!("{} must be a byte count: {}", ENV_MAX_FILE_SIZE_BYTES, e)
            })?,
            None => MAX_FILE_SIZE_BYTES,
        };

        let allowed_extensions = parse_extensions(
            &lookup(ENV_ALLOWED_EXTENSIONS).unwrap_or_else(|| ALLOWED_EXTENSIONS.to_string()),
        );

        let config = Self {
            root: PathBuf::from(root.trim()),
            max_file_size_bytes,
            allowed_extensions,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.root.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("Storage root must not be empty"));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "{} must be greater than zero",
                ENV_MAX_FILE_SIZE_BYTES
            ));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "{} must list at least one extension",
                ENV_ALLOWED_EXTENSIONS
            ));
        }

        if let Some(bad) = self
            .allowed_extensions
            .iter()
            .find(|e| !e.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
        {
            return Err(anyhow::anyhow!(
                "Invalid extension in {}: {}",
                ENV_ALLOWED_EXTENSIONS,
                bad
            ));
        }

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_bytes
    }

    /// Lower-case extensions without a leading dot.
    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',').filter_map(normalize_extension).collect()
}

fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim();
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}
