//! Upload validation
//!
//! Pure checks on the declared size and original filename of an upload,
//! run before any byte reaches the storage root.

use crate::naming::get_file_extension;
use reelvault_core::StorageConfig;

/// Validation errors for uploads and keys
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {})", readable_size(.max))]
    FileTooLarge { size: u64, max: u64 },

    #[error("Original filename is missing")]
    MissingFilename,

    #[error("Invalid file extension: '{extension}' (allowed: {})", .allowed.join(","))]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Object key cannot be empty")]
    EmptyKey,
}

/// What is known about an upload before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadCandidate<'a> {
    /// Declared content length in bytes
    pub size: u64,
    /// Filename as supplied by the client
    pub original_name: Option<&'a str>,
}

impl<'a> UploadCandidate<'a> {
    pub fn new(size: u64, original_name: Option<&'a str>) -> Self {
        Self {
            size,
            original_name,
        }
    }

    pub fn for_content(content: &[u8], original_name: Option<&'a str>) -> Self {
        Self::new(content.len() as u64, original_name)
    }
}

/// Upload validator
///
/// Holds the size limit and the extension allow-list as normalized by
/// [`StorageConfig`] (lower-case ASCII, no leading dot).
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: u64,
    allowed_extensions: Vec<String>,
}

impl UploadValidator {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            max_file_size: config.max_file_size_bytes(),
            allowed_extensions: config.allowed_extensions().to_vec(),
        }
    }

    /// Validate file size
    pub fn validate_size(&self, size: u64) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate the filename is present and carries an allowed extension
    pub fn validate_filename(&self, original_name: Option<&str>) -> Result<(), ValidationError> {
        let name = original_name
            .filter(|n| !n.trim().is_empty())
            .ok_or(ValidationError::MissingFilename)?;

        let extension = get_file_extension(name);
        let extension = extension.strip_prefix('.').unwrap_or(extension);

        // Keys keep the original extension, so it must already be ASCII.
        if !extension.is_ascii() {
            return Err(ValidationError::InvalidExtension {
                extension: extension.to_string(),
                allowed: self.allowed_extensions.clone(),
            });
        }

        let extension = extension.to_ascii_lowercase();
        if extension.is_empty() || !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(())
    }

    pub fn validate(&self, candidate: &UploadCandidate<'_>) -> Result<(), ValidationError> {
        self.validate_size(candidate.size)?;
        self.validate_filename(candidate.original_name)?;
        Ok(())
    }
}

fn readable_size(bytes: &u64) -> String {
    format_file_size(*bytes)
}

/// Render a byte count with the largest whole binary unit.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{} KB", bytes / KB)
    } else if bytes < GB {
        format!("{} MB", bytes / MB)
    } else {
        format!("{} GB", bytes / GB)
    }
}
