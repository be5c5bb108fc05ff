//! Reelvault Storage Library
//!
//! The storage engine persists uploaded video content as flat files under a
//! single storage root and is the only component that touches that directory.
//!
//! # Object key format
//!
//! Keys are generated, never taken from the client:
//!
//! `{sanitized_base_name}_{epoch_millis}_{8_hex_chars}{.ext}`
//!
//! Every operation that takes a key re-resolves it against the root and
//! rejects anything whose normalized parent is not exactly the root, so a key
//! that bypassed `store` still cannot reach outside the root.

pub mod content_type;
pub(crate) mod guard;
pub mod local;
pub mod naming;
pub mod traits;
pub mod validation;

// Re-export commonly used types
pub use local::LocalStorage;
pub use naming::{get_file_extension, sanitize_file_name};
pub use traits::{Storage, StorageError, StorageResult};
pub use validation::{UploadCandidate, UploadValidator, ValidationError};
