//! Reelvault Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by the storage engine, the media orchestrator and the CLI.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::StorageConfig;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ListQuery, NewVideo, Owner, Page, VideoRecord, VideoResponse, VideoUpdate};
