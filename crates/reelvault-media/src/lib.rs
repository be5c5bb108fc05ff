//! Reelvault Media Library
//!
//! The media orchestrator keeps video metadata records and the objects held
//! by the storage engine consistent with each other. Metadata persistence
//! and owner lookup are reached through the [`VideoRepository`] and
//! [`IdentityProvider`] traits.

pub mod delivery;
pub mod memory;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use delivery::{DeliveredContent, Delivery, VideoContent};
pub use memory::{InMemoryIdentityProvider, InMemoryVideoRepository};
pub use repository::{paginate, IdentityProvider, VideoRepository};
pub use service::MediaService;
