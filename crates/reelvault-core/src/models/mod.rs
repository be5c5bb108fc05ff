//! Domain models

pub mod owner;
pub mod query;
pub mod video;

pub use owner::Owner;
pub use query::{ListQuery, Page, MAX_PAGE_SIZE};
pub use video::{NewVideo, VideoRecord, VideoResponse, VideoUpdate};
