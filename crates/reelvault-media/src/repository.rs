//! Metadata repository and identity traits
//!
//! Both are implemented outside the orchestrator: an in-memory version
//! lives in [`crate::memory`], the CLI persists a JSON catalog.

use reelvault_core::{AppError, ListQuery, Owner, Page, VideoRecord};
use uuid::Uuid;

/// CRUD over video metadata records.
pub trait VideoRepository: Send + Sync {
    fn find(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError>;

    /// Insert a new record. Fails if the id is already taken.
    fn insert(&self, video: VideoRecord) -> Result<VideoRecord, AppError>;

    /// Overwrite an existing record. Fails with `NotFound` if it is absent.
    fn update(&self, video: VideoRecord) -> Result<VideoRecord, AppError>;

    /// Remove a record, returning whether it existed.
    fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Records matching `query`, newest first.
    fn list(&self, query: &ListQuery) -> Result<Page<VideoRecord>, AppError>;
}

/// Lookup of authenticated identities.
pub trait IdentityProvider: Send + Sync {
    fn find_owner(&self, id: Uuid) -> Result<Option<Owner>, AppError>;
}

/// Filter, order (newest upload first) and slice `records` for `query`.
pub fn paginate<I>(records: I, query: &ListQuery) -> Page<VideoRecord>
where
    I: IntoIterator<Item = VideoRecord>,
{
    let query = query.normalized();

    let mut matching: Vec<VideoRecord> = records
        .into_iter()
        .filter(|video| query.matches(video))
        .collect();
    matching.sort_by(|a, b| {
        b.uploaded_at
            .cmp(&a.uploaded_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let total = matching.len();
    let items = matching
        .into_iter()
        .skip(query.offset())
        .take(query.size as usize)
        .collect();

    Page {
        items,
        page: query.page,
        size: query.size,
        total,
    }
}
