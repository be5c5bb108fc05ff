use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::video::VideoRecord;

/// Largest page a listing may return.
pub const MAX_PAGE_SIZE: u32 = 10;

/// Listing filter with 1-based pagination.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListQuery {
    pub owner_id: Option<Uuid>,
    pub is_public: Option<bool>,
    pub page: u32,
    pub size: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            owner_id: None,
            is_public: None,
            page: 1,
            size: MAX_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    /// Clamp page to at least 1 and size to `1..=MAX_PAGE_SIZE`.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            size: self.size.clamp(1, MAX_PAGE_SIZE),
            ..self
        }
    }

    pub fn matches(&self, video: &VideoRecord) -> bool {
        self.owner_id.map_or(true, |owner| video.owner_id == owner)
            && self.is_public.map_or(true, |public| video.is_public == public)
    }

    /// Number of items to skip for the (normalized) page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.size as usize
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> usize {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(self.size as usize)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }
}
