use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for one uploaded video.
///
/// `object_key` is the storage engine's generated key. While it is `Some`,
/// the referenced object is expected to exist under the storage root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: bool,
    pub object_key: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRecord {
    /// A fresh record for `owner_id` that already points at `object_key`.
    pub fn attached(owner_id: Uuid, video: &NewVideo, object_key: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: video.title.clone(),
            description: video.description.clone(),
            is_public: video.is_public,
            object_key: Some(object_key),
            uploaded_at: now,
            updated_at: now,
        }
    }

    pub fn object_key(&self) -> Option<&str> {
        self.object_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Title with surrounding whitespace removed, if anything is left.
    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Metadata supplied alongside an upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewVideo {
    pub owner_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// Partial metadata update. Fields left as `None` are not touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

impl VideoUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.is_public.is_none()
    }

    /// Apply the set fields to `record` and bump `updated_at`.
    pub fn apply_to(&self, record: &mut VideoRecord) {
        if let Some(title) = &self.title {
            record.title = Some(title.clone());
        }
        if let Some(description) = &self.description {
            record.description = Some(description.clone());
        }
        if let Some(is_public) = self.is_public {
            record.is_public = is_public;
        }
        record.updated_at = Utc::now();
    }
}

/// Outward representation of a record. The object key stays internal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: bool,
    pub has_file: bool,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VideoRecord> for VideoResponse {
    fn from(video: VideoRecord) -> Self {
        let has_file = video.object_key().is_some();
        VideoResponse {
            id: video.id,
            owner_id: video.owner_id,
            title: video.title,
            description: video.description,
            is_public: video.is_public,
            has_file,
            uploaded_at: video.uploaded_at,
            updated_at: video.updated_at,
        }
    }
}
