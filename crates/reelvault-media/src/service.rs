//! Media orchestrator
//!
//! Keeps each [`VideoRecord`] and the stored object it references
//! consistent. Objects are always written before the record that points at
//! them, and a record update that fails rolls back the object written for it.
//!
//! # Replacing a file
//!
//! `replace_file` stores the new object, then updates the record, then
//! deletes the old object. If the record update fails the new object is
//! deleted and the record still points at the old, intact object. If the
//! final delete fails the old object is leaked and logged at error level;
//! the record is already consistent.

use crate::delivery::{DeliveredContent, Delivery, VideoContent};
use crate::repository::{IdentityProvider, VideoRepository};
use chrono::Utc;
use reelvault_core::{AppError, ListQuery, NewVideo, Page, VideoRecord, VideoUpdate};
use reelvault_storage::{get_file_extension, sanitize_file_name, Storage, StorageError};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct MediaService {
    storage: Arc<dyn Storage>,
    videos: Arc<dyn VideoRepository>,
    owners: Arc<dyn IdentityProvider>,
}

impl MediaService {
    pub fn new(
        storage: Arc<dyn Storage>,
        videos: Arc<dyn VideoRepository>,
        owners: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            storage,
            videos,
            owners,
        }
    }

    /// Store `content` and create a record pointing at it.
    #[tracing::instrument(skip(self, video, content), fields(
        owner_id = ?video.owner_id,
        size_bytes = content.len(),
        operation = "upload"
    ))]
    pub fn upload(
        &self,
        video: NewVideo,
        content: &[u8],
        original_name: Option<&str>,
    ) -> Result<VideoRecord, AppError> {
        let owner_id = video
            .owner_id
            .ok_or_else(|| AppError::InvalidInput("Owner id is required".to_string()))?;

        if content.is_empty() {
            return Err(AppError::InvalidInput("Empty file".to_string()));
        }

        self.owners
            .find_owner(owner_id)?
            .ok_or_else(|| AppError::NotFound("Owner not found".to_string()))?;

        let key = self.storage.store(content, original_name)?;
        let record = VideoRecord::attached(owner_id, &video, key.clone());

        match self.videos.insert(record) {
            Ok(record) => {
                tracing::info!(
                    video_id = %record.id,
                    key = %key,
                    "Video uploaded"
                );
                Ok(record)
            }
            Err(e) => {
                self.discard_object(&key, "upload");
                Err(e)
            }
        }
    }

    /// Point the record at newly stored content and reclaim the old object.
    #[tracing::instrument(skip(self, content), fields(
        video_id = %video_id,
        size_bytes = content.len(),
        operation = "replace_file"
    ))]
    pub fn replace_file(
        &self,
        video_id: Uuid,
        content: &[u8],
        original_name: Option<&str>,
    ) -> Result<VideoRecord, AppError> {
        let mut record = self.find_video(video_id)?;
        let old_key = record.object_key().map(str::to_string);

        let new_key = self.storage.store(content, original_name)?;
        record.object_key = Some(new_key.clone());
        record.updated_at = Utc::now();

        let record = match self.videos.update(record) {
            Ok(record) => record,
            Err(e) => {
                self.discard_object(&new_key, "replace_file");
                return Err(e);
            }
        };

        if let Some(old_key) = old_key {
            if let Err(e) = self.storage.delete(&old_key) {
                tracing::error!(
                    video_id = %video_id,
                    key = %old_key,
                    error = %e,
                    "Failed to delete replaced object; it is no longer referenced"
                );
            }
        }

        tracing::info!(video_id = %video_id, key = %new_key, "Video file replaced");
        Ok(record)
    }

    #[tracing::instrument(skip(self, update), fields(video_id = %video_id))]
    pub fn update_metadata(
        &self,
        video_id: Uuid,
        update: VideoUpdate,
    ) -> Result<VideoRecord, AppError> {
        if update.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one field must be provided".to_string(),
            ));
        }

        let mut record = self.find_video(video_id)?;
        update.apply_to(&mut record);
        self.videos.update(record)
    }

    /// Delete the record. A failure to delete its object is logged and does
    /// not keep the record alive.
    #[tracing::instrument(skip(self), fields(video_id = %video_id))]
    pub fn remove(&self, video_id: Uuid) -> Result<(), AppError> {
        let record = self.find_video(video_id)?;

        if let Some(key) = record.object_key() {
            if let Err(e) = self.storage.delete(key) {
                tracing::error!(
                    video_id = %video_id,
                    key = %key,
                    error = %e,
                    "Failed to delete stored object; removing record anyway"
                );
            }
        }

        self.videos.delete(video_id)?;
        tracing::info!(video_id = %video_id, "Video removed");
        Ok(())
    }

    pub fn get(&self, video_id: Uuid) -> Result<VideoRecord, AppError> {
        self.find_video(video_id)
    }

    pub fn list(&self, query: ListQuery) -> Result<Page<VideoRecord>, AppError> {
        self.videos.list(&query.normalized())
    }

    /// Bytes and content type of the video's stored object.
    #[tracing::instrument(skip(self), fields(video_id = %video_id))]
    pub fn fetch_content(&self, video_id: Uuid) -> Result<VideoContent, AppError> {
        let record = self.find_video(video_id)?;
        let key = attached_key(&record)?;

        let bytes = self
            .storage
            .load(key)
            .map_err(|e| self.object_error(video_id, key, e))?;
        let content_type = self
            .storage
            .content_type(key)
            .map_err(|e| self.object_error(video_id, key, e))?;

        Ok(VideoContent {
            key: key.to_string(),
            bytes,
            content_type,
        })
    }

    /// Friendly filename for downloads. Never used to resolve paths.
    pub fn resolve_download_name(&self, video_id: Uuid) -> Result<String, AppError> {
        let record = self.find_video(video_id)?;
        let key = attached_key(&record)?;
        Ok(download_name(&record, key))
    }

    pub fn deliver(&self, video_id: Uuid, delivery: Delivery) -> Result<DeliveredContent, AppError> {
        let content = self.fetch_content(video_id)?;

        Ok(match delivery {
            Delivery::Inline => DeliveredContent::inline(content),
            Delivery::Download => {
                let filename = self.resolve_download_name(video_id)?;
                DeliveredContent::download(content, &filename)
            }
        })
    }

    fn find_video(&self, video_id: Uuid) -> Result<VideoRecord, AppError> {
        self.videos
            .find(video_id)?
            .ok_or_else(|| AppError::NotFound("Video not found".to_string()))
    }

    fn object_error(&self, video_id: Uuid, key: &str, err: StorageError) -> AppError {
        match err {
            StorageError::NotFound(_) => {
                tracing::error!(
                    video_id = %video_id,
                    key = %key,
                    "Record references a stored object that does not exist"
                );
                AppError::ObjectMissing {
                    video_id,
                    key: key.to_string(),
                }
            }
            other => other.into(),
        }
    }

    /// Best-effort removal of an object whose record was never written.
    fn discard_object(&self, key: &str, operation: &'static str) {
        match self.storage.delete(key) {
            Ok(()) => tracing::warn!(
                key = %key,
                operation = operation,
                "Record write failed; discarded stored object"
            ),
            Err(e) => tracing::error!(
                key = %key,
                operation = operation,
                error = %e,
                "Record write failed and the stored object could not be discarded"
            ),
        }
    }
}

fn attached_key(record: &VideoRecord) -> Result<&str, AppError> {
    record
        .object_key()
        .ok_or_else(|| AppError::NotFound("Video has no stored file".to_string()))
}

/// `sanitize(title) + ext(key)` for a non-blank title, the key otherwise.
fn download_name(record: &VideoRecord, key: &str) -> String {
    match record.display_title() {
        Some(title) => format!(
            "{}{}",
            sanitize_file_name(Some(title)),
            get_file_extension(key)
        ),
        None => key.to_string(),
    }
}
