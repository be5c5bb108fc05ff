//! In-memory repository implementations
//!
//! Used by tests and by embedders that keep metadata elsewhere and only
//! need the orchestrator's consistency guarantees.

use crate::repository::{paginate, IdentityProvider, VideoRepository};
use reelvault_core::{AppError, ListQuery, Owner, Page, VideoRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

fn lock<T>(map: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    map.lock()
        .map_err(|_| AppError::Repository("In-memory store lock poisoned".to_string()))
}

/// Video repository backed by a shared map
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<Mutex<HashMap<Uuid, VideoRecord>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.videos.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VideoRepository for InMemoryVideoRepository {
    fn find(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(lock(&self.videos)?.get(&id).cloned())
    }

    fn insert(&self, video: VideoRecord) -> Result<VideoRecord, AppError> {
        let mut videos = lock(&self.videos)?;
        if videos.contains_key(&video.id) {
            return Err(AppError::Repository(format!(
                "Video {} already exists",
                video.id
            )));
        }
        videos.insert(video.id, video.clone());
        Ok(video)
    }

    fn update(&self, video: VideoRecord) -> Result<VideoRecord, AppError> {
        let mut videos = lock(&self.videos)?;
        match videos.get_mut(&video.id) {
            Some(existing) => {
                *existing = video.clone();
                Ok(video)
            }
            None => Err(AppError::NotFound("Video not found".to_string())),
        }
    }

    fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(lock(&self.videos)?.remove(&id).is_some())
    }

    fn list(&self, query: &ListQuery) -> Result<Page<VideoRecord>, AppError> {
        let videos = lock(&self.videos)?;
        Ok(paginate(videos.values().cloned(), query))
    }
}

/// Identity provider backed by a shared map
#[derive(Clone, Default)]
pub struct InMemoryIdentityProvider {
    owners: Arc<Mutex<HashMap<Uuid, Owner>>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_owner(&self, owner: Owner) -> Result<(), AppError> {
        lock(&self.owners)?.insert(owner.id, owner);
        Ok(())
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn find_owner(&self, id: Uuid) -> Result<Option<Owner>, AppError> {
        Ok(lock(&self.owners)?.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelvault_core::NewVideo;

    #[test]
    fn test_insert_find_delete() {
        let repo = InMemoryVideoRepository::new();
        let video = VideoRecord::attached(
            Uuid::new_v4(),
            &NewVideo::default(),
            "clip_1_0a1b2c3d.mp4".to_string(),
        );

        repo.insert(video.clone()).unwrap();
        assert_eq!(repo.find(video.id).unwrap(), Some(video.clone()));
        assert!(repo.insert(video.clone()).is_err());

        assert!(repo.delete(video.id).unwrap());
        assert!(!repo.delete(video.id).unwrap());
        assert!(repo.is_empty());
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let repo = InMemoryVideoRepository::new();
        let video = VideoRecord::attached(
            Uuid::new_v4(),
            &NewVideo::default(),
            "clip_1_0a1b2c3d.mp4".to_string(),
        );
        assert!(matches!(repo.update(video), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_identity_lookup() {
        let owners = InMemoryIdentityProvider::new();
        let owner = Owner::new("alice");
        owners.add_owner(owner.clone()).unwrap();

        assert_eq!(owners.find_owner(owner.id).unwrap(), Some(owner));
        assert_eq!(owners.find_owner(Uuid::new_v4()).unwrap(), None);
    }
}
