//! JSON catalog file
//!
//! A single JSON document holding owners and video records, rewritten in
//! full on every change. Writes go to a sibling temp file that is renamed
//! over the catalog, so a crash never leaves a half-written catalog.

use reelvault_core::{AppError, ListQuery, Owner, Page, VideoRecord};
use reelvault_media::{paginate, IdentityProvider, VideoRepository};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogData {
    #[serde(default)]
    owners: Vec<Owner>,
    #[serde(default)]
    videos: Vec<VideoRecord>,
}

/// Metadata repository and identity provider persisted as one JSON file
pub struct JsonCatalog {
    path: PathBuf,
    data: Mutex<CatalogData>,
}

impl JsonCatalog {
    /// Open the catalog at `path`. A missing file is an empty catalog.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();

        let data = match fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw)?,
            Err(e) if e.kind() == ErrorKind::NotFound => CatalogData::default(),
            Err(e) => {
                return Err(AppError::Repository(format!(
                    "Failed to read catalog: {}",
                    e
                )))
            }
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Register a new owner. Usernames are unique.
    pub fn add_owner(&self, username: &str) -> Result<Owner, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::InvalidInput("Username is required".to_string()));
        }

        self.write(|data| {
            if data.owners.iter().any(|o| o.username == username) {
                return Err(AppError::InvalidInput(format!(
                    "Owner '{}' already exists",
                    username
                )));
            }
            let owner = Owner::new(username);
            data.owners.push(owner.clone());
            Ok(owner)
        })
    }

    pub fn owners(&self) -> Result<Vec<Owner>, AppError> {
        Ok(self.lock()?.owners.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, CatalogData>, AppError> {
        self.data
            .lock()
            .map_err(|_| AppError::Repository("Catalog lock poisoned".to_string()))
    }

    /// Apply `change` to a copy of the catalog, persist the copy, then make
    /// it current. Nothing changes if `change` or the write fails.
    fn write<T, F>(&self, change: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut CatalogData) -> Result<T, AppError>,
    {
        let mut data = self.lock()?;
        let mut next = data.clone();
        let result = change(&mut next)?;
        self.persist(&next)?;
        *data = next;
        Ok(result)
    }

    fn persist(&self, data: &CatalogData) -> Result<(), AppError> {
        let json = serde_json::to_vec_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");

        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(&json)?;
                file.sync_all()
            })
            .and_then(|_| fs::rename(&tmp, &self.path));

        written.map_err(|e| {
            let _ = fs::remove_file(&tmp);
            AppError::Repository(format!("Failed to write catalog: {}", e))
        })
    }
}

impl VideoRepository for JsonCatalog {
    fn find(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        Ok(self.lock()?.videos.iter().find(|v| v.id == id).cloned())
    }

    fn insert(&self, video: VideoRecord) -> Result<VideoRecord, AppError> {
        self.write(|data| {
            if data.videos.iter().any(|v| v.id == video.id) {
                return Err(AppError::Repository(format!(
                    "Video {} already exists",
                    video.id
                )));
            }
            data.videos.push(video.clone());
            Ok(video)
        })
    }

    fn update(&self, video: VideoRecord) -> Result<VideoRecord, AppError> {
        self.write(|data| {
            let existing = data
                .videos
                .iter_mut()
                .find(|v| v.id == video.id)
                .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;
            *existing = video.clone();
            Ok(video)
        })
    }

    fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.write(|data| {
            let before = data.videos.len();
            data.videos.retain(|v| v.id != id);
            Ok(data.videos.len() != before)
        })
    }

    fn list(&self, query: &ListQuery) -> Result<Page<VideoRecord>, AppError> {
        Ok(paginate(self.lock()?.videos.iter().cloned(), query))
    }
}

impl IdentityProvider for JsonCatalog {
    fn find_owner(&self, id: Uuid) -> Result<Option<Owner>, AppError> {
        Ok(self.lock()?.owners.iter().find(|o| o.id == id).cloned())
    }
}
