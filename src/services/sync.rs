// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Remote persistence: best-effort cloud writes.
//!
//! Every operation here degrades to a warning on failure. A photo that
//! fails to insert simply stays "not yet synced" (`db_id` null, absent
//! from the synced set); nothing retries automatically and nothing
//! propagates an error to the interactive flow.

use crate::db::remote::{NewRemotePhoto, RemotePhotoPatch, RemoteStore};
use crate::models::photo::Photo;
use crate::services::imaging;

/// Cloud synchronizer over the remote store client.
#[derive(Clone)]
pub struct CloudSync {
    remote: RemoteStore,
}

/// Outcome of a successful remote insert, applied to the photo record by
/// the session (the single mutator).
#[derive(Debug, Clone)]
pub struct SyncReceipt {
    pub db_id: String,
    pub storage_path: Option<String>,
    pub thumb_path: Option<String>,
}

impl CloudSync {
    pub fn new(remote: RemoteStore) -> Self {
        Self { remote }
    }

    pub fn is_online(&self) -> bool {
        self.remote.is_online()
    }

    pub fn remote(&self) -> &RemoteStore {
        &self.remote
    }

    /// Insert a new photo: asset blobs first, then the metadata row.
    ///
    /// An asset-upload failure degrades to a metadata-only insert; a
    /// thumbnail failure nulls only the thumbnail reference. Returns None
    /// when the row insert itself fails (photo stays unsynced).
    pub async fn insert(&self, owner: &str, photo: &Photo) -> Option<SyncReceipt> {
        let mut storage_path = None;
        let mut thumb_path = None;

        if let Some(bytes) = &photo.image {
            let path = format!("{}/{}.jpg", owner, photo.id);
            match self.remote.upload_object(owner, &path, bytes.clone()).await {
                Ok(()) => storage_path = Some(path),
                Err(error) => {
                    tracing::warn!(photo = %photo.id, %error, "Asset upload failed, storing metadata only");
                }
            }

            if storage_path.is_some() {
                match imaging::thumbnail(bytes) {
                    Ok(thumb) => {
                        let path = format!("{}/thumbs/{}.jpg", owner, photo.id);
                        match self.remote.upload_object(owner, &path, thumb).await {
                            Ok(()) => thumb_path = Some(path),
                            Err(error) => {
                                tracing::warn!(photo = %photo.id, %error, "Thumbnail upload failed");
                            }
                        }
                    }
                    Err(error) => {
                        tracing::warn!(photo = %photo.id, %error, "Thumbnail creation failed");
                    }
                }
            }
        }

        let row = NewRemotePhoto::from_photo(photo, storage_path.clone(), thumb_path.clone());
        match self.remote.insert_photo(owner, &row).await {
            Ok(created) => {
                tracing::debug!(photo = %photo.id, db_id = %created.id, "Photo inserted remotely");
                Some(SyncReceipt {
                    db_id: created.id,
                    storage_path,
                    thumb_path,
                })
            }
            Err(error) => {
                tracing::warn!(photo = %photo.id, %error, "Remote insert failed");
                None
            }
        }
    }

    /// Push a metadata update for an already-synced photo. No-op for
    /// photos without a durable identity.
    pub async fn update(&self, owner: &str, photo: &Photo) {
        let Some(db_id) = photo.db_id.as_deref() else {
            return;
        };
        let patch = RemotePhotoPatch::from_photo(photo);
        if let Err(error) = self.remote.update_photo(owner, db_id, &patch).await {
            tracing::warn!(photo = %photo.id, %error, "Remote update failed");
        }
    }

    /// Delete a photo remotely: asset blobs first (failure tolerated),
    /// then the row.
    pub async fn delete(&self, owner: &str, photo: &Photo) {
        let paths: Vec<String> = photo
            .storage_path
            .iter()
            .chain(photo.thumb_path.iter())
            .cloned()
            .collect();
        if !paths.is_empty() {
            if let Err(error) = self.remote.remove_objects(owner, &paths).await {
                tracing::warn!(photo = %photo.id, %error, "Asset removal failed, deleting row anyway");
            }
        }
        if let Some(db_id) = photo.db_id.as_deref() {
            if let Err(error) = self.remote.delete_photo(owner, db_id).await {
                tracing::warn!(photo = %photo.id, %error, "Remote delete failed");
            }
        }
    }

    /// Bulk-delete every remote row and asset for the owner.
    pub async fn delete_all(&self, owner: &str) {
        if let Err(error) = self.remote.delete_all(owner).await {
            tracing::warn!(%error, "Remote bulk delete failed");
        }
    }

    /// Load the owner's remote photos; failures return empty.
    pub async fn load(&self, owner: &str) -> Vec<Photo> {
        match self.remote.list_photos(owner).await {
            Ok(rows) => {
                let count = rows.len();
                let photos: Vec<Photo> = rows.into_iter().filter_map(Photo::from_remote).collect();
                if photos.len() < count {
                    tracing::warn!(
                        dropped = count - photos.len(),
                        "Remote rows without coordinates were skipped"
                    );
                }
                tracing::info!(count = photos.len(), "Loaded photos from remote store");
                photos
            }
            Err(error) => {
                tracing::warn!(%error, "Remote load failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RemoteStore;

    #[tokio::test]
    async fn test_offline_insert_returns_none() {
        let sync = CloudSync::new(RemoteStore::offline());
        let photo = Photo::new(40.0, -3.0, "2024-01-01".to_string(), Some(vec![1, 2, 3]));
        assert!(sync.insert("owner", &photo).await.is_none());
    }

    #[tokio::test]
    async fn test_offline_load_returns_empty() {
        let sync = CloudSync::new(RemoteStore::offline());
        assert!(sync.load("owner").await.is_empty());
    }

    #[tokio::test]
    async fn test_update_without_db_id_is_noop() {
        let sync = CloudSync::new(RemoteStore::offline());
        let photo = Photo::new(40.0, -3.0, "2024-01-01".to_string(), None);
        // Must not error or log a remote failure: nothing to update yet.
        sync.update("owner", &photo).await;
    }
}
