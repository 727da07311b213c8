// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authoritative in-memory photo collection for the session.
//!
//! All reads go through this store; the grouping indices hold photo IDs
//! only. The pending queue holds uploads without coordinates — such
//! entries never enter the location or city indices.

use std::collections::{HashSet, VecDeque};

use crate::models::photo::{PendingPhoto, Photo, PhotoId};

#[derive(Debug, Default)]
pub struct PhotoStore {
    photos: Vec<Photo>,
    pending: VecDeque<PendingPhoto>,
    synced: HashSet<PhotoId>,
}

impl PhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Photo records ───────────────────────────────────────────

    pub fn insert(&mut self, photo: Photo) -> PhotoId {
        let id = photo.id;
        self.photos.push(photo);
        id
    }

    pub fn photo(&self, id: PhotoId) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn photo_mut(&mut self, id: PhotoId) -> Option<&mut Photo> {
        self.photos.iter_mut().find(|p| p.id == id)
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn contains(&self, id: PhotoId) -> bool {
        self.photo(id).is_some()
    }

    pub fn find_by_db_id(&self, db_id: &str) -> Option<&Photo> {
        self.photos.iter().find(|p| p.db_id.as_deref() == Some(db_id))
    }

    /// Current generation of a photo, if it still exists.
    pub fn generation(&self, id: PhotoId) -> Option<u64> {
        self.photo(id).map(|p| p.generation)
    }

    /// Remove the given IDs, returning the removed records. The synced set
    /// forgets them too, so a re-upload would insert fresh.
    pub fn remove_many(&mut self, ids: &HashSet<PhotoId>) -> Vec<Photo> {
        let mut removed = Vec::new();
        self.photos.retain(|p| {
            if ids.contains(&p.id) {
                removed.push(p.clone());
                false
            } else {
                true
            }
        });
        for id in ids {
            self.synced.remove(id);
        }
        removed
    }

    /// The `n` most recently added photos (insertion order).
    pub fn recent(&self, n: usize) -> &[Photo] {
        let start = self.photos.len().saturating_sub(n);
        &self.photos[start..]
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Drop photo records and their sync markers; the pending queue stays.
    pub fn clear_photos(&mut self) {
        self.photos.clear();
        self.synced.clear();
    }

    /// Full reset: records, pending queue, and synced set.
    pub fn clear(&mut self) {
        self.photos.clear();
        self.pending.clear();
        self.synced.clear();
    }

    // ─── Pending-placement queue ─────────────────────────────────

    pub fn push_pending(&mut self, pending: PendingPhoto) {
        self.pending.push_back(pending);
    }

    pub fn front_pending(&self) -> Option<&PendingPhoto> {
        self.pending.front()
    }

    pub fn pop_pending(&mut self) -> Option<PendingPhoto> {
        self.pending.pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    // ─── Synced set ──────────────────────────────────────────────

    pub fn mark_synced(&mut self, id: PhotoId) {
        self.synced.insert(id);
    }

    pub fn is_synced(&self, id: PhotoId) -> bool {
        self.synced.contains(&id)
    }

    pub fn synced_len(&self) -> usize {
        self.synced.len()
    }
}
