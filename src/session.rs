// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session controller.
//!
//! One `Session` owns the photo store, grouping indices, caches, and
//! collaborator clients for a single authenticated owner. All state
//! mutation flows through `&mut Session`; asynchronous completions
//! (geocodes, sync receipts) re-enter through guarded `apply_*` methods
//! that first check the target photo still exists with an unchanged
//! generation, so out-of-order or post-delete completions are discarded
//! instead of resurrecting state.

use std::collections::HashSet;
use std::time::Instant;

use futures_util::{stream, StreamExt};

use crate::cache::{DegradeTier, LocalCache};
use crate::config::{self, Config};
use crate::db::RemoteStore;
use crate::error::AppError;
use crate::geo::coords;
use crate::models::backup::{decode_photo_records, BackupFile};
use crate::models::photo::{PendingPhoto, Photo, PhotoId, Variant};
use crate::models::stats::TripStats;
use crate::services::grouping::{GroupingEngine, RefreshOutcome};
use crate::services::sync::{CloudSync, SyncReceipt};
use crate::services::upload::extract_photo_meta;
use crate::services::url_cache::{self, UrlCache};
use crate::services::{CityCandidate, Geocoder, ResolvedPlace};
use crate::store::PhotoStore;

/// Outcome of one ingest batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Photos with embedded GPS, placed immediately.
    pub placed: usize,
    /// Photos without GPS, queued for manual city selection.
    pub pending: usize,
}

/// A captured geocode request: target photo plus the generation at
/// request time.
#[derive(Debug, Clone, Copy)]
struct GeocodeJob {
    id: PhotoId,
    generation: u64,
    lat: f64,
    lon: f64,
}

pub struct Session {
    owner: Option<String>,
    store: PhotoStore,
    groups: GroupingEngine,
    sync: CloudSync,
    cache: LocalCache,
    urls: UrlCache,
    geocoder: Geocoder,
    stats: TripStats,
}

impl Session {
    /// Create a session for the configured owner. Lives from sign-in to
    /// sign-out; a user change calls [`Session::reset`] or builds afresh.
    pub fn new(config: &Config, remote: RemoteStore) -> Self {
        Self {
            owner: config.owner_id.clone(),
            store: PhotoStore::new(),
            groups: GroupingEngine::new(Instant::now()),
            sync: CloudSync::new(remote),
            cache: LocalCache::new(config.cache_dir.clone(), config.cache_quota_bytes),
            urls: UrlCache::new(),
            geocoder: Geocoder::new(config.geocoder_base_url.clone()),
            stats: TripStats::default(),
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn store(&self) -> &PhotoStore {
        &self.store
    }

    pub fn groups(&self) -> &GroupingEngine {
        &self.groups
    }

    pub fn stats(&self) -> &TripStats {
        &self.stats
    }

    /// Clear all session state (user change / logout). Local cache files
    /// stay on disk, keyed per user.
    pub fn reset(&mut self) {
        self.store.clear();
        self.groups.clear();
        self.urls.clear();
        self.stats = TripStats::default();
    }

    // ─── Load & merge ────────────────────────────────────────────

    /// Load the local cache tier and merge the remote tier, then kick off
    /// geocode reconciliation and persist the merged set.
    pub async fn load(&mut self) {
        match self.cache.load(self.owner.as_deref()) {
            Ok(photos) => {
                let count = photos.len();
                for photo in photos {
                    let id = photo.id;
                    let synced = photo.db_id.is_some();
                    self.store.insert(photo);
                    if synced {
                        self.store.mark_synced(id);
                    }
                    self.groups.assign_photo(&mut self.store, id, Instant::now());
                }
                tracing::info!(count, "Loaded photos from local cache");
            }
            Err(error) => tracing::warn!(%error, "Failed to load local cache"),
        }

        // Local photos that never reached the remote store get queued now.
        let unsynced: Vec<PhotoId> = self
            .store
            .photos()
            .iter()
            .filter(|p| !self.store.is_synced(p.id))
            .map(|p| p.id)
            .collect();
        self.sync_insert_many(unsynced).await;

        // Remote tier: rows already known locally only confirm sync state;
        // new rows join the store as remote-only photos.
        if let Some(owner) = self.owner.clone() {
            for remote_photo in self.sync.load(&owner).await {
                let db_id = remote_photo.db_id.clone().unwrap_or_default();
                if let Some(existing) = self.store.find_by_db_id(&db_id) {
                    let existing_id = existing.id;
                    self.store.mark_synced(existing_id);
                    continue;
                }
                let id = self.store.insert(remote_photo);
                self.store.mark_synced(id);
                self.groups.assign_photo(&mut self.store, id, Instant::now());
            }
        }

        self.recompute_stats();
        self.reconcile_geocoding().await;
        self.persist_local();
    }

    // ─── Ingest ──────────────────────────────────────────────────

    /// Ingest a batch of uploaded files.
    ///
    /// File decoding runs concurrently; the save and stats pass is gated
    /// on every decode having completed, regardless of completion order.
    /// Geocode enrichment then runs for the newly placed photos.
    pub async fn ingest_files(&mut self, files: Vec<Vec<u8>>) -> IngestReport {
        if files.is_empty() {
            return IngestReport::default();
        }

        let decoded: Vec<_> = stream::iter(files)
            .map(|bytes| async move {
                let meta = extract_photo_meta(&bytes);
                (bytes, meta)
            })
            .buffer_unordered(config::UPLOAD_CONCURRENCY)
            .collect()
            .await;

        let mut report = IngestReport::default();
        let mut placed_ids = Vec::new();
        for (bytes, meta) in decoded {
            let date = meta
                .date
                .unwrap_or_else(|| config::UNKNOWN_DATE.to_string());
            match meta.coords {
                Some((lat, lon)) => {
                    let photo = Photo::new(lat, lon, date, Some(bytes));
                    let id = self.store.insert(photo);
                    self.groups.assign_photo(&mut self.store, id, Instant::now());
                    placed_ids.push(id);
                    report.placed += 1;
                }
                None => {
                    self.store.push_pending(PendingPhoto::new(date, bytes));
                    report.pending += 1;
                }
            }
        }

        self.sync_insert_many(placed_ids.clone()).await;

        // Every file has been processed: one save + stats pass.
        self.persist_local();
        self.recompute_stats();
        if report.pending > 0 {
            tracing::info!(
                pending = report.pending,
                "Uploads without GPS queued for manual placement"
            );
        }

        let jobs = self.geocode_jobs_for(&placed_ids);
        self.run_geocode_jobs(jobs).await;
        report
    }

    /// Insert a single already-built photo (imports, manual placement).
    pub fn add_photo(&mut self, photo: Photo) -> PhotoId {
        let id = self.store.insert(photo);
        self.groups.assign_photo(&mut self.store, id, Instant::now());
        id
    }

    // ─── Pending-placement queue ─────────────────────────────────

    pub fn pending_len(&self) -> usize {
        self.store.pending_len()
    }

    pub fn front_pending(&self) -> Option<&PendingPhoto> {
        self.store.front_pending()
    }

    /// Place the front pending photo at the chosen city.
    ///
    /// An empty selection blocks the action without touching the queue.
    pub async fn confirm_city(&mut self, city: &CityCandidate) -> Option<PhotoId> {
        if city.name.trim().is_empty() {
            return None;
        }
        let pending = self.store.pop_pending()?;

        let mut photo = Photo::new(city.lat, city.lon, pending.date, Some(pending.image));
        photo.id = pending.id;
        photo.location = format!("{}, {}", city.name, city.country);
        photo.country = city.country.clone();
        if !city.country_code.is_empty() {
            photo.country_code = Some(city.country_code.clone());
        }

        let id = self.add_photo(photo);
        self.sync_insert_many(vec![id]).await;
        self.recompute_stats();
        self.persist_local();
        Some(id)
    }

    /// Drop the front pending photo without placing it.
    pub fn skip_pending(&mut self) -> bool {
        self.store.pop_pending().is_some()
    }

    // ─── Geocoding reconciliation ────────────────────────────────

    /// Re-geocode photos still on the fallback place or lacking a country
    /// code (cache loads from before codes were stored).
    pub async fn reconcile_geocoding(&mut self) {
        let ids: Vec<PhotoId> = self
            .store
            .photos()
            .iter()
            .filter(|p| p.location == config::FALLBACK_LOCATION || p.country_code.is_none())
            .map(|p| p.id)
            .collect();
        let jobs = self.geocode_jobs_for(&ids);
        self.run_geocode_jobs(jobs).await;
    }

    fn geocode_jobs_for(&self, ids: &[PhotoId]) -> Vec<GeocodeJob> {
        ids.iter()
            .filter_map(|&id| {
                self.store.photo(id).map(|p| GeocodeJob {
                    id,
                    generation: p.generation,
                    lat: p.lat,
                    lon: p.lon,
                })
            })
            .collect()
    }

    /// Fire the lookups without mutual exclusion and apply each result as
    /// it completes; the guards in [`Session::apply_geocode`] handle the
    /// out-of-order and post-delete cases.
    async fn run_geocode_jobs(&mut self, jobs: Vec<GeocodeJob>) {
        if jobs.is_empty() {
            return;
        }
        let geocoder = self.geocoder.clone();
        let mut results = stream::iter(jobs)
            .map(|job| {
                let geocoder = geocoder.clone();
                async move {
                    let result = geocoder.reverse(job.lat, job.lon).await;
                    (job, result)
                }
            })
            .buffer_unordered(config::GEOCODE_CONCURRENCY);

        while let Some((job, result)) = results.next().await {
            match result {
                Ok(place) => {
                    self.apply_geocode(job.id, job.generation, job.lat, job.lon, place)
                        .await;
                }
                Err(error) => {
                    tracing::warn!(photo = %job.id, %error, "Reverse geocoding failed");
                }
            }
        }
    }

    /// Apply a reverse-geocode result captured at `generation`.
    ///
    /// The location-group metadata updates independently of the photo-level
    /// guards. The photo itself only mutates when it still exists, the
    /// generation has not advanced, and the result is more specific than
    /// the fallback place.
    pub async fn apply_geocode(
        &mut self,
        id: PhotoId,
        generation: u64,
        lat: f64,
        lon: f64,
        place: ResolvedPlace,
    ) {
        self.groups
            .update_location_meta(&coords::location_key(lat, lon), &place);

        {
            let Some(photo) = self.store.photo_mut(id) else {
                tracing::debug!(photo = %id, "Discarding geocode result for deleted photo");
                return;
            };
            if photo.generation != generation {
                tracing::debug!(
                    photo = %id,
                    captured = generation,
                    current = photo.generation,
                    "Discarding stale geocode result"
                );
                return;
            }
            if place.display_name == config::FALLBACK_LOCATION {
                return;
            }
            photo.set_place(place.display_name, place.country, place.country_code);
        }

        self.groups.assign_photo(&mut self.store, id, Instant::now());

        if let (Some(owner), Some(photo)) = (self.owner.clone(), self.store.photo(id).cloned()) {
            self.sync.update(&owner, &photo).await;
        }
        self.persist_local();
        self.recompute_stats();
    }

    // ─── Notes ───────────────────────────────────────────────────

    /// Replace a photo's note; pushes the remote update and persists.
    pub async fn save_note(&mut self, id: PhotoId, title: String, description: String) -> bool {
        let Some(photo) = self.store.photo_mut(id) else {
            return false;
        };
        photo.set_note(title, description);
        let snapshot = photo.clone();

        if let Some(owner) = self.owner.clone() {
            self.sync.update(&owner, &snapshot).await;
        }
        self.persist_local();
        true
    }

    // ─── Deletion ────────────────────────────────────────────────

    /// Delete the selected photos. Remote deletion is attempted first but
    /// the local removal proceeds regardless (optimistic).
    pub async fn delete_photos(&mut self, ids: &HashSet<PhotoId>) -> usize {
        if ids.is_empty() {
            return 0;
        }

        if let Some(owner) = self.owner.clone() {
            let targets: Vec<Photo> = self
                .store
                .photos()
                .iter()
                .filter(|p| ids.contains(&p.id) && p.db_id.is_some())
                .cloned()
                .collect();
            for photo in &targets {
                self.sync.delete(&owner, photo).await;
            }
        }

        // Derived indices clear first, then the records leave the store.
        let outcome = self.groups.remove_photos(ids, Instant::now());
        let removed = self.store.remove_many(ids);
        tracing::info!(
            deleted = removed.len(),
            markers_removed = outcome.removed,
            "Photos deleted"
        );

        self.persist_local();
        self.recompute_stats();
        removed.len()
    }

    /// Delete everything: remote rows, in-memory state, groups, markers,
    /// the synced set, and the local cache snapshot.
    pub async fn delete_all(&mut self) {
        if let Some(owner) = self.owner.clone() {
            self.sync.delete_all(&owner).await;
        }
        self.groups.clear();
        self.store.clear();
        self.urls.clear();
        self.cache.remove(self.owner.as_deref());
        self.recompute_stats();
        tracing::info!("All photos deleted");
    }

    // ─── Backup ──────────────────────────────────────────────────

    /// Export the current photo set as a backup file.
    pub fn export_backup(&self) -> Result<String, AppError> {
        let backup = BackupFile::export(self.store.photos())?;
        serde_json::to_string_pretty(&backup).map_err(|e| AppError::InvalidData(e.to_string()))
    }

    /// Import a backup, replacing the current photo set. The caller is
    /// responsible for user confirmation of the destructive replace;
    /// `allow_legacy` covers un-versioned files after their own prompt.
    pub async fn import_backup(&mut self, json: &str, allow_legacy: bool) -> Result<usize, AppError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| AppError::InvalidData(e.to_string()))?;

        let records = match value.get("schemaVersion").and_then(|v| v.as_u64()) {
            Some(version) => {
                if version > u64::from(config::SCHEMA_VERSION) {
                    return Err(AppError::InvalidData(format!(
                        "backup schema v{} is newer than supported v{}",
                        version,
                        config::SCHEMA_VERSION
                    )));
                }
                match value.get("photos").and_then(|v| v.as_array()) {
                    Some(photos) if !photos.is_empty() => photos.clone(),
                    _ => {
                        return Err(AppError::InvalidData(
                            "backup contains no photos".to_string(),
                        ))
                    }
                }
            }
            None => {
                // Legacy files are bare arrays; import is best-effort and
                // requires its own confirmation upstream.
                if !allow_legacy {
                    return Err(AppError::InvalidData(
                        "backup has no schema version".to_string(),
                    ));
                }
                match value.as_array() {
                    Some(photos) => {
                        tracing::info!("Importing legacy backup format");
                        photos.clone()
                    }
                    None => {
                        return Err(AppError::InvalidData(
                            "legacy backup is not a photo array".to_string(),
                        ))
                    }
                }
            }
        };

        let photos = decode_photo_records(records);
        if photos.is_empty() {
            return Err(AppError::InvalidData(
                "backup contains no valid photos".to_string(),
            ));
        }

        // Replace current data
        self.groups.clear();
        self.store.clear_photos();

        let mut imported = 0;
        for photo in photos {
            self.add_photo(photo);
            imported += 1;
        }

        self.persist_local();
        self.recompute_stats();
        tracing::info!(imported, "Backup imported");
        Ok(imported)
    }

    // ─── Remote sync plumbing ────────────────────────────────────

    /// Insert the given photos remotely, skipping any already in the
    /// synced set, and apply the receipts. Failures leave photos unsynced.
    async fn sync_insert_many(&mut self, ids: Vec<PhotoId>) {
        let Some(owner) = self.owner.clone() else {
            return;
        };
        if !self.sync.is_online() {
            return;
        }

        let jobs: Vec<Photo> = ids
            .into_iter()
            .filter(|&id| !self.store.is_synced(id))
            .filter_map(|id| self.store.photo(id).cloned())
            .collect();
        if jobs.is_empty() {
            return;
        }

        let sync = self.sync.clone();
        let receipts: Vec<(PhotoId, Option<SyncReceipt>)> = stream::iter(jobs)
            .map(|photo| {
                let sync = sync.clone();
                let owner = owner.clone();
                async move {
                    let id = photo.id;
                    let receipt = sync.insert(&owner, &photo).await;
                    (id, receipt)
                }
            })
            .buffer_unordered(config::UPLOAD_CONCURRENCY)
            .collect()
            .await;

        for (id, receipt) in receipts {
            if let Some(receipt) = receipt {
                self.apply_sync_receipt(id, receipt);
            }
        }
    }

    /// Record a successful remote insert. Sync bookkeeping does not bump
    /// the generation: a receipt must not invalidate an in-flight geocode.
    fn apply_sync_receipt(&mut self, id: PhotoId, receipt: SyncReceipt) {
        let Some(photo) = self.store.photo_mut(id) else {
            tracing::debug!(photo = %id, "Discarding sync receipt for deleted photo");
            return;
        };
        photo.db_id = Some(receipt.db_id);
        photo.storage_path = receipt.storage_path;
        photo.thumb_path = receipt.thumb_path;
        photo.has_image = photo.storage_path.is_some();
        self.store.mark_synced(id);
    }

    // ─── Display URLs ────────────────────────────────────────────

    /// Resolve a display URL for a photo (see [`url_cache`] for the
    /// fallback order). None means "render a placeholder".
    pub async fn display_url(&self, id: PhotoId, variant: Variant) -> Option<String> {
        let photo = self.store.photo(id)?;
        url_cache::resolve_display_url(
            &self.urls,
            self.sync.remote(),
            self.owner.as_deref(),
            photo,
            variant,
        )
        .await
    }

    /// Forward city search for the manual-placement flow.
    pub async fn search_cities(&self, query: &str) -> Result<Vec<CityCandidate>, AppError> {
        self.geocoder.search_cities(query).await
    }

    // ─── Derived state ───────────────────────────────────────────

    /// Run the debounced marker refresh if its token has come due.
    pub fn poll(&mut self, now: Instant) -> Option<RefreshOutcome> {
        self.groups.poll_refresh(now)
    }

    pub fn recompute_stats(&mut self) {
        self.stats = TripStats::recompute(
            self.store.photos(),
            self.groups.locations(),
            self.groups.cities(),
        );
    }

    /// Write the local cache tier. Failures leave memory as the only copy
    /// and are surfaced as log records, never as errors to the caller.
    pub fn persist_local(&mut self) {
        match self.cache.save(self.owner.as_deref(), self.store.photos()) {
            Ok(report) => match report.tier {
                DegradeTier::Full => {
                    tracing::debug!(written = report.written, bytes = report.payload_bytes, "Local cache saved");
                }
                DegradeTier::Reduced => {
                    tracing::warn!(written = report.written, "Local cache saved at reduced quality");
                }
                DegradeTier::Minimal => {
                    tracing::warn!(
                        written = report.written,
                        "Storage limited: only the most recent photos were kept locally"
                    );
                }
            },
            Err(error) => {
                tracing::error!(%error, "Local cache write failed; in-memory state is the only copy");
            }
        }
    }
}
