// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local durable cache: per-user JSON snapshots with tiered degradation.
//!
//! The cache holds one snapshot file per storage key under a quota that
//! models the browser-profile budget this tier descends from. Writes
//! degrade in tiers: full compression → smaller recompression when the
//! payload crosses the hard threshold → only the most recent photos at
//! minimum quality when the quota still rejects the write.

use std::fs;
use std::path::PathBuf;

use crate::config;
use crate::models::backup::{decode_photo_records, CacheEnvelope, CachePayload, PhotoRecord};
use crate::models::photo::Photo;
use crate::services::imaging;

/// Errors from local cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache quota exceeded ({size} > {quota} bytes)")]
    Quota { size: usize, quota: usize },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which degradation tier a save ended up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeTier {
    /// Standard compression, full photo set.
    Full,
    /// Smaller recompression after crossing the size threshold.
    Reduced,
    /// Quota fallback: only the most recent photos at minimum quality.
    Minimal,
}

/// Outcome of a save.
#[derive(Debug)]
pub struct SaveReport {
    pub written: usize,
    /// Photos excluded because they carry no local image bytes.
    pub skipped: usize,
    pub tier: DegradeTier,
    pub payload_bytes: usize,
}

pub struct LocalCache {
    dir: PathBuf,
    quota_bytes: u64,
}

impl LocalCache {
    pub fn new(dir: PathBuf, quota_bytes: u64) -> Self {
        Self { dir, quota_bytes }
    }

    /// Storage key for an owner. Without an identity the shared namespace
    /// key is used, which risks cross-user leakage in a shared profile.
    pub fn storage_key(owner: Option<&str>) -> String {
        match owner {
            Some(owner) => format!("{}:{}", config::STORAGE_NAMESPACE, owner),
            None => {
                tracing::warn!("No owner identity available, using shared cache key");
                config::STORAGE_NAMESPACE.to_string()
            }
        }
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }

    // ─── Save path ───────────────────────────────────────────────

    /// Persist a snapshot of the given photos for the owner.
    ///
    /// Photos without local image bytes (remote-only records) are excluded
    /// from this tier entirely.
    pub fn save(&self, owner: Option<&str>, photos: &[Photo]) -> Result<SaveReport, CacheError> {
        let key = Self::storage_key(owner);

        let (records, skipped) = build_records(photos, config::CACHE_COMPRESSION);
        if records.is_empty() {
            tracing::debug!(skipped, "No locally-backed photos to persist");
            return Ok(SaveReport {
                written: 0,
                skipped,
                tier: DegradeTier::Full,
                payload_bytes: 0,
            });
        }
        let written = records.len();

        let json = serde_json::to_vec(&CacheEnvelope::from_records(records)?)?;
        let (json, tier) = if json.len() > config::MAX_CACHE_JSON_BYTES {
            tracing::warn!(
                bytes = json.len(),
                threshold = config::MAX_CACHE_JSON_BYTES,
                "Cache payload over threshold, recompressing smaller"
            );
            let (records, _) = build_records(photos, config::CACHE_COMPRESSION_SMALL);
            let smaller = serde_json::to_vec(&CacheEnvelope::from_records(records)?)?;
            (smaller, DegradeTier::Reduced)
        } else {
            (json, DegradeTier::Full)
        };

        match self.write(&key, &json) {
            Ok(()) => Ok(SaveReport {
                written,
                skipped,
                tier,
                payload_bytes: json.len(),
            }),
            Err(CacheError::Quota { size, quota }) => {
                tracing::warn!(
                    size,
                    quota,
                    keep = config::FALLBACK_PHOTO_COUNT,
                    "Cache quota exceeded, keeping only the most recent photos"
                );
                self.save_minimal(&key, photos, skipped)
            }
            Err(other) => Err(other),
        }
    }

    /// Quota fallback: the most recent photos at minimum quality.
    fn save_minimal(
        &self,
        key: &str,
        photos: &[Photo],
        skipped: usize,
    ) -> Result<SaveReport, CacheError> {
        let start = photos.len().saturating_sub(config::FALLBACK_PHOTO_COUNT);
        let (records, _) = build_records(&photos[start..], config::CACHE_COMPRESSION_MINIMAL);
        let written = records.len();
        let json = serde_json::to_vec(&CacheEnvelope::from_records(records)?)?;
        self.write(key, &json)?;
        Ok(SaveReport {
            written,
            skipped,
            tier: DegradeTier::Minimal,
            payload_bytes: json.len(),
        })
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        if bytes.len() as u64 > self.quota_bytes {
            return Err(CacheError::Quota {
                size: bytes.len(),
                quota: self.quota_bytes as usize,
            });
        }
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for_key(key), bytes)?;
        Ok(())
    }

    // ─── Load path ───────────────────────────────────────────────

    /// Load the owner's snapshot. Accepts both the versioned envelope and
    /// the legacy bare array; missing file yields an empty set.
    pub fn load(&self, owner: Option<&str>) -> Result<Vec<Photo>, CacheError> {
        let key = Self::storage_key(owner);
        let path = self.path_for_key(&key);

        if !path.exists() {
            // A bare-namespace snapshot left by an older release would leak
            // across users; drop it once a keyed session comes through.
            if owner.is_some() {
                let legacy = self.path_for_key(config::STORAGE_NAMESPACE);
                if legacy.exists() {
                    tracing::warn!("Removing un-keyed legacy cache snapshot");
                    let _ = fs::remove_file(legacy);
                }
            }
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&path)?;
        let payload: CachePayload = serde_json::from_str(&raw)?;
        let (version, values) = payload.into_parts();
        if version == 0 {
            tracing::info!("Loading legacy cache format");
        }
        let total = values.len();
        let photos = decode_photo_records(values);
        tracing::debug!(version, loaded = photos.len(), total, "Cache snapshot loaded");
        Ok(photos)
    }

    /// Drop the owner's snapshot (delete-all, logout cleanup).
    pub fn remove(&self, owner: Option<&str>) {
        let path = self.path_for_key(&Self::storage_key(owner));
        if let Err(error) = fs::remove_file(&path) {
            if error.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(%error, "Failed to remove cache snapshot");
            }
        }
    }
}

/// Build wire records at a compression tier, skipping photos without
/// local bytes. Recompression failures fall back to the original bytes.
fn build_records(photos: &[Photo], tier: (u32, u8)) -> (Vec<PhotoRecord>, usize) {
    let (max_width, quality) = tier;
    let mut records = Vec::new();
    let mut skipped = 0;

    for photo in photos {
        let Some(bytes) = photo.image.as_deref() else {
            skipped += 1;
            continue;
        };
        let compressed = match imaging::recompress(bytes, max_width, quality) {
            Ok(compressed) => compressed,
            Err(error) => {
                tracing::warn!(photo = %photo.id, %error, "Recompression failed, keeping original bytes");
                bytes.to_vec()
            }
        };
        records.push(PhotoRecord::from_photo(photo, Some(compressed.as_slice())));
    }

    (records, skipped)
}
