// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Time-bounded cache of display URLs for remote-stored assets.
//!
//! The TTL is strictly shorter than the signed URL's validity window, so
//! a cache hit is always still usable when served.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config;
use crate::db::remote::RemoteStore;
use crate::models::photo::{Photo, PhotoId, Variant};
use crate::services::imaging;

struct CachedUrl {
    url: String,
    fetched_at: Instant,
}

/// Signed-URL cache keyed by photo and variant.
pub struct UrlCache {
    entries: DashMap<(PhotoId, Variant), CachedUrl>,
    ttl: Duration,
}

impl Default for UrlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlCache {
    pub fn new() -> Self {
        Self::with_ttl(config::URL_CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// A cached URL, if present and younger than the TTL.
    pub fn get(&self, id: PhotoId, variant: Variant, now: Instant) -> Option<String> {
        let entry = self.entries.get(&(id, variant))?;
        if now.duration_since(entry.fetched_at) < self.ttl {
            Some(entry.url.clone())
        } else {
            None
        }
    }

    pub fn put(&self, id: PhotoId, variant: Variant, url: String, now: Instant) {
        self.entries
            .insert((id, variant), CachedUrl { url, fetched_at: now });
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Resolve a display URL for a photo.
///
/// Order: fresh cache entry → direct URL already on the photo → freshly
/// signed URL for a stored asset (cached) → inline data URL from local
/// bytes → None (caller renders a placeholder). Collaborator errors are
/// logged and treated as a miss.
pub async fn resolve_display_url(
    cache: &UrlCache,
    remote: &RemoteStore,
    owner: Option<&str>,
    photo: &Photo,
    variant: Variant,
) -> Option<String> {
    let now = Instant::now();
    if let Some(url) = cache.get(photo.id, variant, now) {
        return Some(url);
    }

    let direct = match variant {
        Variant::Full => photo.image_url.clone(),
        Variant::Thumb => photo.thumb_url.clone(),
    };
    if let Some(url) = direct {
        cache.put(photo.id, variant, url.clone(), now);
        return Some(url);
    }

    let stored_path = match variant {
        Variant::Full => photo.storage_path.as_deref(),
        Variant::Thumb => photo.thumb_path.as_deref(),
    };
    if stored_path.is_some() {
        if let (Some(owner), Some(db_id)) = (owner, photo.db_id.as_deref()) {
            match remote
                .signed_url(owner, db_id, variant == Variant::Thumb)
                .await
            {
                Ok(url) => {
                    cache.put(photo.id, variant, url.clone(), now);
                    return Some(url);
                }
                Err(error) => {
                    tracing::warn!(photo = %photo.id, %error, "Signed URL request failed");
                }
            }
        }
    }

    photo.image.as_deref().map(imaging::data_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_fresh_entry_hits() {
        let cache = UrlCache::with_ttl(Duration::from_secs(60));
        let id = Uuid::new_v4();
        let now = Instant::now();
        cache.put(id, Variant::Full, "https://x/url".to_string(), now);
        assert_eq!(
            cache.get(id, Variant::Full, now + Duration::from_secs(59)),
            Some("https://x/url".to_string())
        );
    }

    #[test]
    fn test_expired_entry_misses() {
        let cache = UrlCache::with_ttl(Duration::from_secs(60));
        let id = Uuid::new_v4();
        let now = Instant::now();
        cache.put(id, Variant::Full, "https://x/url".to_string(), now);
        assert!(cache.get(id, Variant::Full, now + Duration::from_secs(60)).is_none());
    }

    #[test]
    fn test_variants_are_distinct_entries() {
        let cache = UrlCache::with_ttl(Duration::from_secs(60));
        let id = Uuid::new_v4();
        let now = Instant::now();
        cache.put(id, Variant::Thumb, "https://x/thumb".to_string(), now);
        assert!(cache.get(id, Variant::Full, now).is_none());
        assert!(cache.get(id, Variant::Thumb, now).is_some());
    }

    #[tokio::test]
    async fn test_resolution_falls_back_to_local_bytes() {
        let cache = UrlCache::new();
        let remote = RemoteStore::offline();
        let photo = Photo::new(40.0, -3.0, "d".to_string(), Some(vec![1, 2, 3]));
        let url = resolve_display_url(&cache, &remote, None, &photo, Variant::Full)
            .await
            .unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_resolution_without_any_source_is_none() {
        let cache = UrlCache::new();
        let remote = RemoteStore::offline();
        let photo = Photo::new(40.0, -3.0, "d".to_string(), None);
        assert!(
            resolve_display_url(&cache, &remote, None, &photo, Variant::Full)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_signed_url_failure_falls_through_to_local() {
        let cache = UrlCache::new();
        let remote = RemoteStore::offline();
        let mut photo = Photo::new(40.0, -3.0, "d".to_string(), Some(vec![9]));
        photo.storage_path = Some("owner/a.jpg".to_string());
        photo.db_id = Some("row".to_string());
        // Offline remote errors; resolution degrades to the data URL.
        let url = resolve_display_url(&cache, &remote, Some("owner"), &photo, Variant::Full)
            .await
            .unwrap();
        assert!(url.starts_with("data:"));
    }
}
