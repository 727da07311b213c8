//! Application configuration and tuning constants.
//!
//! Runtime settings come from environment variables (with `.env` support);
//! the constants below are the product's fixed tuning knobs.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Current schema version for persisted photo envelopes and backups.
pub const SCHEMA_VERSION: u32 = 1;

/// App version recorded in backup exports.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Namespace prefix for local cache keys.
pub const STORAGE_NAMESPACE: &str = "photo-atlas";

/// Placeholder place for photos with no resolved location yet.
pub const FALLBACK_LOCATION: &str = "Madrid, España";
/// Country component of the fallback place.
pub const FALLBACK_COUNTRY: &str = "España";
/// City component of the fallback place.
pub const FALLBACK_CITY: &str = "Madrid";
/// Placeholder for photos carrying no capture date.
pub const UNKNOWN_DATE: &str = "Fecha desconocida";

/// Validity requested for remote signed URLs (seconds).
pub const SIGNED_URL_EXPIRY_SECS: u64 = 3600;
/// Cached display URLs are reused for strictly less than the signed validity.
pub const URL_CACHE_TTL: Duration = Duration::from_secs(50 * 60);

/// Debounce window coalescing marker refreshes.
pub const MARKER_REFRESH_DEBOUNCE: Duration = Duration::from_millis(300);
/// Viewport fits are suppressed until this long after engine creation.
pub const MAP_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Hard ceiling on the serialized local cache payload before degradation.
pub const MAX_CACHE_JSON_BYTES: usize = 4 * 1024 * 1024;
/// Photos kept when the quota fallback kicks in.
pub const FALLBACK_PHOTO_COUNT: usize = 10;

/// Image recompression tiers as (max width px, JPEG quality).
pub const CACHE_COMPRESSION: (u32, u8) = (600, 60);
pub const CACHE_COMPRESSION_SMALL: (u32, u8) = (400, 40);
pub const CACHE_COMPRESSION_MINIMAL: (u32, u8) = (300, 30);
/// Thumbnail bound for remote uploads (applies to both dimensions).
pub const THUMBNAIL_COMPRESSION: (u32, u8) = (200, 70);

/// Concurrent reverse-geocode lookups in flight.
pub const GEOCODE_CONCURRENCY: usize = 5;
/// Concurrent uploads decoded / synced in flight.
pub const UPLOAD_CONCURRENCY: usize = 8;
/// Minimum query length for forward city search.
pub const CITY_SEARCH_MIN_CHARS: usize = 2;
/// Result limit for forward city search.
pub const CITY_SEARCH_LIMIT: u32 = 10;
/// User agent sent to the geocoding service.
pub const GEOCODER_USER_AGENT: &str = "photo-atlas/0.1";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote photo store; None runs the session offline.
    pub remote_base_url: Option<String>,
    /// Opaque owner identity from the auth provider; None falls back to
    /// the shared cache key and disables remote sync.
    pub owner_id: Option<String>,
    /// Base URL of the Nominatim-compatible geocoder.
    pub geocoder_base_url: String,
    /// Directory holding local cache snapshots.
    pub cache_dir: PathBuf,
    /// Simulated quota for the local cache tier, in bytes.
    pub cache_quota_bytes: u64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            remote_base_url: None,
            owner_id: Some("test-owner".to_string()),
            geocoder_base_url: "https://nominatim.openstreetmap.org".to_string(),
            cache_dir: PathBuf::from(".photo-atlas/cache"),
            cache_quota_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            remote_base_url: env::var("REMOTE_STORE_URL").ok(),
            owner_id: env::var("OWNER_ID").ok(),
            geocoder_base_url: env::var("GEOCODER_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            cache_dir: env::var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".photo-atlas/cache")),
            cache_quota_bytes: env::var("CACHE_QUOTA_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5 * 1024 * 1024),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert!(config.remote_base_url.is_none());
        assert_eq!(config.cache_quota_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_url_cache_ttl_below_signed_expiry() {
        // A cached URL must never outlive the signed URL it wraps.
        assert!(URL_CACHE_TTL < Duration::from_secs(SIGNED_URL_EXPIRY_SECS));
    }
}
