// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wire shapes for the local cache and backup files.
//!
//! Two shapes exist on disk: the versioned envelope
//! `{schemaVersion, exportDate, photos}` and the legacy bare array written
//! by early releases. Both decode into the same in-memory [`Photo`] shape;
//! malformed records are dropped individually, never failing the batch.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::error::AppError;
use crate::models::photo::{Photo, PhotoId};

/// One photo as persisted to the local cache or a backup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    #[serde(default)]
    pub id: Option<PhotoId>,
    /// Base64-encoded JPEG bytes.
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub note_title: String,
    #[serde(default)]
    pub note_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_id: Option<String>,
}

impl PhotoRecord {
    /// Build a record from a photo, substituting recompressed image bytes.
    /// Remote-only photos (no local bytes) carry no image payload.
    pub fn from_photo(photo: &Photo, image: Option<&[u8]>) -> Self {
        Self {
            id: Some(photo.id),
            image_data: image.map(|bytes| BASE64.encode(bytes)),
            lat: Some(photo.lat),
            lon: Some(photo.lon),
            date: Some(photo.date.clone()),
            location: Some(photo.location.clone()),
            country: Some(photo.country.clone()),
            country_code: photo.country_code.clone(),
            note_title: photo.note_title.clone(),
            note_description: photo.note_description.clone(),
            db_id: photo.db_id.clone(),
        }
    }
}

impl Photo {
    /// Decode a wire record into the in-memory shape.
    ///
    /// Returns None when a mandatory field (image data, lat, lon) is
    /// missing or the image payload is not valid base64.
    pub fn from_record(record: PhotoRecord) -> Option<Self> {
        let image = BASE64.decode(record.image_data?).ok()?;
        let lat = record.lat?;
        let lon = record.lon?;

        let mut photo = Photo::new(
            lat,
            lon,
            record.date.unwrap_or_else(|| config::UNKNOWN_DATE.to_string()),
            Some(image),
        );
        photo.id = record.id.unwrap_or_else(Uuid::new_v4);
        if let Some(location) = record.location {
            photo.location = location;
        }
        if let Some(country) = record.country {
            photo.country = country;
        }
        photo.country_code = record.country_code;
        photo.note_title = record.note_title;
        photo.note_description = record.note_description;
        photo.db_id = record.db_id;
        Some(photo)
    }
}

/// Versioned envelope for local cache snapshots.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEnvelope {
    pub schema_version: u32,
    #[serde(default)]
    pub export_date: Option<String>,
    pub photos: Vec<serde_json::Value>,
}

impl CacheEnvelope {
    pub fn from_records(records: Vec<PhotoRecord>) -> Result<Self, serde_json::Error> {
        Ok(Self {
            schema_version: config::SCHEMA_VERSION,
            export_date: Some(chrono::Utc::now().to_rfc3339()),
            photos: records
                .into_iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// The two shapes accepted when reading the local cache.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CachePayload {
    Versioned(CacheEnvelope),
    Legacy(Vec<serde_json::Value>),
}

impl CachePayload {
    /// Flatten either shape to `(schema version, raw records)`.
    /// Legacy arrays report version 0.
    pub fn into_parts(self) -> (u32, Vec<serde_json::Value>) {
        match self {
            CachePayload::Versioned(env) => (env.schema_version, env.photos),
            CachePayload::Legacy(photos) => (0, photos),
        }
    }
}

/// Backup export file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub schema_version: u32,
    pub export_date: String,
    pub app_version: String,
    pub total_photos: usize,
    pub photos: Vec<serde_json::Value>,
}

impl BackupFile {
    /// Build an export from the current photo set.
    ///
    /// Photos without local image bytes export without a payload and will
    /// be skipped on import; their assets live in the remote store.
    pub fn export(photos: &[Photo]) -> Result<Self, AppError> {
        if photos.is_empty() {
            return Err(AppError::InvalidData("no photos to export".to_string()));
        }
        let records: Vec<serde_json::Value> = photos
            .iter()
            .map(|p| serde_json::to_value(PhotoRecord::from_photo(p, p.image.as_deref())))
            .collect::<Result<_, _>>()
            .map_err(|e| AppError::InvalidData(e.to_string()))?;

        Ok(Self {
            schema_version: config::SCHEMA_VERSION,
            export_date: chrono::Utc::now().to_rfc3339(),
            app_version: config::APP_VERSION.to_string(),
            total_photos: photos.len(),
            photos: records,
        })
    }
}

/// Decode raw records leniently: malformed or incomplete entries are
/// skipped with a warning instead of failing the batch.
pub fn decode_photo_records(values: Vec<serde_json::Value>) -> Vec<Photo> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let record: PhotoRecord = match serde_json::from_value(value) {
                Ok(record) => record,
                Err(error) => {
                    tracing::warn!(index, %error, "Skipping malformed photo record");
                    return None;
                }
            };
            let photo = Photo::from_record(record);
            if photo.is_none() {
                tracing::warn!(index, "Skipping photo record missing required fields");
            }
            photo
        })
        .collect()
}
