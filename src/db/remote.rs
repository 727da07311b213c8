// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Remote photo store client.
//!
//! Thin HTTP client over the backend API: row CRUD addressed by owner,
//! object storage for image assets, and signed display URLs. Every call
//! requires an owner identity; photo-count mutating calls are rate-limited
//! server-side and surface a 429 as a plain error for the caller to log.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::photo::Photo;

/// Remote photo store client.
///
/// Constructed without a base URL it runs in offline mode: every call
/// returns [`AppError::RemoteOffline`], which the synchronizer degrades to
/// "not yet synced".
#[derive(Clone)]
pub struct RemoteStore {
    http: reqwest::Client,
    base_url: Option<String>,
}

/// A photo row as stored remotely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePhoto {
    pub id: String,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub date: Option<String>,
    #[serde(default)]
    pub note_title: String,
    #[serde(default)]
    pub note_description: String,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub storage_path: Option<String>,
    pub thumb_path: Option<String>,
    /// Direct URLs, when the backend includes them in list responses.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub thumb_url: Option<String>,
}

/// Insert payload: metadata plus the asset references already uploaded.
#[derive(Debug, Clone, Serialize)]
pub struct NewRemotePhoto {
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub date: String,
    pub note_title: String,
    pub note_description: String,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub storage_path: Option<String>,
    pub thumb_path: Option<String>,
}

impl NewRemotePhoto {
    pub fn from_photo(
        photo: &Photo,
        storage_path: Option<String>,
        thumb_path: Option<String>,
    ) -> Self {
        Self {
            location: Some(photo.location.clone()),
            lat: Some(photo.lat),
            lon: Some(photo.lon),
            date: photo.date.clone(),
            note_title: photo.note_title.clone(),
            note_description: photo.note_description.clone(),
            country: Some(photo.country.clone()),
            country_code: photo.country_code.clone(),
            storage_path,
            thumb_path,
        }
    }
}

/// Update payload for place and note edits.
#[derive(Debug, Clone, Serialize)]
pub struct RemotePhotoPatch {
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub date: String,
    pub note_title: String,
    pub note_description: String,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub updated_at: String,
}

impl RemotePhotoPatch {
    pub fn from_photo(photo: &Photo) -> Self {
        Self {
            location: Some(photo.location.clone()),
            lat: Some(photo.lat),
            lon: Some(photo.lon),
            date: photo.date.clone(),
            note_title: photo.note_title.clone(),
            note_description: photo.note_description.clone(),
            country: Some(photo.country.clone()),
            country_code: photo.country_code.clone(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    url: String,
}

impl RemoteStore {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    /// Offline client for tests and unconfigured deployments.
    pub fn offline() -> Self {
        Self::new(None)
    }

    pub fn is_online(&self) -> bool {
        self.base_url.is_some()
    }

    fn base(&self) -> Result<&str, AppError> {
        self.base_url.as_deref().ok_or(AppError::RemoteOffline)
    }

    // ─── Row operations ──────────────────────────────────────────

    /// List all photo rows for an owner.
    pub async fn list_photos(&self, owner: &str) -> Result<Vec<RemotePhoto>, AppError> {
        let url = format!("{}/photos", self.base()?);
        let response = self
            .http
            .get(&url)
            .query(&[("ownerId", owner)])
            .send()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;
        check_response_json(response).await
    }

    /// Insert a photo row; returns the stored row with its durable ID.
    pub async fn insert_photo(
        &self,
        owner: &str,
        row: &NewRemotePhoto,
    ) -> Result<RemotePhoto, AppError> {
        let url = format!("{}/photos", self.base()?);
        let response = self
            .http
            .post(&url)
            .query(&[("ownerId", owner)])
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;
        check_response_json(response).await
    }

    /// Update a photo row's metadata.
    pub async fn update_photo(
        &self,
        owner: &str,
        id: &str,
        patch: &RemotePhotoPatch,
    ) -> Result<(), AppError> {
        let url = format!("{}/photos/{}", self.base()?, id);
        let response = self
            .http
            .put(&url)
            .query(&[("ownerId", owner)])
            .json(patch)
            .send()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;
        check_response(response).await
    }

    /// Delete a photo row.
    pub async fn delete_photo(&self, owner: &str, id: &str) -> Result<(), AppError> {
        let url = format!("{}/photos/{}", self.base()?, id);
        let response = self
            .http
            .delete(&url)
            .query(&[("ownerId", owner)])
            .send()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;
        check_response(response).await
    }

    /// Delete every photo row for an owner.
    pub async fn delete_all(&self, owner: &str) -> Result<(), AppError> {
        let url = format!("{}/photos", self.base()?);
        let response = self
            .http
            .delete(&url)
            .query(&[("ownerId", owner), ("all", "true")])
            .send()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;
        check_response(response).await
    }

    /// Request a freshly signed display URL for a stored asset.
    pub async fn signed_url(&self, owner: &str, id: &str, thumb: bool) -> Result<String, AppError> {
        let url = format!("{}/photos/{}/url", self.base()?, id);
        let response = self
            .http
            .get(&url)
            .query(&[("ownerId", owner), ("thumb", if thumb { "true" } else { "false" })])
            .send()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;
        let body: SignedUrlResponse = check_response_json(response).await?;
        Ok(body.url)
    }

    // ─── Object storage ──────────────────────────────────────────

    /// Upload an image asset under the given object key.
    pub async fn upload_object(
        &self,
        owner: &str,
        path: &str,
        bytes: Vec<u8>,
    ) -> Result<(), AppError> {
        let url = format!("{}/objects", self.base()?);
        let response = self
            .http
            .put(&url)
            .query(&[("ownerId", owner), ("path", path)])
            .header("Content-Type", "image/jpeg")
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;
        check_response(response).await
    }

    /// Remove image assets by object key.
    pub async fn remove_objects(&self, owner: &str, paths: &[String]) -> Result<(), AppError> {
        let url = format!("{}/objects", self.base()?);
        let response = self
            .http
            .delete(&url)
            .query(&[("ownerId", owner)])
            .json(&serde_json::json!({ "paths": paths }))
            .send()
            .await
            .map_err(|e| AppError::Remote(e.to_string()))?;
        check_response(response).await
    }
}

/// Check response status and return an error if not successful.
async fn check_response(response: reqwest::Response) -> Result<(), AppError> {
    if response.status().is_success() {
        return Ok(());
    }
    let status = response.status();
    if status.as_u16() == 429 {
        tracing::warn!("Remote store rate limit hit (429)");
        return Err(AppError::Remote(AppError::REMOTE_RATE_LIMIT.to_string()));
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Remote(format!("HTTP {}: {}", status, body)))
}

/// Check response and parse the JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        if status.as_u16() == 429 {
            tracing::warn!("Remote store rate limit hit (429)");
            return Err(AppError::Remote(AppError::REMOTE_RATE_LIMIT.to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Remote(format!("HTTP {}: {}", status, body)));
    }
    response
        .json()
        .await
        .map_err(|e| AppError::Remote(format!("Malformed response: {}", e)))
}

impl Photo {
    /// Build an in-memory photo from a remote row. The image stays remote;
    /// display URLs resolve on demand through the URL cache.
    pub fn from_remote(row: RemotePhoto) -> Option<Self> {
        let lat = row.lat?;
        let lon = row.lon?;
        let mut photo = Photo::new(
            lat,
            lon,
            row.date
                .unwrap_or_else(|| crate::config::UNKNOWN_DATE.to_string()),
            None,
        );
        if let Some(location) = row.location {
            photo.location = location;
        }
        if let Some(country) = row.country {
            photo.country = country;
        }
        photo.country_code = row.country_code;
        photo.note_title = row.note_title;
        photo.note_description = row.note_description;
        photo.has_image = row.storage_path.is_some();
        photo.storage_path = row.storage_path;
        photo.thumb_path = row.thumb_path;
        photo.image_url = row.image_url;
        photo.thumb_url = row.thumb_url;
        photo.db_id = Some(row.id);
        Some(photo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_store_rejects_calls() {
        let store = RemoteStore::offline();
        assert!(!store.is_online());
        let err = store.list_photos("owner").await.unwrap_err();
        assert!(matches!(err, AppError::RemoteOffline));
    }

    #[test]
    fn test_from_remote_requires_coordinates() {
        let row = RemotePhoto {
            id: "row-1".to_string(),
            location: Some("Paris, France".to_string()),
            lat: None,
            lon: Some(2.35),
            date: None,
            note_title: String::new(),
            note_description: String::new(),
            country: None,
            country_code: None,
            storage_path: None,
            thumb_path: None,
            image_url: None,
            thumb_url: None,
        };
        assert!(Photo::from_remote(row).is_none());
    }

    #[test]
    fn test_from_remote_marks_remote_asset() {
        let row = RemotePhoto {
            id: "row-2".to_string(),
            location: Some("Paris, France".to_string()),
            lat: Some(48.8566),
            lon: Some(2.3522),
            date: Some("2024-06-01".to_string()),
            note_title: String::new(),
            note_description: String::new(),
            country: Some("France".to_string()),
            country_code: Some("FR".to_string()),
            storage_path: Some("owner/abc.jpg".to_string()),
            thumb_path: None,
            image_url: None,
            thumb_url: None,
        };
        let photo = Photo::from_remote(row).unwrap();
        assert!(photo.has_image);
        assert!(photo.image.is_none());
        assert_eq!(photo.db_id.as_deref(), Some("row-2"));
    }
}
