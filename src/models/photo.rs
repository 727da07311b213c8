// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Photo record model.

use uuid::Uuid;

use crate::config;
use crate::geo::coords;

/// Session-stable photo identifier. The durable-store identity lives in
/// `Photo::db_id` and may only exist after a successful remote insert.
pub type PhotoId = Uuid;

/// Which rendition of a photo's asset is being addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Full,
    Thumb,
}

/// A placed travel photograph.
///
/// Photos without coordinates never become `Photo` values; they wait in the
/// pending-placement queue as [`PendingPhoto`] entries.
#[derive(Debug, Clone)]
pub struct Photo {
    pub id: PhotoId,
    pub lat: f64,
    pub lon: f64,
    /// Capture date as free text, or the unknown-date placeholder.
    pub date: String,
    /// Display location string ("City, Country" in the common case).
    pub location: String,
    pub country: String,
    /// ISO 3166-1 alpha-2 code when known.
    pub country_code: Option<String>,
    pub note_title: String,
    pub note_description: String,
    /// JPEG bytes for the session/local tier; None for remote-only records.
    pub image: Option<Vec<u8>>,
    /// Direct display URLs already known from a remote response.
    pub image_url: Option<String>,
    pub thumb_url: Option<String>,
    /// Remote object keys for the full image and its thumbnail.
    pub storage_path: Option<String>,
    pub thumb_path: Option<String>,
    /// Durable-store identity; None until the first successful remote insert.
    pub db_id: Option<String>,
    /// Whether a remote full-image object exists for this record.
    pub has_image: bool,
    /// Bumped on every content mutation; async completion handlers capture
    /// it at request time and discard results when it has advanced.
    pub generation: u64,
}

impl Photo {
    /// Create a provisional photo at the fallback place.
    pub fn new(lat: f64, lon: f64, date: String, image: Option<Vec<u8>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            lat,
            lon,
            date,
            location: config::FALLBACK_LOCATION.to_string(),
            country: config::FALLBACK_COUNTRY.to_string(),
            country_code: None,
            note_title: String::new(),
            note_description: String::new(),
            image,
            image_url: None,
            thumb_url: None,
            storage_path: None,
            thumb_path: None,
            db_id: None,
            has_image: false,
            generation: 0,
        }
    }

    /// Location grouping key for this photo's current coordinates.
    pub fn location_key(&self) -> String {
        coords::location_key(self.lat, self.lon)
    }

    /// City name derived from the display location: the first
    /// comma-delimited segment, falling back to the fallback city.
    pub fn city_name(&self) -> String {
        derive_city(&self.location)
    }

    /// Bump the generation counter after a content mutation.
    pub fn touch(&mut self) {
        self.generation += 1;
    }

    /// Apply a resolved place to this photo.
    pub fn set_place(
        &mut self,
        location: String,
        country: Option<String>,
        country_code: Option<String>,
    ) {
        self.location = location;
        if let Some(country) = country {
            self.country = country;
        }
        if let Some(code) = country_code {
            self.country_code = Some(code.to_uppercase());
        }
        self.touch();
    }

    /// Replace the user note.
    pub fn set_note(&mut self, title: String, description: String) {
        self.note_title = title;
        self.note_description = description;
        self.touch();
    }
}

/// Derive a city name from a free-text location display string.
///
/// The split-on-first-comma rule is lossy for city names that themselves
/// contain commas; that ambiguity is a known product limitation.
pub fn derive_city(location: &str) -> String {
    let city = location.split(',').next().unwrap_or("").trim();
    if city.is_empty() {
        config::FALLBACK_CITY.to_string()
    } else {
        city.to_string()
    }
}

/// An upload lacking GPS data, held until a place is chosen or it is skipped.
#[derive(Debug, Clone)]
pub struct PendingPhoto {
    pub id: PhotoId,
    pub date: String,
    pub image: Vec<u8>,
}

impl PendingPhoto {
    pub fn new(date: String, image: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            image,
        }
    }
}
