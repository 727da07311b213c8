// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location and city grouping models.

use crate::models::photo::PhotoId;

/// Photos sharing a rounded coordinate (the location key).
#[derive(Debug, Clone)]
pub struct LocationGroup {
    /// Representative coordinate (the first photo's exact position).
    pub lat: f64,
    pub lon: f64,
    /// Resolved place name; None until geocoded past the fallback.
    pub name: Option<String>,
    pub country: Option<String>,
    /// City component reported by the geocoder, when available.
    pub city: Option<String>,
    pub photo_ids: Vec<PhotoId>,
}

impl LocationGroup {
    pub fn new(lat: f64, lon: f64, name: Option<String>, country: Option<String>) -> Self {
        Self {
            lat,
            lon,
            name,
            country,
            city: None,
            photo_ids: Vec::new(),
        }
    }
}

/// A distinct coordinate contributing to a city group.
#[derive(Debug, Clone, PartialEq)]
pub struct CityLocation {
    pub key: String,
    pub lat: f64,
    pub lon: f64,
}

/// Photos sharing a derived city name; the primary unit shown on the map.
///
/// Invariant: a photo ID belongs to exactly one city group at any time.
#[derive(Debug, Clone)]
pub struct CityGroup {
    pub city: String,
    pub country: Option<String>,
    pub photo_ids: Vec<PhotoId>,
    /// Distinct locations feeding this city; markers center on their mean.
    pub locations: Vec<CityLocation>,
}

impl CityGroup {
    pub fn new(city: String, country: Option<String>) -> Self {
        Self {
            city,
            country,
            photo_ids: Vec::new(),
            locations: Vec::new(),
        }
    }
}

/// Map-visible representation of a city group.
///
/// At most one marker exists per city name; depleted markers are dropped in
/// the same refresh step that observes the empty group.
#[derive(Debug, Clone)]
pub struct Marker {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub count: usize,
}
