// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Grouping engine: location and city indices plus marker maintenance.
//!
//! `assign_photo` is an idempotent re-projection of one photo into both
//! indices from its *current* fields; callers re-invoke it after any
//! mutation that can change group membership. Marker refreshes are
//! debounced through an explicit token polled by the session driver, so a
//! burst of assignments coalesces into a single refresh pass.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::config;
use crate::geo::coords;
use crate::models::group::{CityGroup, CityLocation, LocationGroup, Marker};
use crate::models::photo::{derive_city, PhotoId};
use crate::services::geocoder::ResolvedPlace;
use crate::store::PhotoStore;

/// Result of one marker refresh pass.
#[derive(Debug, Default)]
pub struct RefreshOutcome {
    pub removed: usize,
    pub created: usize,
    pub updated: usize,
    /// Marker coordinates to fit the viewport to; None while the map has
    /// not completed its first post-initialization settle.
    pub fit_bounds: Option<Vec<(f64, f64)>>,
}

pub struct GroupingEngine {
    locations: HashMap<String, LocationGroup>,
    cities: HashMap<String, CityGroup>,
    markers: Vec<Marker>,
    /// Armed refresh deadline; re-arming replaces any pending token.
    pending_refresh: Option<Instant>,
    settle_at: Instant,
    settled: bool,
}

impl GroupingEngine {
    pub fn new(now: Instant) -> Self {
        Self {
            locations: HashMap::new(),
            cities: HashMap::new(),
            markers: Vec::new(),
            pending_refresh: None,
            settle_at: now + config::MAP_SETTLE_DELAY,
            settled: false,
        }
    }

    // ─── Assignment ──────────────────────────────────────────────

    /// Project a photo into the location and city indices.
    ///
    /// The photo must have coordinates (enforced by the caller: photos
    /// without them live in the pending queue, not the store). A photo
    /// with no location yet is first placed at the fallback so it always
    /// groups somewhere.
    pub fn assign_photo(&mut self, store: &mut PhotoStore, id: PhotoId, now: Instant) {
        let (lat, lon, location, country) = {
            let Some(photo) = store.photo_mut(id) else {
                return;
            };
            if photo.location.trim().is_empty() {
                photo.location = config::FALLBACK_LOCATION.to_string();
                if photo.country.trim().is_empty() {
                    photo.country = config::FALLBACK_COUNTRY.to_string();
                }
                photo.touch();
            }
            (photo.lat, photo.lon, photo.location.clone(), photo.country.clone())
        };

        let key = coords::location_key(lat, lon);
        let city = derive_city(&location);
        let country = (!country.trim().is_empty()).then_some(country);

        // Location index
        let group = self.locations.entry(key.clone()).or_insert_with(|| {
            LocationGroup::new(lat, lon, Some(location.clone()), country.clone())
        });
        if !group.photo_ids.contains(&id) {
            group.photo_ids.push(id);
        }

        // One-city invariant: pull the photo out of every other city group
        // before inserting, dropping groups that empty out.
        self.cities.retain(|name, group| {
            if *name != city {
                group.photo_ids.retain(|p| *p != id);
                if group.photo_ids.is_empty() {
                    return false;
                }
            }
            true
        });

        let city_group = self
            .cities
            .entry(city.clone())
            .or_insert_with(|| CityGroup::new(city, country));
        if !city_group.photo_ids.contains(&id) {
            city_group.photo_ids.push(id);
            if !city_group.locations.iter().any(|l| l.key == key) {
                city_group.locations.push(CityLocation { key, lat, lon });
            }
        }

        self.schedule_refresh(now);
    }

    /// Remove photos from both indices, dropping emptied groups, and
    /// refresh markers in the same step.
    pub fn remove_photos(&mut self, ids: &HashSet<PhotoId>, now: Instant) -> RefreshOutcome {
        self.locations.retain(|_, group| {
            group.photo_ids.retain(|p| !ids.contains(p));
            !group.photo_ids.is_empty()
        });
        self.cities.retain(|_, group| {
            group.photo_ids.retain(|p| !ids.contains(p));
            !group.photo_ids.is_empty()
        });
        // Depleted markers must go in the same step as their groups.
        self.pending_refresh = None;
        self.refresh_markers(now)
    }

    // ─── Marker refresh ──────────────────────────────────────────

    /// Arm the debounced refresh; any pending token is replaced.
    pub fn schedule_refresh(&mut self, now: Instant) {
        self.pending_refresh = Some(now + config::MARKER_REFRESH_DEBOUNCE);
    }

    /// Run the refresh if an armed token has come due.
    pub fn poll_refresh(&mut self, now: Instant) -> Option<RefreshOutcome> {
        match self.pending_refresh {
            Some(deadline) if now >= deadline => {
                self.pending_refresh = None;
                Some(self.refresh_markers(now))
            }
            _ => None,
        }
    }

    pub fn has_pending_refresh(&self) -> bool {
        self.pending_refresh.is_some()
    }

    /// Reconcile the marker list against the city groups.
    pub fn refresh_markers(&mut self, now: Instant) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::default();

        let cities = &self.cities;
        let before = self.markers.len();
        self.markers.retain(|m| {
            cities
                .get(&m.city)
                .is_some_and(|g| !g.photo_ids.is_empty())
        });
        outcome.removed = before - self.markers.len();

        for (name, group) in &self.cities {
            if group.photo_ids.is_empty() {
                continue;
            }
            if let Some(marker) = self.markers.iter_mut().find(|m| m.city == *name) {
                marker.count = group.photo_ids.len();
                outcome.updated += 1;
            } else {
                let points: Vec<(f64, f64)> =
                    group.locations.iter().map(|l| (l.lat, l.lon)).collect();
                if let Some((lat, lon)) = coords::centroid(&points) {
                    self.markers.push(Marker {
                        city: name.clone(),
                        lat,
                        lon,
                        count: group.photo_ids.len(),
                    });
                    outcome.created += 1;
                }
            }
        }

        // One-time settle latch: fits start only after the initial marker
        // burst has had time to arrive.
        if !self.settled && now >= self.settle_at {
            self.settled = true;
        }
        if self.settled && !self.markers.is_empty() {
            outcome.fit_bounds = Some(self.markers.iter().map(|m| (m.lat, m.lon)).collect());
        }

        outcome
    }

    // ─── Geocoded metadata ───────────────────────────────────────

    /// Update a location group's cached place fields from a geocode
    /// result. Applied regardless of whether the photo-level update went
    /// through, but never with the fallback place.
    pub fn update_location_meta(&mut self, key: &str, place: &ResolvedPlace) {
        if place.display_name == config::FALLBACK_LOCATION {
            return;
        }
        if let Some(group) = self.locations.get_mut(key) {
            group.name = Some(place.display_name.clone());
            if place.country.is_some() {
                group.country = place.country.clone();
            }
            if place.city.is_some() {
                group.city = place.city.clone();
            }
        }
    }

    // ─── Accessors ───────────────────────────────────────────────

    pub fn locations(&self) -> &HashMap<String, LocationGroup> {
        &self.locations
    }

    pub fn cities(&self) -> &HashMap<String, CityGroup> {
        &self.cities
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// The city group currently holding a photo, if any.
    pub fn city_of(&self, id: PhotoId) -> Option<&str> {
        self.cities
            .iter()
            .find(|(_, g)| g.photo_ids.contains(&id))
            .map(|(name, _)| name.as_str())
    }

    /// Drop every index, marker, and pending token (session reset).
    pub fn clear(&mut self) {
        self.locations.clear();
        self.cities.clear();
        self.markers.clear();
        self.pending_refresh = None;
    }
}
