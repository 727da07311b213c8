//! Trip statistics recomputed from the store and its derived indices.
//!
//! Stats are derived, never incrementally patched: every count-changing
//! operation and every applied geocode triggers a full recomputation.

use serde::Serialize;
use std::collections::HashMap;

use crate::geo::country::country_flag;
use crate::models::group::{CityGroup, LocationGroup};
use crate::models::photo::Photo;

/// Aggregate shown on the dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TripStats {
    pub total_photos: usize,
    /// Distinct cities; falls back to the location-group count while no
    /// city has resolved yet.
    pub total_cities: usize,
    pub total_countries: usize,
    /// Distinct country names, in first-seen order.
    pub countries: Vec<String>,
    /// Flag emoji per distinct country, same order as `countries`.
    pub flags: Vec<String>,
}

impl TripStats {
    /// Recompute the aggregate from the current state.
    pub fn recompute(
        photos: &[Photo],
        locations: &HashMap<String, LocationGroup>,
        cities: &HashMap<String, CityGroup>,
    ) -> Self {
        let city_count = cities.len();
        let total_cities = if city_count > 0 {
            city_count
        } else {
            locations.len()
        };

        // City groups are the primary country source; photos fill in
        // countries not yet reflected in any group.
        let mut countries: Vec<String> = Vec::new();
        let mut codes: HashMap<String, Option<String>> = HashMap::new();
        for group in cities.values() {
            if let Some(country) = &group.country {
                if !countries.contains(country) {
                    countries.push(country.clone());
                    codes.insert(country.clone(), None);
                }
            }
        }
        for photo in photos {
            if photo.country.is_empty() {
                continue;
            }
            if !countries.contains(&photo.country) {
                countries.push(photo.country.clone());
            }
            // Remember a code for the flag lookup wherever one is known.
            let slot = codes.entry(photo.country.clone()).or_insert(None);
            if slot.is_none() {
                *slot = photo.country_code.clone();
            }
        }

        // Last resort: parse the trailing segment of location strings.
        if countries.is_empty() {
            for photo in photos {
                if let Some(candidate) = country_from_location(&photo.location) {
                    if !countries.contains(&candidate) {
                        countries.push(candidate);
                    }
                }
            }
        }

        let flags = countries
            .iter()
            .map(|name| country_flag(Some(name), codes.get(name).and_then(|c| c.as_deref())))
            .collect();

        Self {
            total_photos: photos.len(),
            total_cities,
            total_countries: countries.len(),
            countries,
            flags,
        }
    }
}

/// Extract a plausible country name from the last comma-delimited segment
/// of a location string. Numeric fragments and coordinate strings do not
/// qualify.
fn country_from_location(location: &str) -> Option<String> {
    let mut parts = location.split(',');
    let first = parts.next()?;
    let last = parts.last().unwrap_or(first).trim();
    if last.is_empty() || last.len() >= 50 {
        return None;
    }
    let stripped = last.trim_end_matches('°');
    if stripped
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-')
    {
        return None;
    }
    Some(last.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::group::CityGroup;

    fn make_photo(country: &str, code: Option<&str>, location: &str) -> Photo {
        let mut photo = Photo::new(40.0, -3.0, "2024-01-01".to_string(), None);
        photo.country = country.to_string();
        photo.country_code = code.map(String::from);
        photo.location = location.to_string();
        photo
    }

    #[test]
    fn test_recompute_counts_cities_and_countries() {
        let photos = vec![
            make_photo("España", Some("ES"), "Madrid, España"),
            make_photo("France", Some("FR"), "Paris, France"),
        ];
        let mut cities = HashMap::new();
        cities.insert(
            "Madrid".to_string(),
            CityGroup::new("Madrid".to_string(), Some("España".to_string())),
        );
        cities.insert(
            "Paris".to_string(),
            CityGroup::new("Paris".to_string(), Some("France".to_string())),
        );

        let stats = TripStats::recompute(&photos, &HashMap::new(), &cities);
        assert_eq!(stats.total_photos, 2);
        assert_eq!(stats.total_cities, 2);
        assert_eq!(stats.total_countries, 2);
        assert_eq!(stats.flags.len(), 2);
    }

    #[test]
    fn test_city_count_falls_back_to_locations() {
        let mut locations = HashMap::new();
        locations.insert(
            "40.4168_-3.7038".to_string(),
            LocationGroup::new(40.4168, -3.7038, None, None),
        );
        let stats = TripStats::recompute(&[], &locations, &HashMap::new());
        assert_eq!(stats.total_cities, 1);
    }

    #[test]
    fn test_country_from_location_rejects_coordinates() {
        assert_eq!(country_from_location("40.4168°, -3.7038°"), None);
        assert_eq!(
            country_from_location("Lisboa, Portugal"),
            Some("Portugal".to_string())
        );
        assert_eq!(country_from_location(""), None);
    }

    #[test]
    fn test_photo_countries_fill_in_missing_groups() {
        let photos = vec![make_photo("Portugal", None, "Lisboa, Portugal")];
        let stats = TripStats::recompute(&photos, &HashMap::new(), &HashMap::new());
        assert_eq!(stats.countries, vec!["Portugal".to_string()]);
        assert_eq!(stats.flags, vec!["🇵🇹".to_string()]);
    }
}
