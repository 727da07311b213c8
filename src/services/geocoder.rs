// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geocoding client (Nominatim-compatible API).
//!
//! Handles:
//! - Reverse lookups for uploaded photos (best-effort enrichment)
//! - Forward city search for the manual-placement flow
//!
//! Lookups are fire-and-forget from the product's point of view: a failed
//! call is logged by the caller and never retried.

use serde::Deserialize;

use crate::config;
use crate::error::AppError;
use crate::geo::coords::format_coords;
use crate::geo::country::code_to_flag;

/// Geocoding API client.
#[derive(Clone)]
pub struct Geocoder {
    http: reqwest::Client,
    base_url: String,
}

/// Address components returned by the geocoder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

impl GeoAddress {
    /// Most specific settlement component.
    fn settlement(&self) -> Option<&str> {
        self.city
            .as_deref()
            .or(self.town.as_deref())
            .or(self.village.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<GeoAddress>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: String,
    lat: String,
    lon: String,
    #[serde(default)]
    address: Option<GeoAddress>,
}

/// A reverse-geocode result reduced to the fields the session applies.
#[derive(Debug, Clone)]
pub struct ResolvedPlace {
    /// Display name per the preference order: settlement (+ country) →
    /// state/region (+ country) → country → formatted coordinates.
    pub display_name: String,
    pub country: Option<String>,
    /// Uppercased ISO 3166-1 alpha-2 code when reported.
    pub country_code: Option<String>,
    /// The settlement component alone, for location-group metadata.
    pub city: Option<String>,
}

/// A forward-search candidate offered for manual placement.
#[derive(Debug, Clone)]
pub struct CityCandidate {
    pub name: String,
    pub display_name: String,
    pub country: String,
    pub country_code: String,
    pub lat: f64,
    pub lon: f64,
    pub flag: String,
}

impl Geocoder {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Reverse-geocode a coordinate pair.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<ResolvedPlace, AppError> {
        let url = format!("{}/reverse", self.base_url);
        let lat_param = lat.to_string();
        let lon_param = lon.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("format", "json"),
                ("lat", lat_param.as_str()),
                ("lon", lon_param.as_str()),
                ("zoom", "10"),
                ("addressdetails", "1"),
            ])
            .header("User-Agent", config::GEOCODER_USER_AGENT)
            .header("Accept-Language", "es,en")
            .send()
            .await
            .map_err(|e| AppError::Geocoding(e.to_string()))?;

        let response = check_status(response).await?;
        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| AppError::Geocoding(format!("Malformed response: {}", e)))?;

        let address = body
            .address
            .ok_or_else(|| AppError::Geocoding("Response carried no address".to_string()))?;

        Ok(resolve_place(&address, lat, lon))
    }

    /// Forward search for cities matching a free-text query.
    ///
    /// Queries below the minimum length return empty without a network
    /// call; callers treat an empty result as "keep the action blocked".
    pub async fn search_cities(&self, query: &str) -> Result<Vec<CityCandidate>, AppError> {
        let query = query.trim();
        if query.chars().count() < config::CITY_SEARCH_MIN_CHARS {
            return Ok(Vec::new());
        }

        let url = format!("{}/search", self.base_url);
        let limit_param = config::CITY_SEARCH_LIMIT.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[
                ("format", "json"),
                ("q", query),
                ("limit", limit_param.as_str()),
                ("addressdetails", "1"),
                ("featuretype", "city"),
            ])
            .header("User-Agent", config::GEOCODER_USER_AGENT)
            .send()
            .await
            .map_err(|e| AppError::Geocoding(e.to_string()))?;

        let response = check_status(response).await?;
        let items: Vec<SearchItem> = response
            .json()
            .await
            .map_err(|e| AppError::Geocoding(format!("Malformed response: {}", e)))?;

        Ok(candidates_from_items(items))
    }
}

/// Map raw search items to de-duplicated candidates.
fn candidates_from_items(items: Vec<SearchItem>) -> Vec<CityCandidate> {
    let mut seen = std::collections::HashSet::new();
    let mut candidates = Vec::new();

    for item in items {
        let address = item.address.unwrap_or_default();
        let name = address
            .settlement()
            .or(address.municipality.as_deref())
            .or(item.name.as_deref())
            .unwrap_or("")
            .to_string();
        if name.is_empty() {
            continue;
        }
        let (Ok(lat), Ok(lon)) = (item.lat.parse::<f64>(), item.lon.parse::<f64>()) else {
            continue;
        };
        let country = address.country.clone().unwrap_or_default();
        if !seen.insert((name.clone(), country.clone())) {
            continue;
        }
        let country_code = address
            .country_code
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_default();
        candidates.push(CityCandidate {
            flag: code_to_flag(&country_code),
            name,
            display_name: item.display_name,
            country,
            country_code,
            lat,
            lon,
        });
    }

    candidates
}

/// Reduce address components to a resolved place per the preference order.
fn resolve_place(address: &GeoAddress, lat: f64, lon: f64) -> ResolvedPlace {
    let country = address.country.clone();
    let display_name = if let Some(settlement) = address.settlement() {
        match &country {
            Some(c) => format!("{}, {}", settlement, c),
            None => settlement.to_string(),
        }
    } else if let Some(state) = address.state.as_deref().or(address.region.as_deref()) {
        match &country {
            Some(c) => format!("{}, {}", state, c),
            None => state.to_string(),
        }
    } else if let Some(c) = &country {
        c.clone()
    } else {
        format_coords(lat, lon)
    };

    ResolvedPlace {
        display_name,
        country,
        country_code: address.country_code.as_deref().map(str::to_uppercase),
        city: address.settlement().map(String::from),
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    if status.as_u16() == 429 {
        tracing::warn!("Geocoder rate limit hit (429)");
        return Err(AppError::Geocoding(AppError::REMOTE_RATE_LIMIT.to_string()));
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Geocoding(format!("HTTP {}: {}", status, body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(city: Option<&str>, state: Option<&str>, country: Option<&str>) -> GeoAddress {
        GeoAddress {
            city: city.map(String::from),
            state: state.map(String::from),
            country: country.map(String::from),
            ..GeoAddress::default()
        }
    }

    #[test]
    fn test_resolve_prefers_settlement() {
        let place = resolve_place(
            &address(Some("Madrid"), Some("Comunidad de Madrid"), Some("España")),
            40.4168,
            -3.7038,
        );
        assert_eq!(place.display_name, "Madrid, España");
        assert_eq!(place.city.as_deref(), Some("Madrid"));
    }

    #[test]
    fn test_resolve_falls_back_to_state() {
        let place = resolve_place(&address(None, Some("Bretagne"), Some("France")), 48.0, -3.0);
        assert_eq!(place.display_name, "Bretagne, France");
        assert!(place.city.is_none());
    }

    #[test]
    fn test_resolve_falls_back_to_country_then_coords() {
        let place = resolve_place(&address(None, None, Some("Portugal")), 38.7, -9.1);
        assert_eq!(place.display_name, "Portugal");

        let place = resolve_place(&address(None, None, None), 38.7223, -9.1393);
        assert_eq!(place.display_name, "38.7223°, -9.1393°");
    }

    #[test]
    fn test_candidates_deduplicate_and_parse() {
        let items = vec![
            SearchItem {
                name: Some("Paris".to_string()),
                display_name: "Paris, Île-de-France, France".to_string(),
                lat: "48.8566".to_string(),
                lon: "2.3522".to_string(),
                address: Some(GeoAddress {
                    city: Some("Paris".to_string()),
                    country: Some("France".to_string()),
                    country_code: Some("fr".to_string()),
                    ..GeoAddress::default()
                }),
            },
            // Duplicate (same name + country)
            SearchItem {
                name: Some("Paris".to_string()),
                display_name: "Paris, France".to_string(),
                lat: "48.85".to_string(),
                lon: "2.35".to_string(),
                address: Some(GeoAddress {
                    city: Some("Paris".to_string()),
                    country: Some("France".to_string()),
                    ..GeoAddress::default()
                }),
            },
            // Unparseable coordinates
            SearchItem {
                name: Some("Nowhere".to_string()),
                display_name: "Nowhere".to_string(),
                lat: "not-a-number".to_string(),
                lon: "0".to_string(),
                address: None,
            },
        ];

        let candidates = candidates_from_items(items);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Paris");
        assert_eq!(candidates[0].country_code, "FR");
        assert_eq!(candidates[0].flag, "🇫🇷");
    }
}
