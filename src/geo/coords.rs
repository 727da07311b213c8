// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coordinate conversions, location keys, and centroids.

use geo::{Centroid, MultiPoint, Point};

/// Convert a DMS (degrees, minutes, seconds) triple to decimal degrees.
///
/// The reference direction `S` or `W` negates the result.
pub fn dms_to_decimal(dms: [f64; 3], reference: char) -> f64 {
    let dd = dms[0] + dms[1] / 60.0 + dms[2] / 3600.0;
    match reference.to_ascii_uppercase() {
        'S' | 'W' => -dd,
        _ => dd,
    }
}

/// Grouping key for a coordinate pair: both components rounded to 4 decimals.
pub fn location_key(lat: f64, lon: f64) -> String {
    format!("{lat:.4}_{lon:.4}")
}

/// Arithmetic-mean centroid of a set of `(lat, lon)` pairs.
///
/// Each distinct coordinate counts once; the caller decides what "distinct"
/// means (city markers use one entry per location, not per photo).
pub fn centroid(coords: &[(f64, f64)]) -> Option<(f64, f64)> {
    let points: MultiPoint<f64> = coords
        .iter()
        .map(|&(lat, lon)| Point::new(lon, lat))
        .collect();
    points.centroid().map(|c| (c.y(), c.x()))
}

/// Coordinate display string used when no place name resolves.
pub fn format_coords(lat: f64, lon: f64) -> String {
    format!("{lat:.4}°, {lon:.4}°")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dms_north_east_positive() {
        let dd = dms_to_decimal([40.0, 25.0, 0.48], 'N');
        assert!((dd - 40.416_8).abs() < 1e-4);
    }

    #[test]
    fn test_dms_south_west_negative() {
        let lat = dms_to_decimal([33.0, 52.0, 4.0], 'S');
        let lon = dms_to_decimal([3.0, 42.0, 13.68], 'W');
        assert!(lat < 0.0);
        assert!((lon + 3.703_8).abs() < 1e-4);
    }

    #[test]
    fn test_location_key_rounds_to_four_decimals() {
        assert_eq!(location_key(40.41681234, -3.70379876), "40.4168_-3.7038");
        // Same rounded coordinate, same key
        assert_eq!(location_key(40.41680001, -3.70380001), "40.4168_-3.7038");
    }

    #[test]
    fn test_centroid_is_unweighted_mean() {
        let coords = vec![(0.0, 0.0), (2.0, 4.0)];
        let (lat, lon) = centroid(&coords).unwrap();
        assert!((lat - 1.0).abs() < 1e-9);
        assert!((lon - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_centroid_empty_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn test_format_coords() {
        assert_eq!(format_coords(48.8566, 2.3522), "48.8566°, 2.3522°");
    }
}
