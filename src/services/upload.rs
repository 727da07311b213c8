// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upload ingest: EXIF metadata extraction.
//!
//! Extraction is strictly best-effort. Files without EXIF, without GPS
//! tags, or with degenerate rationals simply yield no coordinates and
//! land in the pending-placement queue.

use std::io::Cursor;

use exif::{In, Tag, Value};

use crate::geo::coords::dms_to_decimal;

/// Metadata pulled from an uploaded file.
#[derive(Debug, Clone, Default)]
pub struct PhotoMeta {
    pub coords: Option<(f64, f64)>,
    pub date: Option<String>,
}

/// Extract GPS coordinates and a capture date from image bytes.
pub fn extract_photo_meta(bytes: &[u8]) -> PhotoMeta {
    let mut cursor = Cursor::new(bytes);
    let Ok(exif) = exif::Reader::new().read_from_container(&mut cursor) else {
        return PhotoMeta::default();
    };
    PhotoMeta {
        coords: extract_gps(&exif),
        date: extract_date(&exif),
    }
}

/// GPS position as signed decimal degrees.
fn extract_gps(exif: &exif::Exif) -> Option<(f64, f64)> {
    let lat_field = exif.get_field(Tag::GPSLatitude, In::PRIMARY)?;
    let lon_field = exif.get_field(Tag::GPSLongitude, In::PRIMARY)?;

    let lat_ref = hemisphere(exif, Tag::GPSLatitudeRef).unwrap_or('N');
    let lon_ref = hemisphere(exif, Tag::GPSLongitudeRef).unwrap_or('E');

    let lat = dms_from_value(&lat_field.value, lat_ref)?;
    let lon = dms_from_value(&lon_field.value, lon_ref)?;
    Some((lat, lon))
}

fn hemisphere(exif: &exif::Exif, tag: Tag) -> Option<char> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    field
        .value
        .display_as(tag)
        .to_string()
        .trim()
        .chars()
        .next()
}

/// DMS rational triple to decimal degrees with the hemisphere applied.
fn dms_from_value(value: &Value, reference: char) -> Option<f64> {
    if let Value::Rational(rationals) = value {
        if rationals.len() >= 3 && rationals.iter().take(3).all(|r| r.denom != 0) {
            let dms = [
                rationals[0].to_f64(),
                rationals[1].to_f64(),
                rationals[2].to_f64(),
            ];
            return Some(dms_to_decimal(dms, reference));
        }
    }
    None
}

/// Capture date: DateTimeOriginal, falling back to DateTime.
fn extract_date(exif: &exif::Exif) -> Option<String> {
    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .or_else(|| exif.get_field(Tag::DateTime, In::PRIMARY))?;
    let date = field.display_value().to_string();
    (!date.trim().is_empty()).then_some(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_exif_yields_empty_meta() {
        let meta = extract_photo_meta(b"definitely not an image");
        assert!(meta.coords.is_none());
        assert!(meta.date.is_none());
    }

    #[test]
    fn test_plain_jpeg_without_gps_yields_no_coords() {
        // A JPEG encoded by the image crate carries no EXIF block.
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 4))
            .write_with_encoder(image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut out, 80,
            ))
            .unwrap();
        let meta = extract_photo_meta(&out);
        assert!(meta.coords.is_none());
    }

    #[test]
    fn test_dms_from_value_rejects_zero_denominator() {
        let value = Value::Rational(vec![
            exif::Rational { num: 40, denom: 1 },
            exif::Rational { num: 25, denom: 0 },
            exif::Rational { num: 0, denom: 1 },
        ]);
        assert!(dms_from_value(&value, 'N').is_none());
    }

    #[test]
    fn test_dms_from_value_south_is_negative() {
        let value = Value::Rational(vec![
            exif::Rational { num: 33, denom: 1 },
            exif::Rational { num: 52, denom: 1 },
            exif::Rational { num: 4, denom: 1 },
        ]);
        let lat = dms_from_value(&value, 'S').unwrap();
        assert!(lat < -33.0 && lat > -34.0);
    }
}
