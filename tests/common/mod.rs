// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers.

#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use photo_atlas::config::Config;
use photo_atlas::db::RemoteStore;
use photo_atlas::models::photo::Photo;
use photo_atlas::Session;
use tempfile::TempDir;

/// Deterministic noisy JPEG. Noise keeps recompression ratios honest:
/// flat-color images compress to almost nothing at every quality tier.
pub fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        let noise = ((x * 7919 + y * 104_729) % 251) as u8;
        Rgb([(x % 256) as u8, (y % 256) as u8, noise])
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, 95))
        .expect("encode test jpeg");
    out
}

/// A photo with a small local image at the given coordinates.
pub fn make_photo(lat: f64, lon: f64) -> Photo {
    Photo::new(lat, lon, "2024-01-01".to_string(), Some(test_jpeg(32, 32)))
}

/// Offline session writing to a throwaway cache directory. The TempDir
/// must stay alive for the session's lifetime.
pub fn offline_session() -> (Session, TempDir) {
    let tmp = TempDir::new().expect("tempdir");
    let config = Config {
        cache_dir: tmp.path().to_path_buf(),
        ..Config::default()
    };
    (Session::new(&config, RemoteStore::offline()), tmp)
}
