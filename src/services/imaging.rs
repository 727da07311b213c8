// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bounded JPEG recompression for the local cache tier and thumbnails.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::config;
use crate::error::AppError;

/// Recompress an image to a bounded width at the given JPEG quality.
/// Images already narrower than the bound are re-encoded without resizing;
/// upscaling never happens.
pub fn recompress(bytes: &[u8], max_width: u32, quality: u8) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(bytes).map_err(|e| AppError::Image(e.to_string()))?;
    let img = if img.width() > max_width {
        img.resize(max_width, u32::MAX, FilterType::Triangle)
    } else {
        img
    };
    encode_jpeg(&img, quality)
}

/// Thumbnail rendition for remote upload; bounds both dimensions.
pub fn thumbnail(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let (max_size, quality) = config::THUMBNAIL_COMPRESSION;
    let img = image::load_from_memory(bytes).map_err(|e| AppError::Image(e.to_string()))?;
    let img = if img.width() > max_size || img.height() > max_size {
        img.resize(max_size, max_size, FilterType::Triangle)
    } else {
        img
    };
    encode_jpeg(&img, quality)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, AppError> {
    // JPEG carries no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))
        .map_err(|e| AppError::Image(e.to_string()))?;
    Ok(out)
}

/// Inline data URL for a session-local image (display fallback when no
/// remote URL resolves).
pub fn data_url(bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// A noisy gradient compresses poorly at high quality, which is what
    /// the degradation tests need.
    pub(crate) fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let noise = ((x * 7919 + y * 104_729) % 251) as u8;
            Rgb([(x % 256) as u8, (y % 256) as u8, noise])
        });
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut out, 95))
            .unwrap();
        out
    }

    #[test]
    fn test_recompress_bounds_width() {
        let original = test_jpeg(1200, 800);
        let compressed = recompress(&original, 600, 60).unwrap();
        let img = image::load_from_memory(&compressed).unwrap();
        assert_eq!(img.width(), 600);
        assert!(compressed.len() < original.len());
    }

    #[test]
    fn test_recompress_never_upscales() {
        let original = test_jpeg(300, 200);
        let compressed = recompress(&original, 600, 60).unwrap();
        let img = image::load_from_memory(&compressed).unwrap();
        assert_eq!(img.width(), 300);
    }

    #[test]
    fn test_lower_tier_is_strictly_smaller() {
        let original = test_jpeg(1600, 1200);
        let (w1, q1) = config::CACHE_COMPRESSION;
        let (w2, q2) = config::CACHE_COMPRESSION_SMALL;
        let first = recompress(&original, w1, q1).unwrap();
        let second = recompress(&original, w2, q2).unwrap();
        assert!(second.len() < first.len());
    }

    #[test]
    fn test_thumbnail_bounds_both_dimensions() {
        let original = test_jpeg(400, 1000);
        let thumb = thumbnail(&original).unwrap();
        let img = image::load_from_memory(&thumb).unwrap();
        assert!(img.width() <= 200 && img.height() <= 200);
    }

    #[test]
    fn test_garbage_input_errors() {
        assert!(recompress(b"not an image", 600, 60).is_err());
    }

    #[test]
    fn test_data_url_prefix() {
        assert!(data_url(b"abc").starts_with("data:image/jpeg;base64,"));
    }
}
