// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod backup;
pub mod group;
pub mod photo;
pub mod stats;

pub use backup::{BackupFile, CachePayload, PhotoRecord};
pub use group::{CityGroup, CityLocation, LocationGroup, Marker};
pub use photo::{PendingPhoto, Photo, PhotoId, Variant};
pub use stats::TripStats;
