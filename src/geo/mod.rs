// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pure coordinate and country utilities.

pub mod coords;
pub mod country;

pub use coords::{centroid, dms_to_decimal, format_coords, location_key};
pub use country::{code_to_flag, country_flag};
