// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod geocoder;
pub mod grouping;
pub mod imaging;
pub mod sync;
pub mod upload;
pub mod url_cache;

pub use geocoder::{CityCandidate, Geocoder, ResolvedPlace};
pub use grouping::{GroupingEngine, RefreshOutcome};
pub use sync::{CloudSync, SyncReceipt};
pub use upload::{extract_photo_meta, PhotoMeta};
pub use url_cache::UrlCache;
