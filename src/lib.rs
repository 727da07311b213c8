// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Photo-Atlas: a photo travel map engine.
//!
//! This crate keeps uploaded travel photos consistent across three tiers
//! (in-memory store, size-bounded local cache, remote durable store),
//! groups them by rounded coordinate and derived city, and reconciles
//! asynchronous geocoding results that may arrive out of order.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod models;
pub mod services;
pub mod session;
pub mod store;

pub use session::Session;
