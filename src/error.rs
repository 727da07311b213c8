// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Remote store not configured (offline mode)")]
    RemoteOffline,

    #[error("Image processing error: {0}")]
    Image(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Marker message for a remote rate-limit rejection (429).
    pub const REMOTE_RATE_LIMIT: &'static str = "RATE_LIMITED";
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
