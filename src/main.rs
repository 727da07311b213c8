// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Photo-Atlas headless session pass.
//!
//! Loads the local cache and the remote store for the configured owner,
//! merges the tiers, reconciles geocoding, persists, and reports trip
//! statistics.

use std::time::Instant;

use photo_atlas::{config::Config, db::RemoteStore, Session};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env()?;
    if config.owner_id.is_none() {
        tracing::warn!("OWNER_ID not set; remote sync disabled, shared cache key in use");
    }

    let remote = RemoteStore::new(config.remote_base_url.clone());
    if !remote.is_online() {
        tracing::warn!("REMOTE_STORE_URL not set; running offline");
    }

    let mut session = Session::new(&config, remote);
    session.load().await;

    // Let the debounced marker refresh come due, then drain it.
    tokio::time::sleep(photo_atlas::config::MARKER_REFRESH_DEBOUNCE).await;
    if let Some(outcome) = session.poll(Instant::now()) {
        tracing::info!(
            markers = session.groups().markers().len(),
            created = outcome.created,
            removed = outcome.removed,
            "Marker refresh complete"
        );
    }

    let stats = session.stats();
    tracing::info!(
        photos = stats.total_photos,
        cities = stats.total_cities,
        countries = stats.total_countries,
        flags = %stats.flags.join(" "),
        "Session ready"
    );

    Ok(())
}

/// Initialize structured logging.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("photo_atlas=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
