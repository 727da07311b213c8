use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::Instant;

use photo_atlas::models::photo::Photo;
use photo_atlas::services::GroupingEngine;
use photo_atlas::store::PhotoStore;

/// A spread of coordinates across a handful of cities, with several
/// distinct locations per city.
fn fixture_photos(count: usize) -> Vec<Photo> {
    let cities = [
        ("Madrid, España", "España", 40.4168, -3.7038),
        ("Paris, France", "France", 48.8566, 2.3522),
        ("Lisboa, Portugal", "Portugal", 38.7223, -9.1393),
        ("Roma, Italia", "Italia", 41.9028, 12.4964),
        ("Berlin, Alemania", "Alemania", 52.5200, 13.4050),
    ];

    (0..count)
        .map(|i| {
            let (location, country, lat, lon) = cities[i % cities.len()];
            let jitter = (i / cities.len()) as f64 * 0.01;
            let mut photo = Photo::new(lat + jitter, lon + jitter, "2024-01-01".to_string(), None);
            photo.location = location.to_string();
            photo.country = country.to_string();
            photo
        })
        .collect()
}

fn benchmark_assign_and_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouping");

    group.bench_function("assign_1000_photos", |b| {
        let photos = fixture_photos(1000);
        b.iter(|| {
            let now = Instant::now();
            let mut store = PhotoStore::new();
            let mut engine = GroupingEngine::new(now);
            for photo in photos.iter().cloned() {
                let id = store.insert(photo);
                engine.assign_photo(&mut store, id, now);
            }
            black_box(engine.cities().len())
        })
    });

    group.bench_function("refresh_markers_200_locations", |b| {
        let now = Instant::now();
        let mut store = PhotoStore::new();
        let mut engine = GroupingEngine::new(now);
        for photo in fixture_photos(1000) {
            let id = store.insert(photo);
            engine.assign_photo(&mut store, id, now);
        }
        b.iter(|| black_box(engine.refresh_markers(now).updated))
    });

    group.finish();
}

criterion_group!(benches, benchmark_assign_and_refresh);
criterion_main!(benches);
