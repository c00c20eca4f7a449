use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use occupancy_engine::freebusy::{compute_free_busy, compute_free_busy_merged, BookedInterval};
use occupancy_engine::DayWindow;

fn bookings(n: i64) -> Vec<BookedInterval> {
    let base = Utc.with_ymd_and_hms(2025, 6, 2, 7, 30, 0).unwrap();
    // Deliberately unsorted and overlapping.
    (0..n)
        .map(|i| {
            let offset = (i * 37) % 780;
            BookedInterval::new(
                base + Duration::minutes(offset),
                base + Duration::minutes(offset + 45),
            )
        })
        .collect()
}

fn bench_sweeps(c: &mut Criterion) {
    let window = DayWindow::new(
        Utc.with_ymd_and_hms(2025, 6, 2, 7, 30, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 6, 2, 21, 0, 0).unwrap(),
    )
    .unwrap();
    let input = bookings(500);

    c.bench_function("compute_free_busy/500", |b| {
        b.iter(|| compute_free_busy(black_box(&input), black_box(&window)))
    });
    c.bench_function("compute_free_busy_merged/500", |b| {
        b.iter(|| compute_free_busy_merged(black_box(&input), black_box(&window)))
    });
}

criterion_group!(benches, bench_sweeps);
criterion_main!(benches);
