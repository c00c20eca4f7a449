//! Property-based tests for the free/busy sweeps using proptest.
//!
//! These check invariants that must hold for *any* booking list, not just the
//! hand-written cases in `freebusy_tests.rs`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use occupancy_engine::freebusy::{compute_free_busy, compute_free_busy_merged, BookedInterval};
use occupancy_engine::DayWindow;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()
}

/// 07:30–21:00 expressed in minutes after midnight.
const WINDOW_START: i64 = 7 * 60 + 30;
const WINDOW_END: i64 = 21 * 60;

fn window() -> DayWindow {
    DayWindow::new(
        base() + Duration::minutes(WINDOW_START),
        base() + Duration::minutes(WINDOW_END),
    )
    .unwrap()
}

/// Arbitrary bookings anywhere in the day, possibly overlapping or inverted.
fn arb_booking() -> impl Strategy<Value = BookedInterval> {
    (0i64..24 * 60, 0i64..24 * 60).prop_map(|(a, b)| {
        BookedInterval::new(base() + Duration::minutes(a), base() + Duration::minutes(b))
    })
}

/// Sorted, disjoint bookings fully inside the window.
fn arb_disjoint_bookings() -> impl Strategy<Value = Vec<BookedInterval>> {
    prop::collection::btree_set(WINDOW_START..=WINDOW_END, 0..12).prop_map(|cuts| {
        let cuts: Vec<i64> = cuts.into_iter().collect();
        cuts.chunks_exact(2)
            .map(|pair| {
                BookedInterval::new(
                    base() + Duration::minutes(pair[0]),
                    base() + Duration::minutes(pair[1]),
                )
            })
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn merged_sweep_tiles_the_window(bookings in prop::collection::vec(arb_booking(), 0..20)) {
        let window = window();
        let result = compute_free_busy_merged(&bookings, &window);

        prop_assert!(!result.is_empty());
        prop_assert_eq!(result.first().unwrap().start, window.day_start);
        prop_assert_eq!(result.last().unwrap().end, window.day_end);

        for pair in result.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start, "gap or overlap between intervals");
            prop_assert_ne!(pair[0].occupied, pair[1].occupied, "flags must alternate");
        }
        for interval in &result {
            prop_assert!(interval.start < interval.end, "zero-length interval emitted");
        }

        let total: i64 = result.iter().map(|i| i.duration_minutes()).sum();
        prop_assert_eq!(total, window.span_minutes());
    }

    #[test]
    fn sweeps_agree_on_disjoint_sorted_input(bookings in arb_disjoint_bookings()) {
        let window = window();
        let raw = compute_free_busy(&bookings, &window);

        // Cut points are distinct, so bookings never touch and nothing merges.
        prop_assert_eq!(&raw, &compute_free_busy_merged(&bookings, &window));

        // Concatenated spans equal the window span.
        let total: i64 = raw.iter().map(|i| i.duration_minutes()).sum();
        prop_assert_eq!(total, window.span_minutes());

        // Occupied intervals appear exactly once each, in order.
        let occupied: Vec<BookedInterval> = raw
            .iter()
            .filter(|i| i.occupied)
            .map(|i| BookedInterval::new(i.start, i.end))
            .collect();
        prop_assert_eq!(occupied, bookings);

        // No two free intervals are adjacent.
        for pair in raw.windows(2) {
            prop_assert!(pair[0].occupied || pair[1].occupied);
        }
    }

    #[test]
    fn empty_input_is_one_free_interval(start in 0i64..600, len in 1i64..600) {
        let window = DayWindow::new(
            base() + Duration::minutes(start),
            base() + Duration::minutes(start + len),
        )
        .unwrap();

        let result = compute_free_busy(&[], &window);
        prop_assert_eq!(result.len(), 1);
        prop_assert!(!result[0].occupied);
        prop_assert_eq!(result[0].start, window.day_start);
        prop_assert_eq!(result[0].end, window.day_end);
    }
}
