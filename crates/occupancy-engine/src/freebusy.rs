//! Split a day window into free and occupied intervals.
//!
//! Two sweeps are provided. [`compute_free_busy`] walks the bookings exactly as
//! they come (sorted, never merged), which is what the occupancy view has always
//! shown. [`compute_free_busy_merged`] clips and coalesces the bookings first, so
//! its output always tiles the window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::window::DayWindow;

/// A half-open range `[start, end)` during which a resource is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookedInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

/// A contiguous span of the day window, either free or occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub occupied: bool,
}

impl FreeInterval {
    fn free(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            occupied: false,
        }
    }

    fn occupied(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            occupied: true,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Compute free/occupied intervals for one resource over `window`.
///
/// Bookings are stable-sorted by start time and swept with a cursor that starts
/// at `window.day_start`:
///
/// - a free interval `[cursor, booking.start)` is emitted when the cursor is
///   strictly before the booking,
/// - the booking itself is emitted as occupied,
/// - the cursor moves to `booking.end`.
///
/// A trailing free interval closes the window if the cursor has not reached
/// `window.day_end`.
///
/// Overlapping bookings are not merged and bookings are not clipped to the
/// window, so the cursor can move backwards and occupied spans can extend past
/// the cutoffs. Inverted bookings pass through unvalidated. Use
/// [`compute_free_busy_merged`] when the output has to tile the window.
pub fn compute_free_busy(booked: &[BookedInterval], window: &DayWindow) -> Vec<FreeInterval> {
    let mut sorted = booked.to_vec();
    // `sort_by_key` is stable, so ties keep their fetch order.
    sorted.sort_by_key(|b| b.start);

    sweep(&sorted, window)
}

/// Compute free/occupied intervals after clipping and coalescing the bookings.
///
/// Bookings entirely outside the window, empty bookings and inverted bookings
/// are dropped. Overlapping or touching bookings become a single occupied
/// interval. The result starts at `day_start`, ends at `day_end`, has no gaps or
/// overlaps, and strictly alternates between free and occupied.
pub fn compute_free_busy_merged(
    booked: &[BookedInterval],
    window: &DayWindow,
) -> Vec<FreeInterval> {
    let merged = merge_booked(booked, window);
    sweep(&merged, window)
}

/// Clip bookings to `window` and coalesce overlapping or adjacent ones.
///
/// Returns a sorted, non-overlapping, non-touching list.
pub fn merge_booked(booked: &[BookedInterval], window: &DayWindow) -> Vec<BookedInterval> {
    let mut clipped: Vec<BookedInterval> = booked
        .iter()
        .filter(|b| b.start < b.end)
        .filter(|b| b.start < window.day_end && b.end > window.day_start)
        .map(|b| BookedInterval::new(b.start.max(window.day_start), b.end.min(window.day_end)))
        .collect();

    clipped.sort_by_key(|b| (b.start, b.end));

    let mut merged: Vec<BookedInterval> = Vec::with_capacity(clipped.len());
    for interval in clipped {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}

/// First free interval of at least `min_minutes` in the merged view.
pub fn first_free_interval(
    booked: &[BookedInterval],
    window: &DayWindow,
    min_minutes: i64,
) -> Option<FreeInterval> {
    compute_free_busy_merged(booked, window)
        .into_iter()
        .find(|i| !i.occupied && i.duration_minutes() >= min_minutes)
}

fn sweep(sorted: &[BookedInterval], window: &DayWindow) -> Vec<FreeInterval> {
    let mut out = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut cursor = window.day_start;

    for booking in sorted {
        if cursor < booking.start {
            out.push(FreeInterval::free(cursor, booking.start));
        }
        out.push(FreeInterval::occupied(booking.start, booking.end));
        cursor = booking.end;
    }

    if cursor < window.day_end {
        out.push(FreeInterval::free(cursor, window.day_end));
    }

    out
}
