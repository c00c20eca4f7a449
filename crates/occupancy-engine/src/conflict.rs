//! Room availability checks and double-booking detection.
//!
//! Two ranges overlap when `a.start < b.end && b.start < a.end`. An exam that
//! ends exactly when the next one starts does NOT conflict with it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::freebusy::BookedInterval;
use crate::occupancy::RoomBooking;

/// Two bookings of the same room whose time ranges overlap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub room_id: String,
    pub first: RoomBooking,
    pub second: RoomBooking,
    pub overlap_minutes: i64,
}

fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// True when no booking overlaps `[start, end)`.
pub fn is_slot_free(booked: &[BookedInterval], start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    !booked
        .iter()
        .any(|b| overlaps(b.start, b.end, start, end))
}

/// Find every pair of bookings that share a room and overlap in time.
///
/// Pairs are reported once, in input order (`first` precedes `second` in the
/// slice).
pub fn find_conflicts(bookings: &[RoomBooking]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for (i, a) in bookings.iter().enumerate() {
        for b in &bookings[i + 1..] {
            if a.room_id != b.room_id {
                continue;
            }
            if overlaps(a.start, a.end, b.start, b.end) {
                let overlap_start = a.start.max(b.start);
                let overlap_end = a.end.min(b.end);
                conflicts.push(Conflict {
                    room_id: a.room_id.clone(),
                    first: a.clone(),
                    second: b.clone(),
                    overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                });
            }
        }
    }

    conflicts
}
