//! Per-room occupancy for the room management views.
//!
//! Exam bookings arrive as one flat list covering every room. This module
//! groups them by room, runs the free/busy sweep per room, and splits the day
//! into back-to-back exam slots to report which rooms can host each one.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::conflict::is_slot_free;
use crate::freebusy::{self, BookedInterval, FreeInterval};
use crate::window::DayWindow;

/// Room type shown when no filter is chosen.
pub const DEFAULT_ROOM_TYPE: &str = "Lecture";

/// One exam occupying one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomBooking {
    pub room_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Free-form description (course and section) for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl RoomBooking {
    pub fn interval(&self) -> BookedInterval {
        BookedInterval::new(self.start, self.end)
    }
}

/// Which sweep to run for each room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepMode {
    /// Clip and coalesce bookings first; output tiles the window.
    #[default]
    Merged,
    /// Sort only, exactly as bookings were stored.
    Raw,
}

/// Building / room-type filter for the room grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomFilter {
    pub building_id: Option<String>,
    pub room_type: Option<String>,
}

impl RoomFilter {
    /// An unset criterion matches every room.
    pub fn matches(&self, building_id: Option<&str>, room_type: &str) -> bool {
        if let Some(wanted) = &self.building_id {
            if building_id != Some(wanted.as_str()) {
                return false;
            }
        }
        match &self.room_type {
            Some(wanted) => wanted == room_type,
            None => true,
        }
    }
}

/// Free/occupied timeline of one room over the day window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTimeline {
    pub room_id: String,
    pub intervals: Vec<FreeInterval>,
    /// Minutes of the window covered by at least one booking.
    pub occupied_minutes: i64,
}

impl RoomTimeline {
    pub fn free_minutes(&self, window: &DayWindow) -> i64 {
        window.span_minutes() - self.occupied_minutes
    }

    pub fn is_vacant(&self) -> bool {
        self.occupied_minutes == 0
    }
}

/// Rooms that can host an exam in one candidate slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub free_rooms: Vec<String>,
}

/// Group bookings by room, keeping each room's bookings in input order.
pub fn group_by_room(bookings: &[RoomBooking]) -> BTreeMap<String, Vec<BookedInterval>> {
    let mut by_room: BTreeMap<String, Vec<BookedInterval>> = BTreeMap::new();
    for booking in bookings {
        by_room
            .entry(booking.room_id.clone())
            .or_default()
            .push(booking.interval());
    }
    by_room
}

/// Build one timeline per room in `room_ids`, in the order given.
///
/// Only bookings that overlap the window are considered; a room with none is
/// a single free interval.
pub fn room_timelines<'a, I>(
    room_ids: I,
    bookings: &[RoomBooking],
    window: &DayWindow,
    mode: SweepMode,
) -> Vec<RoomTimeline>
where
    I: IntoIterator<Item = &'a str>,
{
    let by_room = group_by_room(bookings);

    room_ids
        .into_iter()
        .map(|room_id| {
            let booked: Vec<BookedInterval> = by_room
                .get(room_id)
                .map(|list| {
                    list.iter()
                        .filter(|b| b.start < window.day_end && b.end > window.day_start)
                        .copied()
                        .collect()
                })
                .unwrap_or_default();
            room_timeline(room_id, &booked, window, mode)
        })
        .collect()
}

/// Timeline for a single room's bookings.
pub fn room_timeline(
    room_id: &str,
    booked: &[BookedInterval],
    window: &DayWindow,
    mode: SweepMode,
) -> RoomTimeline {
    let intervals = match mode {
        SweepMode::Merged => freebusy::compute_free_busy_merged(booked, window),
        SweepMode::Raw => freebusy::compute_free_busy(booked, window),
    };
    let occupied_minutes = freebusy::merge_booked(booked, window)
        .iter()
        .map(|b| (b.end - b.start).num_minutes())
        .sum();

    RoomTimeline {
        room_id: room_id.to_string(),
        intervals,
        occupied_minutes,
    }
}

/// Split the window into back-to-back slots of `duration_minutes`.
///
/// Slots start at `day_start`. A final slot that would run past `day_end` is
/// not produced. A non-positive duration, or one longer than the window,
/// yields no slots.
pub fn candidate_slots(window: &DayWindow, duration_minutes: i64) -> Vec<BookedInterval> {
    if duration_minutes <= 0 || duration_minutes > window.span_minutes() {
        return Vec::new();
    }
    let Some(step) = Duration::try_minutes(duration_minutes) else {
        return Vec::new();
    };

    let mut slots = Vec::new();
    let mut slot_start = window.day_start;
    while let Some(slot_end) = slot_start.checked_add_signed(step) {
        if slot_end > window.day_end {
            break;
        }
        slots.push(BookedInterval::new(slot_start, slot_end));
        slot_start = slot_end;
    }
    slots
}

/// For each candidate slot, list the rooms in `room_ids` with no overlapping booking.
pub fn free_rooms_by_slot<'a, I>(
    room_ids: I,
    bookings: &[RoomBooking],
    window: &DayWindow,
    duration_minutes: i64,
) -> Vec<SlotAvailability>
where
    I: IntoIterator<Item = &'a str>,
{
    let rooms: Vec<&str> = room_ids.into_iter().collect();
    let by_room = group_by_room(bookings);

    candidate_slots(window, duration_minutes)
        .into_iter()
        .map(|slot| {
            let free_rooms = rooms
                .iter()
                .filter(|room_id| {
                    by_room
                        .get(**room_id)
                        .map(|booked| is_slot_free(booked, slot.start, slot.end))
                        .unwrap_or(true)
                })
                .map(|room_id| room_id.to_string())
                .collect();
            SlotAvailability {
                start: slot.start,
                end: slot.end,
                free_rooms,
            }
        })
        .collect()
}
