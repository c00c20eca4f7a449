//! Room occupancy backed by the store: loads rooms and exam bookings and
//! hands them to the occupancy engine.

use chrono::{DateTime, SecondsFormat, Utc};
use occupancy_engine::conflict::is_slot_free;
use occupancy_engine::occupancy::{
    free_rooms_by_slot, room_timelines, RoomFilter, SlotAvailability, SweepMode,
};
use occupancy_engine::{BookedInterval, DayWindow, RoomBooking, RoomTimeline};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::query::{Direction, Query};
use crate::records::{Building, ExamDetail, Room, BUILDINGS_TABLE, EXAM_DETAILS_TABLE, ROOMS_TABLE};
use crate::store::{self, DataStore};

/// A room together with its timeline for the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomOccupancy {
    pub room: Room,
    pub timeline: RoomTimeline,
}

pub async fn load_buildings(store: &dyn DataStore) -> Result<Vec<Building>> {
    let query = Query::table(BUILDINGS_TABLE).order("building_id", Direction::Ascending);
    store::fetch(store, &query).await
}

/// Rooms matching `filter`, ordered by id.
pub async fn load_rooms(store: &dyn DataStore, filter: &RoomFilter) -> Result<Vec<Room>> {
    let mut query = Query::table(ROOMS_TABLE);
    if let Some(building) = &filter.building_id {
        query = query.eq("building_id", building.as_str());
    }
    if let Some(room_type) = &filter.room_type {
        query = query.eq("room_type", room_type.as_str());
    }
    let rooms: Vec<Room> = store::fetch(store, &query.order("room_id", Direction::Ascending)).await?;
    Ok(rooms
        .into_iter()
        .filter(|r| filter.matches(r.building_id.as_deref(), &r.room_type))
        .collect())
}

/// Bookings overlapping `[start, end)`, optionally for one room.
///
/// Exams with no start or end time are skipped.
pub async fn load_bookings(
    store: &dyn DataStore,
    room_id: Option<&str>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<RoomBooking>> {
    let mut query = Query::table(EXAM_DETAILS_TABLE)
        .lt("exam_start_time", timestamp(end))
        .gt("exam_end_time", timestamp(start));
    if let Some(room_id) = room_id {
        query = query.eq("room_id", room_id);
    }
    let details: Vec<ExamDetail> =
        store::fetch(store, &query.order("exam_start_time", Direction::Ascending)).await?;

    let bookings: Vec<RoomBooking> = details.iter().filter_map(ExamDetail::to_booking).collect();
    debug!(
        rows = details.len(),
        bookings = bookings.len(),
        "exam bookings loaded"
    );
    Ok(bookings)
}

/// One timeline per room matching `filter`, in room-id order.
pub async fn occupancy(
    store: &dyn DataStore,
    filter: &RoomFilter,
    window: &DayWindow,
    mode: SweepMode,
) -> Result<Vec<RoomOccupancy>> {
    let rooms = load_rooms(store, filter).await?;
    let bookings = load_bookings(store, None, window.day_start, window.day_end).await?;
    let timelines = room_timelines(rooms.iter().map(|r| r.room_id.as_str()), &bookings, window, mode);

    Ok(rooms
        .into_iter()
        .zip(timelines)
        .map(|(room, timeline)| RoomOccupancy { room, timeline })
        .collect())
}

/// True when no exam in `room_id` overlaps `[start, end)`.
pub async fn is_room_available(
    store: &dyn DataStore,
    room_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<bool> {
    let bookings = load_bookings(store, Some(room_id), start, end).await?;
    let booked: Vec<BookedInterval> = bookings.iter().map(RoomBooking::interval).collect();
    Ok(is_slot_free(&booked, start, end))
}

/// Rooms matching `filter` that are free in each `duration_minutes` slot of the window.
pub async fn free_rooms(
    store: &dyn DataStore,
    filter: &RoomFilter,
    window: &DayWindow,
    duration_minutes: i64,
) -> Result<Vec<SlotAvailability>> {
    let rooms = load_rooms(store, filter).await?;
    let bookings = load_bookings(store, None, window.day_start, window.day_end).await?;
    Ok(free_rooms_by_slot(
        rooms.iter().map(|r| r.room_id.as_str()),
        &bookings,
        window,
        duration_minutes,
    ))
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}
