//! # occupancy-engine
//!
//! Free/busy computation for bookable rooms over a bounded exam day.
//!
//! Everything in this crate is synchronous and deterministic: callers fetch
//! bookings from wherever they live and hand plain slices in. Nothing is cached
//! between calls.
//!
//! ## Modules
//!
//! - [`window`] — the schedulable part of a day (default 07:30–21:00)
//! - [`freebusy`] — booked intervals → alternating free/occupied intervals
//! - [`conflict`] — slot availability and double-booking detection
//! - [`occupancy`] — per-room timelines and candidate exam slots
//! - [`calendar`] — month grid of exam periods with filters
//! - [`error`] — Error types

pub mod calendar;
pub mod conflict;
pub mod error;
pub mod freebusy;
pub mod occupancy;
pub mod window;

pub use calendar::{ExamPeriod, MonthGrid, PeriodFilter};
pub use conflict::{find_conflicts, is_slot_free};
pub use error::OccupancyError;
pub use freebusy::{compute_free_busy, compute_free_busy_merged, BookedInterval, FreeInterval};
pub use occupancy::{RoomBooking, RoomTimeline};
pub use window::DayWindow;
