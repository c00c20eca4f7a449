//! The schedulable portion of a calendar day.
//!
//! Exams are only plotted between a fixed morning and evening cutoff in the
//! campus timezone. A [`DayWindow`] pins those wall-clock cutoffs to concrete UTC
//! instants for one date.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{OccupancyError, Result};

/// Default first schedulable minute of the day (local time).
pub const DEFAULT_DAY_START: &str = "07:30";

/// Default end of the schedulable day (local time).
pub const DEFAULT_DAY_END: &str = "21:00";

/// Bounds outside which no interval is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub day_start: DateTime<Utc>,
    pub day_end: DateTime<Utc>,
}

impl DayWindow {
    /// Build a window from two instants.
    ///
    /// # Errors
    /// Returns `OccupancyError::InvalidWindow` unless `day_start < day_end`.
    pub fn new(day_start: DateTime<Utc>, day_end: DateTime<Utc>) -> Result<Self> {
        if day_start >= day_end {
            return Err(OccupancyError::InvalidWindow(format!(
                "start {} is not before end {}",
                day_start.to_rfc3339(),
                day_end.to_rfc3339()
            )));
        }
        Ok(Self { day_start, day_end })
    }

    /// Build a window for `date` from local wall-clock cutoffs in `tz`.
    ///
    /// An ambiguous local time (DST fall-back) resolves to the earlier instant.
    /// A local time that falls in a DST gap is rejected.
    pub fn on_date(date: NaiveDate, start: NaiveTime, end: NaiveTime, tz: Tz) -> Result<Self> {
        let day_start = resolve_local(tz, date, start)?;
        let day_end = resolve_local(tz, date, end)?;
        Self::new(day_start, day_end)
    }

    /// The default 07:30–21:00 exam day for `date` in `tz`.
    pub fn campus_day(date: NaiveDate, tz: Tz) -> Result<Self> {
        Self::on_date(
            date,
            parse_time_of_day(DEFAULT_DAY_START)?,
            parse_time_of_day(DEFAULT_DAY_END)?,
            tz,
        )
    }

    pub fn span_minutes(&self) -> i64 {
        (self.day_end - self.day_start).num_minutes()
    }

    /// True when `instant` lies in `[day_start, day_end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.day_start <= instant && instant < self.day_end
    }
}

/// Parse a wall-clock time written as `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| OccupancyError::InvalidTime(s.to_string()))
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| OccupancyError::InvalidTimezone(name.to_string()))
}

fn resolve_local(tz: Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(OccupancyError::NonexistentLocalTime(format!(
            "{} {}",
            naive,
            tz.name()
        ))),
    }
}
