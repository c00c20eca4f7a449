//! Month grid of exam periods.
//!
//! Each day cell lists the exam periods whose date range covers that day, after
//! applying the optional academic-year / category / college / department / term
//! filters. The
//! first matching period (in fetch order) supplies the cell's headline.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{OccupancyError, Result};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// An exam period as stored in `tbl_examperiod`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamPeriod {
    pub examperiod_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub academic_year: String,
    pub exam_category: String,
    #[serde(default)]
    pub college_id: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
    pub term_id: i64,
}

impl ExamPeriod {
    /// True when `date` falls between the period's start and end calendar
    /// dates (inclusive) as seen in `tz`.
    pub fn covers(&self, date: NaiveDate, tz: Tz) -> bool {
        let start = self.start_date.with_timezone(&tz).date_naive();
        let end = self.end_date.with_timezone(&tz).date_naive();
        start <= date && date <= end
    }
}

/// Optional criteria narrowing which periods appear on the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFilter {
    pub academic_year: Option<String>,
    pub exam_category: Option<String>,
    pub college_id: Option<String>,
    pub department_id: Option<String>,
    pub term_id: Option<i64>,
}

impl PeriodFilter {
    pub fn matches(&self, period: &ExamPeriod) -> bool {
        if let Some(year) = &self.academic_year {
            if &period.academic_year != year {
                return false;
            }
        }
        if let Some(category) = &self.exam_category {
            if &period.exam_category != category {
                return false;
            }
        }
        if let Some(college) = &self.college_id {
            if period.college_id.as_ref() != Some(college) {
                return false;
            }
        }
        if let Some(department) = &self.department_id {
            if period.department_id.as_ref() != Some(department) {
                return false;
            }
        }
        if let Some(term) = self.term_id {
            if period.term_id != term {
                return false;
            }
        }
        true
    }
}

/// One day of the displayed month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub is_today: bool,
    /// Matching periods in fetch order.
    pub periods: Vec<ExamPeriod>,
    /// Distinct non-empty college ids of the matching periods, first-seen order.
    pub colleges: Vec<String>,
}

impl DayCell {
    /// The period whose metadata the cell displays.
    pub fn headline(&self) -> Option<&ExamPeriod> {
        self.periods.first()
    }
}

/// A month laid out Sunday-first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    /// Empty cells before day 1 (0 when the month starts on a Sunday).
    pub leading_blanks: u32,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    /// Lay out `year`-`month` and attach the periods matching `filter`.
    ///
    /// # Errors
    /// Returns `OccupancyError::InvalidMonth` when the month is outside 1..=12
    /// or the date is out of chrono's range.
    pub fn build(
        year: i32,
        month: u32,
        periods: &[ExamPeriod],
        filter: &PeriodFilter,
        today: NaiveDate,
        tz: Tz,
    ) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(OccupancyError::InvalidMonth { year, month })?;
        let days = days_in_month(year, month)?;

        let matching: Vec<&ExamPeriod> = periods.iter().filter(|p| filter.matches(p)).collect();

        let cells = (1..=days)
            .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
            .map(|date| {
                let day_periods: Vec<ExamPeriod> = matching
                    .iter()
                    .filter(|p| p.covers(date, tz))
                    .map(|p| (*p).clone())
                    .collect();

                let mut colleges: Vec<String> = Vec::new();
                for college in day_periods.iter().filter_map(|p| p.college_id.as_deref()) {
                    if !college.is_empty() && !colleges.iter().any(|c| c == college) {
                        colleges.push(college.to_string());
                    }
                }

                DayCell {
                    day: date.day(),
                    date,
                    is_today: date == today,
                    periods: day_periods,
                    colleges,
                }
            })
            .collect();

        Ok(Self {
            year,
            month,
            leading_blanks: first.weekday().num_days_from_sunday(),
            cells,
        })
    }

    pub fn title(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }

    pub fn previous(&self) -> (i32, u32) {
        previous_month(self.year, self.month)
    }

    pub fn next(&self) -> (i32, u32) {
        next_month(self.year, self.month)
    }
}

/// English month name for 1..=12, empty otherwise.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[(month - 1) as usize],
        _ => "",
    }
}

pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let (next_year, next) = next_month(year, month);
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next, 1)
        .ok_or(OccupancyError::InvalidMonth { year, month })?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(OccupancyError::InvalidMonth { year, month })?;
    Ok((first_of_next - first).num_days() as u32)
}
