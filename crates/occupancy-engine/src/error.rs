//! Error types for occupancy-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OccupancyError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Local time {0} does not exist in the configured timezone")]
    NonexistentLocalTime(String),

    #[error("Invalid day window: {0}")]
    InvalidWindow(String),

    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

pub type Result<T> = std::result::Result<T, OccupancyError>;
