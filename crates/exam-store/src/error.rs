//! Error types for data-store operations.

use occupancy_engine::OccupancyError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Could not decode row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid query on {table}: {reason}")]
    InvalidQuery { table: String, reason: String },

    #[error("No row in {table} matched {key}")]
    NotFound { table: String, key: String },

    #[error("Request {0} is not pending")]
    NotPending(Uuid),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Occupancy(#[from] OccupancyError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
