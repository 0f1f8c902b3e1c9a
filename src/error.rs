//! Error types

use thiserror::Error;

/// Failures surfaced by the touring core
///
/// None of them are fatal to a running ride: the tick loop keeps going and the
/// in-memory ride state is left untouched.
#[derive(Debug, Error)]
pub enum TouringError {
    #[error("Failed on access the trip plan storage: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid trip plan data: {0}")]
    PlanFormat(#[from] serde_json::Error),
    #[error("Trip plan `{0}` not found")]
    PlanNotFound(String),
    #[error("Invalid location record: {0}")]
    InvalidRecord(String),
    #[cfg(feature = "csv")]
    #[error("Failed on read the location log: {0}")]
    Csv(#[from] csv::Error),
    #[error("Weather service failed: {0}")]
    Weather(String),
    #[error("Failed on write the GPX: {0}")]
    Gpx(String),
    #[error("Ride already in progress, a trip plan can only be resumed before the first position")]
    RideInProgress,
}

pub type Result<T> = std::result::Result<T, TouringError>;
