//! touring - ride tracking for touring trips
//!
//! Turns a noisy stream of GPS samples into ride statistics with automatic
//! start and pause detection, and keeps trip plans with the rides recorded
//! on them.

pub mod config;
mod error;
pub mod plan;
pub mod ride;
pub mod sources;
pub mod units;
pub mod weather;

pub use config::TrackerConfig;
pub use error::{Result, TouringError};
pub use plan::{RideGpx, TripPlan, TripRepository, TripWaypoint};
pub use ride::{
    Eta, LatestPosition, Position, RawPosition, RideReadout, RideSession, RideState, RideStatus,
    RideTracker,
};
pub use sources::LocationSource;
pub use units::{Conversion, DistanceUnit};
pub use weather::{Weather, WeatherSource};
