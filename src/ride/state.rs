//! Ride state snapshot and its derived statistics

use geo::geometry::Point;
use time::{Duration, OffsetDateTime};

use super::position::Position;
use crate::weather::Weather;

/// Remaining durations beyond this are not shown as an arrival time
pub const ETA_HORIZON: Duration = Duration::hours(24);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RideStatus {
    #[default]
    NotStarted,
    Active,
    Paused,
}

impl RideStatus {
    pub fn is_started(&self) -> bool {
        *self != RideStatus::NotStarted
    }

    pub fn is_paused(&self) -> bool {
        *self == RideStatus::Paused
    }
}

/// Estimated arrival time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eta {
    /// No plan target, no average speed yet or nothing left to ride
    Unavailable,
    /// Arrival is further away than `ETA_HORIZON`
    Suppressed,
    At(OffsetDateTime),
}

/// Accumulated ride record, published as an immutable snapshot per tick
///
/// All distances are in meters and speeds in m/s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RideState {
    pub position: Option<Position>,
    pub route_points: Vec<Point>,
    pub route_plan_points: Option<Vec<Point>>,
    pub trip_start_time: Option<OffsetDateTime>,
    pub elapsed_time: Duration,
    pub distance: f64,
    pub max_speed: f64,
    pub total_distance: Option<f64>,
    pub status: RideStatus,
    pub weather: Option<Weather>,
}

impl RideState {
    pub fn is_paused(&self) -> bool {
        self.status.is_paused()
    }

    pub fn avg_speed(&self) -> f64 {
        let elapsed = self.elapsed_time.as_seconds_f64();
        if elapsed > 0.0 {
            self.distance / elapsed
        } else {
            0.0
        }
    }

    /// Planned distance left, only while there is some left
    pub fn remaining_distance(&self) -> Option<f64> {
        self.total_distance
            .map(|total| total - self.distance)
            .filter(|remaining| *remaining > 0.0)
    }

    pub fn estimated_remaining_time(&self) -> Option<Duration> {
        let avg = self.avg_speed();
        if avg <= 0.0 {
            return None;
        }

        self.remaining_distance()
            // clamped, very low averages would overflow the duration
            .map(|remaining| Duration::seconds_f64((remaining / avg).min(1e12)))
    }

    pub fn estimated_arrival(&self, now: OffsetDateTime) -> Eta {
        match self.estimated_remaining_time() {
            None => Eta::Unavailable,
            Some(remaining) if remaining > ETA_HORIZON => Eta::Suppressed,
            Some(remaining) => Eta::At(now + remaining),
        }
    }
}
