//! Numeric readouts of a ride state

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use super::state::{Eta, RideState};
use crate::units::Conversion;

/// Shown when the arrival time is unavailable or too far away
pub const ETA_PLACEHOLDER: &str = "--:--";

/// Display strings of a ride state, in the chosen unit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RideReadout {
    pub speed: String,
    pub avg_speed: String,
    pub max_speed: String,
    pub distance: String,
    pub total_distance: String,
    pub trip_time: String,
    pub eta: String,
}

impl RideReadout {
    /// `offset` is the local offset the arrival time is shown in
    pub fn new(
        state: &RideState,
        conversion: &Conversion,
        now: OffsetDateTime,
        offset: UtcOffset,
    ) -> Self {
        let speed = state.position.as_ref().map(|p| p.speed).unwrap_or(0.0);
        let elapsed = state.elapsed_time.whole_seconds();

        let eta = match state.estimated_arrival(now) {
            Eta::At(at) => at
                .to_offset(offset)
                .format(format_description!("[hour]:[minute]"))
                .unwrap_or_else(|_| ETA_PLACEHOLDER.to_string()),
            Eta::Unavailable | Eta::Suppressed => ETA_PLACEHOLDER.to_string(),
        };

        Self {
            speed: format!("{:04.1}", conversion.speed(speed)),
            avg_speed: format!("{:04.1}", conversion.speed(state.avg_speed())),
            max_speed: format!("{:04.1}", conversion.speed(state.max_speed)),
            distance: format!("{:05.1}", conversion.distance(state.distance)),
            total_distance: match state.total_distance {
                Some(total) => format!("{:05.1}", conversion.distance(total)),
                None => "---.-".to_string(),
            },
            trip_time: format!(
                "{:02}:{:02}",
                conversion.hours(elapsed),
                conversion.minutes(elapsed)
            ),
            eta,
        }
    }
}
