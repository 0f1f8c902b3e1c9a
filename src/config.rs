//! Ride tracking configuration

use serde::Deserialize;
use time::Duration;

/// Speed considered "clearly moving", ~3 mph
pub const MIN_AUTO_START_SPEED: f64 = 1.35;

/// Max gap between samples before an active ride is auto-paused, in seconds
pub const MAX_AUTO_PAUSE_GAP: u32 = 30;

/// Tracker thresholds and tick cadence
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Min speed, in m/s, two consecutive samples must reach to start or resume
    pub auto_start_speed: f64,
    /// Max gap between samples, in seconds
    pub max_pause_gap: u32,
    /// Tick period of the ride loop, in milliseconds
    pub tick_interval_ms: u64,
    /// Show a zero speed while the ride is paused
    pub zero_speed_when_paused: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            auto_start_speed: MIN_AUTO_START_SPEED,
            max_pause_gap: MAX_AUTO_PAUSE_GAP,
            tick_interval_ms: 1000,
            zero_speed_when_paused: true,
        }
    }
}

impl TrackerConfig {
    pub fn pause_gap(&self) -> Duration {
        Duration::seconds(self.max_pause_gap.into())
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tracker_config() -> Result<(), String> {
        let tc: TrackerConfig = serde_yaml::from_str("{}").map_err(|e| e.to_string())?;
        assert_eq!(TrackerConfig::default(), tc);
        assert_eq!(Duration::seconds(30), tc.pause_gap());

        let yaml = "auto_start_speed: 2.0\nmax_pause_gap: 60\nzero_speed_when_paused: false";
        let tc: TrackerConfig = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
        assert_eq!(
            TrackerConfig {
                auto_start_speed: 2.0,
                max_pause_gap: 60,
                tick_interval_ms: 1000,
                zero_speed_when_paused: false,
            },
            tc
        );

        Ok(())
    }
}
