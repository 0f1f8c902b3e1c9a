//! Ride tracking state machine

use log::{debug, info, warn};
use time::OffsetDateTime;

use super::position::{Position, RawPosition};
use super::state::{RideState, RideStatus};
use crate::config::TrackerConfig;
use crate::plan::{TripPlan, TripRepository};
use crate::{Result, TouringError};

/// Turns the stream of raw samples into the accumulated ride state
///
/// Every tick compares the latest sample with the previous one. Two
/// consecutive samples at or above `auto_start_speed` start (or resume) the
/// ride, two below it, or a gap longer than `max_pause_gap`, pause it.
/// Time and distance accumulate over every segment ending in an active
/// tick, except the one leading up to the ride start.
pub struct RideTracker {
    config: TrackerConfig,
    previous: Option<Position>,
    state: RideState,
}

impl RideTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            previous: None,
            state: RideState::default(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn state(&self) -> &RideState {
        &self.state
    }

    pub fn into_state(self) -> RideState {
        self.state
    }

    /// Use the plan's total distance as the ride target and show its polyline
    pub fn apply_plan(&mut self, plan: &TripPlan) -> &mut Self {
        self.state.total_distance = plan.total_distance();
        self.state.route_plan_points = Some(plan.plan_route_points());

        self
    }

    /// Drop the plan's target and polyline
    pub fn clear_plan(&mut self) -> &mut Self {
        self.state.total_distance = None;
        self.state.route_plan_points = None;

        self
    }

    /// Load and apply a stored plan
    ///
    /// On failure the ride continues without a plan.
    pub fn load_plan(&mut self, repo: &TripRepository, file_name: &str) -> Result<TripPlan> {
        match repo.load(file_name) {
            Ok(plan) => {
                self.apply_plan(&plan);
                Ok(plan)
            }
            Err(e) => {
                warn!("Riding without trip plan, failed on load {}: {}", file_name, e);
                self.clear_plan();
                Err(e)
            }
        }
    }

    /// Continue the ride recorded on the plan
    ///
    /// Only possible before the first sample. The restored ride starts paused
    /// and resumes with the regular auto-start rule.
    pub fn resume_plan(&mut self, plan: &TripPlan) -> Result<()> {
        if self.previous.is_some() {
            return Err(TouringError::RideInProgress);
        }

        self.apply_plan(plan);

        if let Some(start) = plan.time_start {
            self.state.trip_start_time = Some(start);
            self.state.elapsed_time = time::Duration::seconds(plan.trip_elapsed_time.max(0));
            self.state.distance = plan.trip_distance.max(0.0);
            self.state.route_points = plan.ride_route_points.clone();
            self.state.status = RideStatus::Paused;
            info!("Resuming ride of `{}` started at {}", plan.name, start);
        }

        Ok(())
    }

    /// Evaluate one tick
    ///
    /// `sample` is the latest known position, `now` the tick time. Returns
    /// true when the state changed and has to be published.
    pub fn tick(&mut self, sample: Option<&RawPosition>, now: OffsetDateTime) -> bool {
        let Some(raw) = sample else {
            return false;
        };

        let Some(prev) = self.previous.take() else {
            let current = Position::resolve(raw, None);
            debug!("First position: {:?}", current);
            self.state.position = Some(self.displayed(&current));
            self.previous = Some(current);
            return true;
        };

        if raw.time <= prev.time {
            // Nothing new from the provider since the last tick
            let stale = now - prev.time > self.config.pause_gap();
            let changed = stale && self.state.status == RideStatus::Active;
            if changed {
                info!("No position since {}, ride auto-paused", prev.time);
                self.state.status = RideStatus::Paused;
                self.state.position = Some(self.displayed(&prev));
            }
            self.previous = Some(prev);
            return changed;
        }

        let current = Position::resolve(raw, Some(&prev));
        debug!("Position: {:?}", current);

        let threshold = self.config.auto_start_speed;
        let moving = current.speed >= threshold && prev.speed >= threshold;
        let stopped = current.speed < threshold && prev.speed < threshold;
        let gap = current.time - prev.time > self.config.pause_gap();

        let was = self.state.status;
        let next = match was {
            RideStatus::NotStarted | RideStatus::Paused if moving && !gap => RideStatus::Active,
            RideStatus::Active if stopped || gap => RideStatus::Paused,
            status => status,
        };

        if next != was {
            if was == RideStatus::NotStarted {
                self.state.trip_start_time = Some(current.time);
                info!("Ride auto-started at {}", current.time);
            } else if next == RideStatus::Active {
                info!("Ride auto-resumed at {}", current.time);
            } else if gap {
                info!("Position gap since {}, ride auto-paused", prev.time);
            } else {
                info!("Ride auto-paused at {}", current.time);
            }
            self.state.status = next;
        }

        if next == RideStatus::Active {
            self.state.route_points.push(current.coordinates);
            // samples before the start aren't part of the ride
            if was != RideStatus::NotStarted {
                self.state.elapsed_time += current.time - prev.time;
                self.state.distance += current.distance_to(&prev);
            }
            self.state.max_speed = self.state.max_speed.max(current.speed);
        }

        self.state.position = Some(self.displayed(&current));
        self.previous = Some(current);

        true
    }

    /// Drive one tick per position, tick time being the position time
    ///
    /// Returns the number of ticks that changed the state.
    pub fn replay(&mut self, positions: &[RawPosition]) -> usize {
        let mut changed = 0;
        for raw in positions {
            if self.tick(Some(raw), raw.time) {
                changed += 1;
            }
        }

        changed
    }

    fn displayed(&self, position: &Position) -> Position {
        let mut shown = position.clone();
        if self.state.is_paused() && self.config.zero_speed_when_paused {
            shown.speed = 0.0;
        }

        shown
    }
}
