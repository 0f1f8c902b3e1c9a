//! Trip plan definition

use geo::geometry::Point;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ride::RideState;

/// Planned stop of a trip, with the leg that leads to it
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TripWaypoint {
    pub location: Point,
    pub name: String,
    /// Polyline of the leg from the previous waypoint
    pub segment: Vec<Point>,
    /// Leg distance, meters
    pub delta_distance: f64,
    /// Cumulative distance from the trip start, meters
    pub total_distance: f64,
}

/// Named sequence of waypoints plus the record of the last ride on it
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TripPlan {
    pub name: String,
    pub way_points: Vec<TripWaypoint>,
    pub current_point: Option<usize>,
    #[serde(with = "time::serde::timestamp::option")]
    pub time_start: Option<OffsetDateTime>,
    /// Seconds
    pub trip_elapsed_time: i64,
    /// Meters
    pub trip_distance: f64,
    #[serde(with = "time::serde::timestamp::option")]
    pub time_end: Option<OffsetDateTime>,
    pub ride_route_points: Vec<Point>,
}

impl TripPlan {
    /// Start a new plan at the given location
    pub fn new(name: String, start: Point) -> Self {
        Self {
            name,
            way_points: vec![TripWaypoint {
                location: start,
                name: "Start".to_string(),
                ..Default::default()
            }],
            current_point: Some(0),
            ..Default::default()
        }
    }

    /// Append a waypoint reached through `segment`, `delta` meters from the last one
    pub fn push_waypoint(&mut self, name: String, segment: Vec<Point>, delta: f64) -> &mut Self {
        let prev_total = self.total_distance().unwrap_or(0.0);
        let location = match segment.last() {
            Some(last) => *last,
            None => self
                .way_points
                .last()
                .map(|wp| wp.location)
                .unwrap_or_else(|| Point::new(0.0, 0.0)),
        };

        self.way_points.push(TripWaypoint {
            location,
            name,
            segment,
            delta_distance: delta,
            total_distance: prev_total + delta,
        });
        self.current_point = Some(self.way_points.len() - 1);

        self
    }

    /// Planned polyline of the whole trip
    pub fn plan_route_points(&self) -> Vec<Point> {
        self.way_points
            .iter()
            .flat_map(|wp| wp.segment.iter().copied())
            .collect()
    }

    /// Planned distance up to the last waypoint
    pub fn total_distance(&self) -> Option<f64> {
        self.way_points.last().map(|wp| wp.total_distance)
    }

    /// True once a ride was recorded on this plan
    pub fn has_ride(&self) -> bool {
        self.time_start.is_some()
    }

    /// Merge the ride accumulators into the plan
    pub fn record_ride(&mut self, ride: &RideState, end: OffsetDateTime) -> &mut Self {
        // a ride that never started keeps the one already recorded
        let Some(start) = ride.trip_start_time else {
            return self;
        };

        self.time_start = Some(start);
        self.trip_elapsed_time = ride.elapsed_time.whole_seconds();
        self.trip_distance = ride.distance;
        self.time_end = Some(end);
        self.ride_route_points = ride.route_points.clone();

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::Duration;

    fn sample_plan() -> TripPlan {
        let mut plan = TripPlan::new("St Paul loop".to_string(), Point::new(-93.0913, 44.9544));
        plan.push_waypoint(
            "WP1".to_string(),
            vec![Point::new(-93.0913, 44.9544), Point::new(-93.0800, 44.9600)],
            1_100.0,
        )
        .push_waypoint(
            "WP2".to_string(),
            vec![Point::new(-93.0800, 44.9600), Point::new(-93.0700, 44.9700)],
            1_400.0,
        );
        plan
    }

    #[test]
    fn plan_distances() {
        let plan = sample_plan();
        assert_eq!(3, plan.way_points.len());
        assert_eq!(Some(2), plan.current_point);
        assert_eq!(Some(2_500.0), plan.total_distance());
        assert_eq!(1_100.0, plan.way_points[1].total_distance);
        assert_eq!(Point::new(-93.0700, 44.9700), plan.way_points[2].location);
        assert_eq!(4, plan.plan_route_points().len());
        assert!(!plan.has_ride());

        assert_eq!(None, TripPlan::default().total_distance());
    }

    #[test]
    fn record_ride_on_plan() {
        let mut plan = sample_plan();
        let ride = RideState {
            trip_start_time: Some(datetime!(2023-05-01 10:00 UTC)),
            elapsed_time: Duration::seconds(1_800),
            distance: 2_400.0,
            route_points: vec![Point::new(-93.0913, 44.9544), Point::new(-93.0800, 44.9600)],
            ..Default::default()
        };

        plan.record_ride(&ride, datetime!(2023-05-01 10:45 UTC));
        assert!(plan.has_ride());
        assert_eq!(Some(datetime!(2023-05-01 10:00 UTC)), plan.time_start);
        assert_eq!(Some(datetime!(2023-05-01 10:45 UTC)), plan.time_end);
        assert_eq!(1_800, plan.trip_elapsed_time);
        assert_eq!(2_400.0, plan.trip_distance);
        assert_eq!(2, plan.ride_route_points.len());
    }

    #[test]
    fn plan_json() -> Result<(), String> {
        let mut plan = sample_plan();
        plan.time_start = Some(datetime!(2023-05-01 10:00 UTC));

        let json = serde_json::to_string(&plan).map_err(|e| e.to_string())?;
        assert!(json.contains("\"timeStart\":1682935200"));
        assert!(json.contains("\"wayPoints\""));

        let back: TripPlan = serde_json::from_str(&json).map_err(|e| e.to_string())?;
        assert_eq!(plan, back);

        let minimal: TripPlan =
            serde_json::from_str("{\"name\":\"bare\"}").map_err(|e| e.to_string())?;
        assert_eq!("bare", minimal.name);
        assert_eq!(None, minimal.time_start);

        Ok(())
    }
}
