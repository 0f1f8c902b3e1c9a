//! GPX export of a trip plan and its ride

use std::io::Write;

use ::gpx::{Gpx, GpxVersion, Route, Track, TrackSegment, Waypoint};
use geo::geometry::Point;

use super::trip_plan::TripPlan;
use crate::{Result, TouringError};

pub struct RideGpx {
    pub waypoints: Vec<Waypoint>,
    pub routes: Vec<Route>,
    pub tracks: Vec<Track>,
}

impl RideGpx {
    pub fn empty() -> Self {
        Self {
            waypoints: vec![],
            routes: vec![],
            tracks: vec![],
        }
    }

    /// Export the plan waypoints, its polyline and the ride recorded on it
    pub fn from_plan(plan: &TripPlan) -> Self {
        let mut gpx = Self::empty();
        gpx.plan(plan);

        if !plan.ride_route_points.is_empty() {
            let track = gpx.ride(&plan.name, &plan.ride_route_points);
            track.description = plan
                .time_start
                .map(|start| format!("Ridden from {}", start));
        }

        gpx
    }

    /// Add the planned waypoints and polyline
    pub fn plan(&mut self, plan: &TripPlan) -> &mut Self {
        for wp in &plan.way_points {
            let mut gwp = Waypoint::new(wp.location);
            if !wp.name.is_empty() {
                gwp.name = Some(wp.name.clone());
            }
            self.waypoints.push(gwp);
        }

        let mut route = Route::default();
        route.name = Some(plan.name.clone());
        route.points = plan
            .plan_route_points()
            .into_iter()
            .map(Waypoint::new)
            .collect();
        if !route.points.is_empty() {
            self.routes.push(route);
        }

        self
    }

    /// Add the ridden points as a track, returning it for further details
    pub fn ride(&mut self, name: &str, points: &[Point]) -> &mut Track {
        let mut segment = TrackSegment::new();
        segment.points = points.iter().copied().map(Waypoint::new).collect();

        let mut track = Track::new();
        track.name = Some(name.to_string());
        track.source = Some("touring".to_string());
        track.segments.push(segment);

        self.tracks.push(track);
        let last = self.tracks.len() - 1;
        &mut self.tracks[last]
    }

    pub fn generate(self) -> Gpx {
        let mut gpx: Gpx = Default::default();
        gpx.version = GpxVersion::Gpx11;
        gpx.creator = Some("touring".to_string());
        gpx.waypoints = self.waypoints;
        gpx.routes = self.routes;
        gpx.tracks = self.tracks;

        gpx
    }

    pub fn write<W: Write>(self, writer: W) -> Result<()> {
        ::gpx::write(&self.generate(), writer).map_err(|e| TouringError::Gpx(e.to_string()))
    }
}
