//! Trip plans, their storage and GPX export

pub mod gpx;
pub mod repository;
pub mod trip_plan;

pub use self::gpx::RideGpx;
pub use repository::{TripRepository, FILE_EXT};
pub use trip_plan::{TripPlan, TripWaypoint};
