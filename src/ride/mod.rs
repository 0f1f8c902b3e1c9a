//! Ride tracking

pub mod position;
pub mod readout;
pub mod session;
pub mod state;
pub mod tracker;


pub use position::{Position, RawPosition};
pub use readout::{RideReadout, ETA_PLACEHOLDER};
pub use session::{
    IntervalTicker, LatestPosition, RideDisplay, RideSession, ScriptedTicks, SnapshotCell,
    TickSource,
};
pub use state::{Eta, RideState, RideStatus, ETA_HORIZON};
pub use tracker::RideTracker;
