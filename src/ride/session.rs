//! Live ride session
//!
//! The location provider pushes samples into a single-slot mailbox, a ride
//! thread polls it once per tick and publishes a whole new snapshot of the
//! ride state. The weather thread only writes its own slot, which is merged
//! into the next published snapshot.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use time::OffsetDateTime;

use super::position::RawPosition;
use super::state::RideState;
use super::tracker::RideTracker;
use crate::weather::{Weather, WeatherSource};

/// Latest known position, newer samples overwrite older ones
#[derive(Clone, Default)]
pub struct LatestPosition {
    slot: Arc<Mutex<Option<RawPosition>>>,
}

impl LatestPosition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, position: RawPosition) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(position);
    }

    pub fn latest(&self) -> Option<RawPosition> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Published ride state, replaced as a whole on every publication
#[derive(Clone, Default)]
pub struct SnapshotCell {
    current: Arc<RwLock<Arc<RideState>>>,
}

impl SnapshotCell {
    pub fn new(state: RideState) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(state))),
        }
    }

    pub fn load(&self) -> Arc<RideState> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn publish(&self, state: Arc<RideState>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

/// Periodic tick source driving a session worker
pub trait TickSource: Send + 'static {
    /// Block until the next tick, returning its time
    ///
    /// `None` ends the worker. Sources must return `None` as soon as
    /// `stop` yields a message or is disconnected.
    fn next_tick(&mut self, stop: &Receiver<()>) -> Option<OffsetDateTime>;
}

/// Wall clock ticks at a fixed interval
pub struct IntervalTicker {
    interval: std::time::Duration,
}

impl IntervalTicker {
    pub fn new(interval: std::time::Duration) -> Self {
        Self { interval }
    }
}

impl TickSource for IntervalTicker {
    fn next_tick(&mut self, stop: &Receiver<()>) -> Option<OffsetDateTime> {
        match stop.recv_timeout(self.interval) {
            Err(RecvTimeoutError::Timeout) => Some(OffsetDateTime::now_utc()),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Predefined tick times, mostly for simulations
pub struct ScriptedTicks {
    ticks: std::vec::IntoIter<OffsetDateTime>,
}

impl ScriptedTicks {
    pub fn new(ticks: Vec<OffsetDateTime>) -> Self {
        Self {
            ticks: ticks.into_iter(),
        }
    }
}

impl TickSource for ScriptedTicks {
    fn next_tick(&mut self, stop: &Receiver<()>) -> Option<OffsetDateTime> {
        match stop.try_recv() {
            Err(TryRecvError::Empty) => self.ticks.next(),
            Ok(()) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// Receives every published ride state
pub trait RideDisplay: Send + 'static {
    fn show(&mut self, state: &RideState);
}

impl<F> RideDisplay for F
where
    F: FnMut(&RideState) + Send + 'static,
{
    fn show(&mut self, state: &RideState) {
        self(state)
    }
}

struct Worker<T> {
    stop: Sender<()>,
    handle: JoinHandle<T>,
}

impl<T> Worker<T> {
    fn spawn<F>(name: &str, body: F) -> std::io::Result<Self>
    where
        F: FnOnce(Receiver<()>) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (stop, stop_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || body(stop_rx))?;

        Ok(Self { stop, handle })
    }

    fn stop(self) -> thread::Result<T> {
        // the worker may be gone already
        let _ = self.stop.send(());
        self.handle.join()
    }
}

/// Running ride: tick loop plus the optional weather overlay
pub struct RideSession {
    snapshot: SnapshotCell,
    weather: Arc<Mutex<Option<Weather>>>,
    ride: Option<Worker<RideTracker>>,
    weather_worker: Option<Worker<()>>,
}

impl RideSession {
    /// Start the ride loop on the wall clock, at the tracker's tick interval
    pub fn start<D>(
        tracker: RideTracker,
        mailbox: LatestPosition,
        display: D,
    ) -> std::io::Result<Self>
    where
        D: RideDisplay,
    {
        let ticks = IntervalTicker::new(tracker.config().tick_interval());
        Self::spawn(tracker, mailbox, ticks, display)
    }

    /// Start the ride loop, polling `mailbox` once per tick of `ticks`
    pub fn spawn<T, D>(
        tracker: RideTracker,
        mailbox: LatestPosition,
        mut ticks: T,
        mut display: D,
    ) -> std::io::Result<Self>
    where
        T: TickSource,
        D: RideDisplay,
    {
        let snapshot = SnapshotCell::new(tracker.state().clone());
        let weather: Arc<Mutex<Option<Weather>>> = Arc::default();

        let published = snapshot.clone();
        let overlay = weather.clone();
        let ride = Worker::spawn("ride-tick", move |stop| {
            let mut tracker = tracker;
            while let Some(now) = ticks.next_tick(&stop) {
                let sample = mailbox.latest();
                let changed = tracker.tick(sample.as_ref(), now);
                let weather = overlay.lock().unwrap_or_else(PoisonError::into_inner).clone();

                if changed || published.load().weather != weather {
                    let mut state = tracker.state().clone();
                    state.weather = weather;
                    let state = Arc::new(state);
                    published.publish(state.clone());
                    display.show(&state);
                }
            }
            debug!("Ride loop finished");
            tracker
        })?;
        info!("Ride session started");

        Ok(Self {
            snapshot,
            weather,
            ride: Some(ride),
            weather_worker: None,
        })
    }

    /// Fetch the weather at the latest position once per tick of `ticks`
    ///
    /// Fetch failures are logged and the previous conditions are kept.
    pub fn attach_weather<W, T>(
        &mut self,
        mut source: W,
        mailbox: LatestPosition,
        mut ticks: T,
    ) -> std::io::Result<()>
    where
        W: WeatherSource + 'static,
        T: TickSource,
    {
        let slot = self.weather.clone();
        let worker = Worker::spawn("ride-weather", move |stop| {
            while ticks.next_tick(&stop).is_some() {
                let Some(position) = mailbox.latest() else {
                    continue;
                };
                match source.fetch(position.coordinates) {
                    Ok(weather) => {
                        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(weather);
                    }
                    Err(e) => warn!("Weather fetch failed: {}", e),
                }
            }
        })?;

        if let Some(previous) = self.weather_worker.replace(worker) {
            if previous.stop().is_err() {
                warn!("Replaced weather worker panicked");
            }
        }

        Ok(())
    }

    /// Latest published ride state
    pub fn snapshot(&self) -> Arc<RideState> {
        self.snapshot.load()
    }

    /// Stop all the workers and hand back the tracker with the final state
    ///
    /// Nothing is published once this returns. `None` when the ride worker panicked.
    pub fn stop(mut self) -> Option<RideTracker> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<RideTracker> {
        if let Some(worker) = self.weather_worker.take() {
            if worker.stop().is_err() {
                warn!("Weather worker panicked");
            }
        }

        let ride = self.ride.take()?;
        match ride.stop() {
            Ok(tracker) => {
                info!("Ride session stopped");
                Some(tracker)
            }
            Err(_) => {
                warn!("Ride worker panicked");
                None
            }
        }
    }
}

impl Drop for RideSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
