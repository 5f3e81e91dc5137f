use std::cell::Cell;

use super::CallLog;
use crate::error::ManagerResult;
use crate::event::{EventEmitter, Subscription};
use crate::service::BoxFuture;
use crate::services::camera::{
    CameraConfiguration, CameraManager, CameraSignal, OrbitFallback, Projection,
};

/// In-memory camera. View operations are only recorded.
pub struct MemoryCameraManager {
    projection: Cell<Projection>,
    orbit_fallback: Cell<OrbitFallback>,
    transition_duration: Cell<f64>,
    signals: EventEmitter<CameraSignal>,
    log: CallLog,
}

impl MemoryCameraManager {
    pub fn new() -> Self {
        let defaults = CameraConfiguration::default();
        Self {
            projection: Cell::new(defaults.projection),
            orbit_fallback: Cell::new(defaults.orbit_fallback),
            transition_duration: Cell::new(defaults.transition_duration),
            signals: EventEmitter::new(),
            log: CallLog::new(),
        }
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// The projection was switched from inside the viewer.
    pub fn simulate_projection(&self, projection: Projection) {
        self.projection.set(projection);
        self.signals.emit(&CameraSignal::ProjectionChanged(projection));
    }
}

impl Default for MemoryCameraManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraManager for MemoryCameraManager {
    fn projection(&self) -> Projection {
        self.projection.get()
    }

    fn set_projection(&self, projection: Projection) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_projection", projection)?;
            self.projection.set(projection);
            Ok(())
        })
    }

    fn orbit_fallback(&self) -> OrbitFallback {
        self.orbit_fallback.get()
    }

    fn set_orbit_fallback(&self, fallback: OrbitFallback) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_orbit_fallback", fallback)?;
            self.orbit_fallback.set(fallback);
            Ok(())
        })
    }

    fn transition_duration(&self) -> f64 {
        self.transition_duration.get()
    }

    fn set_transition_duration(&self, duration: f64) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_transition_duration", duration)?;
            self.transition_duration.set(duration);
            Ok(())
        })
    }

    fn fit_world(&self, duration: f64) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move { self.log.record("fit_world", duration) })
    }

    fn reset(&self, duration: f64) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move { self.log.record("reset", duration) })
    }

    fn subscribe(&self, listener: Box<dyn Fn(&CameraSignal)>) -> Subscription {
        self.signals.subscribe(listener)
    }
}
