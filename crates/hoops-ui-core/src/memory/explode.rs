use std::cell::Cell;

use super::CallLog;
use crate::error::ManagerResult;
use crate::event::{EventEmitter, Subscription};
use crate::service::BoxFuture;
use crate::services::explode::{ExplodeManager, ExplodeSignal};

/// In-memory explode manager.
#[derive(Default)]
pub struct MemoryExplodeManager {
    magnitude: Cell<f64>,
    active: Cell<bool>,
    signals: EventEmitter<ExplodeSignal>,
    log: CallLog,
}

impl MemoryExplodeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// The viewer changed the magnitude on its own.
    pub fn simulate_magnitude(&self, magnitude: f64) {
        self.magnitude.set(magnitude);
        self.signals.emit(&ExplodeSignal::MagnitudeChanged(magnitude));
    }
}

impl ExplodeManager for MemoryExplodeManager {
    fn magnitude(&self) -> f64 {
        self.magnitude.get()
    }

    fn set_magnitude(&self, magnitude: f64) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_magnitude", magnitude)?;
            self.magnitude.set(magnitude);
            Ok(())
        })
    }

    fn is_active(&self) -> bool {
        self.active.get()
    }

    fn start(&self) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("start", "")?;
            self.active.set(true);
            Ok(())
        })
    }

    fn stop(&self) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("stop", "")?;
            self.active.set(false);
            Ok(())
        })
    }

    fn subscribe(&self, listener: Box<dyn Fn(&ExplodeSignal)>) -> Subscription {
        self.signals.subscribe(listener)
    }
}
