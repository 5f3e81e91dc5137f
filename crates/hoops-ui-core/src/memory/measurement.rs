use std::cell::RefCell;
use uuid::Uuid;

use super::CallLog;
use crate::error::{ManagerError, ManagerResult};
use crate::event::{EventEmitter, Subscription};
use crate::service::BoxFuture;
use crate::services::measurement::{
    Measurement, MeasurementKind, MeasurementManager, MeasurementSignal,
};

/// In-memory measure manager.
#[derive(Default)]
pub struct MemoryMeasurementManager {
    measurements: RefCell<Vec<Measurement>>,
    signals: EventEmitter<MeasurementSignal>,
    log: CallLog,
}

impl MemoryMeasurementManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// The user placed a measurement in the viewer.
    pub fn simulate_measure(&self, kind: MeasurementKind, value: f64) -> Measurement {
        let measurement = Measurement {
            id: Uuid::new_v4(),
            kind,
            value,
        };
        self.measurements.borrow_mut().push(measurement.clone());
        self.signals
            .emit(&MeasurementSignal::Created(measurement.clone()));
        measurement
    }
}

impl MeasurementManager for MemoryMeasurementManager {
    fn measurements(&self) -> Vec<Measurement> {
        self.measurements.borrow().clone()
    }

    fn remove(&self, id: Uuid) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("remove", id)?;
            let mut measurements = self.measurements.borrow_mut();
            let before = measurements.len();
            measurements.retain(|m| m.id != id);
            if measurements.len() == before {
                return Err(ManagerError::NotFound(format!("measurement {id}")));
            }
            Ok(())
        })
    }

    fn remove_all(&self) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("remove_all", "")?;
            self.measurements.borrow_mut().clear();
            Ok(())
        })
    }

    fn subscribe(&self, listener: Box<dyn Fn(&MeasurementSignal)>) -> Subscription {
        self.signals.subscribe(listener)
    }
}
