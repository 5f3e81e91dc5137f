//! Measurement service: lists and removes the measurements a user placed in
//! the viewer. Has no configuration of its own.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::rc::Rc;
use uuid::Uuid;

use crate::error::{ManagerResult, ServiceError, ServiceResult};
use crate::event::{EventEmitter, ServiceEvent, Subscription};
use crate::service::{BoxFuture, ManagerSlot, Service, names};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasurementKind {
    PointToPoint,
    EdgeLength,
    FaceToFace,
    Angle,
}

/// One placed measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: Uuid,
    pub kind: MeasurementKind,
    /// Model units, or degrees for angles.
    pub value: f64,
}

pub trait MeasurementManager {
    fn measurements(&self) -> Vec<Measurement>;
    fn remove(&self, id: Uuid) -> BoxFuture<'_, ManagerResult<()>>;
    fn remove_all(&self) -> BoxFuture<'_, ManagerResult<()>>;
    fn subscribe(&self, listener: Box<dyn Fn(&MeasurementSignal)>) -> Subscription;
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementSignal {
    Created(Measurement),
    Removed(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementEvent {
    ManagerReset,
    MeasurementCreated(Measurement),
    MeasurementRemoved(Uuid),
    AllRemoved,
}

impl ServiceEvent for MeasurementEvent {
    fn name(&self) -> &'static str {
        match self {
            MeasurementEvent::ManagerReset => "hoops-measurement-manager-reset",
            MeasurementEvent::MeasurementCreated(_) => "hoops-measurement-created",
            MeasurementEvent::MeasurementRemoved(_) => "hoops-measurement-removed",
            MeasurementEvent::AllRemoved => "hoops-measurement-all-removed",
        }
    }

    fn detail(&self) -> Value {
        match self {
            MeasurementEvent::ManagerReset | MeasurementEvent::AllRemoved => Value::Null,
            MeasurementEvent::MeasurementCreated(measurement) => json!(measurement),
            MeasurementEvent::MeasurementRemoved(id) => json!(id),
        }
    }
}

pub struct MeasurementService {
    manager: ManagerSlot<dyn MeasurementManager>,
    events: EventEmitter<MeasurementEvent>,
}

impl MeasurementService {
    pub fn new() -> Self {
        Self {
            manager: ManagerSlot::new(names::MEASUREMENT, "measure"),
            events: EventEmitter::new(),
        }
    }

    pub fn with_manager(manager: Rc<dyn MeasurementManager>) -> Self {
        let service = Self::new();
        service.set_manager(manager);
        service
    }

    pub fn set_manager(&self, manager: Rc<dyn MeasurementManager>) {
        self.rebind(Some(manager));
    }

    pub fn clear_manager(&self) {
        self.rebind(None);
    }

    fn rebind(&self, manager: Option<Rc<dyn MeasurementManager>>) {
        let events = self.events.clone();
        let changed = self.manager.replace(manager, |manager| {
            Some(manager.subscribe(Box::new(move |signal: &MeasurementSignal| {
                let event = match signal {
                    MeasurementSignal::Created(measurement) => {
                        MeasurementEvent::MeasurementCreated(measurement.clone())
                    }
                    MeasurementSignal::Removed(id) => MeasurementEvent::MeasurementRemoved(*id),
                };
                events.emit(&event);
            })))
        });
        if changed {
            self.events.emit(&MeasurementEvent::ManagerReset);
        }
    }

    pub fn manager(&self) -> Option<Rc<dyn MeasurementManager>> {
        self.manager.get()
    }

    pub fn events(&self) -> &EventEmitter<MeasurementEvent> {
        &self.events
    }

    pub fn subscribe(&self, listener: impl Fn(&MeasurementEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    /// Placed measurements, oldest first. Empty without a manager.
    pub fn measurements(&self) -> Vec<Measurement> {
        self.manager
            .get()
            .map(|manager| manager.measurements())
            .unwrap_or_default()
    }

    pub async fn remove_measurement(&self, id: Uuid) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if !manager.measurements().iter().any(|m| m.id == id) {
            return Err(ServiceError::InvalidArgument(format!("unknown measurement {id}")));
        }
        manager.remove(id).await?;
        log::debug!("Removed measurement {}", id);
        self.events.emit(&MeasurementEvent::MeasurementRemoved(id));
        Ok(())
    }

    /// Remove every measurement. No-op when there are none.
    pub async fn remove_all(&self) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.measurements().is_empty() {
            return Ok(());
        }
        manager.remove_all().await?;
        self.events.emit(&MeasurementEvent::AllRemoved);
        Ok(())
    }
}

impl Default for MeasurementService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for MeasurementService {
    fn service_name(&self) -> &str {
        names::MEASUREMENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;
    use crate::memory::MemoryMeasurementManager;
    use pollster::block_on;

    fn bound() -> (Rc<MemoryMeasurementManager>, MeasurementService) {
        let manager = Rc::new(MemoryMeasurementManager::new());
        let service = MeasurementService::with_manager(manager.clone());
        (manager, service)
    }

    #[test]
    fn test_created_measurements_forwarded() {
        let (manager, service) = bound();
        let log = EventLog::attach(service.events());

        let measurement = manager.simulate_measure(MeasurementKind::Angle, 90.0);

        assert_eq!(service.measurements(), vec![measurement.clone()]);
        assert_eq!(log.names(), vec!["hoops-measurement-created"]);
        assert_eq!(log.events()[0].detail()["kind"], json!("angle"));
    }

    #[test]
    fn test_remove_measurement() {
        let (manager, service) = bound();
        let first = manager.simulate_measure(MeasurementKind::EdgeLength, 12.0);
        let second = manager.simulate_measure(MeasurementKind::FaceToFace, 3.0);
        let log = EventLog::attach(service.events());

        block_on(service.remove_measurement(first.id)).unwrap();

        assert_eq!(service.measurements(), vec![second]);
        assert_eq!(log.events(), vec![MeasurementEvent::MeasurementRemoved(first.id)]);
        assert!(matches!(
            block_on(service.remove_measurement(first.id)),
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_remove_all() {
        let (manager, service) = bound();
        block_on(service.remove_all()).unwrap();
        assert!(manager.log().is_empty());

        manager.simulate_measure(MeasurementKind::PointToPoint, 1.0);
        manager.simulate_measure(MeasurementKind::PointToPoint, 2.0);
        let log = EventLog::attach(service.events());
        block_on(service.remove_all()).unwrap();

        assert!(service.measurements().is_empty());
        assert_eq!(manager.log().calls(), vec!["remove_all()".to_string()]);
        assert_eq!(log.events(), vec![MeasurementEvent::AllRemoved]);
    }

    #[test]
    fn test_not_resettable() {
        let service = MeasurementService::new();
        assert!(service.as_resettable().is_none());
        assert!(service.measurements().is_empty());
        assert!(matches!(
            block_on(service.remove_all()),
            Err(ServiceError::NotInitialized { .. })
        ));
    }
}
