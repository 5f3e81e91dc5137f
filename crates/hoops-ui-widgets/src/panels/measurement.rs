use hoops_ui_core::services::{Measurement, MeasurementService};
use hoops_ui_core::{ServiceRegistry, ServiceResult, Subscription, names};
use std::rc::Rc;
use uuid::Uuid;

use crate::update::UpdateRequest;

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementView {
    pub measurements: Vec<Measurement>,
    /// "Delete all" is offered only when there is something to delete.
    pub can_remove_all: bool,
}

/// List of placed measurements.
pub struct MeasurementPanel {
    service: Rc<MeasurementService>,
    update: UpdateRequest,
    _events: Subscription,
}

impl MeasurementPanel {
    pub fn new(registry: &ServiceRegistry) -> ServiceResult<Self> {
        let service = registry.get::<MeasurementService>(names::MEASUREMENT)?;
        let update = UpdateRequest::new();
        let events = update.watch(service.events(), |_| true);
        Ok(Self {
            service,
            update,
            _events: events,
        })
    }

    pub fn update(&self) -> &UpdateRequest {
        &self.update
    }

    pub fn view(&self) -> MeasurementView {
        let measurements = self.service.measurements();
        MeasurementView {
            can_remove_all: !measurements.is_empty(),
            measurements,
        }
    }

    pub async fn remove(&self, id: Uuid) -> ServiceResult<()> {
        self.service.remove_measurement(id).await
    }

    pub async fn remove_all(&self) -> ServiceResult<()> {
        self.service.remove_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoops_ui_core::MemoryViewer;
    use hoops_ui_core::services::MeasurementKind;
    use pollster::block_on;

    fn setup() -> (MemoryViewer, ServiceRegistry) {
        let viewer = MemoryViewer::new();
        let mut registry = ServiceRegistry::new();
        registry
            .register(Rc::new(MeasurementService::with_manager(viewer.measurement.clone())))
            .unwrap();
        (viewer, registry)
    }

    #[test]
    fn test_lists_measurements_placed_in_viewer() {
        let (viewer, registry) = setup();
        let panel = MeasurementPanel::new(&registry).unwrap();
        assert!(!panel.view().can_remove_all);

        let placed = viewer.measurement.simulate_measure(MeasurementKind::EdgeLength, 7.5);

        assert!(panel.update().take());
        let view = panel.view();
        assert_eq!(view.measurements, vec![placed]);
        assert!(view.can_remove_all);
    }

    #[test]
    fn test_remove_actions() {
        let (viewer, registry) = setup();
        let panel = MeasurementPanel::new(&registry).unwrap();
        let first = viewer.measurement.simulate_measure(MeasurementKind::Angle, 45.0);
        viewer.measurement.simulate_measure(MeasurementKind::Angle, 30.0);
        panel.update().take();

        block_on(panel.remove(first.id)).unwrap();
        assert_eq!(panel.view().measurements.len(), 1);

        block_on(panel.remove_all()).unwrap();
        assert!(panel.view().measurements.is_empty());
        assert_eq!(panel.update().count(), 2);
    }
}
