use hoops_ui_core::services::ExplodeService;
use hoops_ui_core::{ServiceRegistry, ServiceResult, Subscription, names};
use std::rc::Rc;

use crate::update::UpdateRequest;

/// What the explode panel shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplodeView {
    /// Controls are disabled while no viewer is bound.
    pub connected: bool,
    pub magnitude: f64,
    pub active: bool,
}

/// Explode slider and start/stop switch.
pub struct ExplodePanel {
    service: Rc<ExplodeService>,
    update: UpdateRequest,
    _events: Subscription,
}

impl ExplodePanel {
    pub fn new(registry: &ServiceRegistry) -> ServiceResult<Self> {
        let service = registry.get::<ExplodeService>(names::EXPLODE)?;
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

    pub fn view(&self) -> ExplodeView {
        ExplodeView {
            connected: self.service.manager().is_some(),
            magnitude: self.service.magnitude(),
            active: self.service.is_active(),
        }
    }

    pub async fn set_magnitude(&self, magnitude: f64) -> ServiceResult<()> {
        self.service.set_magnitude(magnitude).await
    }

    /// Start or stop the explode.
    pub async fn toggle(&self) -> ServiceResult<()> {
        self.service.set_active(!self.service.is_active()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoops_ui_core::{MemoryViewer, ServiceError};
    use pollster::block_on;

    fn setup() -> (MemoryViewer, ServiceRegistry) {
        let viewer = MemoryViewer::new();
        let mut registry = ServiceRegistry::new();
        registry
            .register(Rc::new(ExplodeService::with_manager(viewer.explode.clone())))
            .unwrap();
        (viewer, registry)
    }

    #[test]
    fn test_missing_service() {
        let registry = ServiceRegistry::new();
        assert!(matches!(
            ExplodePanel::new(&registry),
            Err(ServiceError::NotRegistered(_))
        ));
    }

    #[test]
    fn test_actions_go_through_service() {
        let (viewer, registry) = setup();
        let panel = ExplodePanel::new(&registry).unwrap();

        block_on(panel.set_magnitude(2.0)).unwrap();
        block_on(panel.toggle()).unwrap();

        assert!(panel.update().take());
        assert_eq!(
            panel.view(),
            ExplodeView { connected: true, magnitude: 2.0, active: true }
        );
        assert_eq!(viewer.explode.log().calls(), vec!["set_magnitude(2)", "start()"]);
    }

    #[test]
    fn test_viewer_change_requests_update() {
        let (viewer, registry) = setup();
        let panel = ExplodePanel::new(&registry).unwrap();

        viewer.explode.simulate_magnitude(0.5);

        assert!(panel.update().take());
        assert_eq!(panel.view().magnitude, 0.5);
    }
}
