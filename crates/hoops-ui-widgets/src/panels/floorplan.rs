use hoops_ui_core::services::{
    FloorplanConfiguration, FloorplanOrientation, FloorplanService,
};
use hoops_ui_core::{
    ResettableConfigurationService, ServiceRegistry, ServiceResult, Subscription, names,
};
use std::rc::Rc;

use crate::update::UpdateRequest;

#[derive(Debug, Clone, PartialEq)]
pub struct FloorplanView {
    pub connected: bool,
    pub active: bool,
    pub settings: FloorplanConfiguration,
}

/// Floorplan on/off switch and its most used settings.
pub struct FloorplanPanel {
    service: Rc<FloorplanService>,
    update: UpdateRequest,
    _events: Subscription,
}

impl FloorplanPanel {
    pub fn new(registry: &ServiceRegistry) -> ServiceResult<Self> {
        let service = registry.get::<FloorplanService>(names::FLOORPLAN)?;
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

    pub fn view(&self) -> FloorplanView {
        FloorplanView {
            connected: self.service.manager().is_some(),
            active: self.service.is_active(),
            settings: self.service.configuration(),
        }
    }

    pub async fn toggle(&self) -> ServiceResult<()> {
        self.service.set_active(!self.service.is_active()).await
    }

    /// Switch between north-up and avatar-up.
    pub async fn toggle_orientation(&self) -> ServiceResult<()> {
        let next = match self.service.orientation() {
            FloorplanOrientation::NorthUp => FloorplanOrientation::AvatarUp,
            FloorplanOrientation::AvatarUp => FloorplanOrientation::NorthUp,
        };
        self.service.set_orientation(next).await
    }

    pub async fn set_track_camera(&self, track: bool) -> ServiceResult<()> {
        self.service.set_track_camera(track).await
    }

    pub async fn set_zoom_level(&self, zoom: f64) -> ServiceResult<()> {
        self.service.set_zoom_level(zoom).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoops_ui_core::MemoryViewer;
    use pollster::block_on;

    fn setup() -> (MemoryViewer, ServiceRegistry) {
        let viewer = MemoryViewer::new();
        let mut registry = ServiceRegistry::new();
        registry
            .register(Rc::new(FloorplanService::with_manager(viewer.floorplan.clone())))
            .unwrap();
        (viewer, registry)
    }

    #[test]
    fn test_toggle_and_orientation() {
        let (_viewer, registry) = setup();
        let panel = FloorplanPanel::new(&registry).unwrap();

        block_on(panel.toggle()).unwrap();
        block_on(panel.toggle_orientation()).unwrap();

        let view = panel.view();
        assert!(view.active);
        assert_eq!(view.settings.orientation, FloorplanOrientation::AvatarUp);
        assert_eq!(panel.update().count(), 2);
    }

    #[test]
    fn test_invalid_zoom_keeps_view() {
        let (viewer, registry) = setup();
        let panel = FloorplanPanel::new(&registry).unwrap();

        assert!(block_on(panel.set_zoom_level(0.0)).is_err());
        assert!(!panel.update().is_requested());
        assert!(viewer.floorplan.log().is_empty());
    }

    #[test]
    fn test_auto_activation_requests_update() {
        let (viewer, registry) = setup();
        let panel = FloorplanPanel::new(&registry).unwrap();

        viewer.floorplan.simulate_auto_activation(true);

        assert!(panel.update().take());
        assert!(panel.view().active);
    }
}
