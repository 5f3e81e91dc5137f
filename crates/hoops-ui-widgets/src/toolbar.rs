//! Toolbar toggle buttons.
//!
//! A button is bound to one [`ToolbarAction`]. It resolves the service the
//! action needs when created, reports whether it is pressed from the service's
//! live state, and raises its [`UpdateRequest`] whenever that state may have
//! changed.

use hoops_ui_core::services::{
    CameraEvent, CameraService, CuttingEvent, CuttingService, DrawMode, ExplodeEvent,
    ExplodeService, FloorplanEvent, FloorplanService, Projection, RenderOptionsEvent,
    RenderOptionsService,
};
use hoops_ui_core::{ServiceRegistry, ServiceResult, Subscription, names};
use std::rc::Rc;

use crate::update::UpdateRequest;

/// What a toolbar button toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Explode,
    Floorplan,
    CuttingSection(usize),
    /// Pressed while the camera is in perspective.
    Projection,
    /// Pressed while the view uses this draw mode.
    DrawMode(DrawMode),
}

impl ToolbarAction {
    pub fn label(&self) -> String {
        match self {
            ToolbarAction::Explode => "Explode".to_string(),
            ToolbarAction::Floorplan => "Floorplan".to_string(),
            ToolbarAction::CuttingSection(section) => format!("Cutting section {}", section + 1),
            ToolbarAction::Projection => "Perspective".to_string(),
            ToolbarAction::DrawMode(mode) => mode.to_string(),
        }
    }
}

enum Target {
    Explode(Rc<ExplodeService>),
    Floorplan(Rc<FloorplanService>),
    CuttingSection(Rc<CuttingService>, usize),
    Projection(Rc<CameraService>),
    DrawMode(Rc<RenderOptionsService>, DrawMode),
}

pub struct ToolbarButton {
    action: ToolbarAction,
    target: Target,
    update: UpdateRequest,
    _events: Subscription,
}

impl ToolbarButton {
    pub fn new(registry: &ServiceRegistry, action: ToolbarAction) -> ServiceResult<Self> {
        let update = UpdateRequest::new();
        let (target, events) = match action {
            ToolbarAction::Explode => {
                let service = registry.get::<ExplodeService>(names::EXPLODE)?;
                let events = update.watch(service.events(), |event| {
                    matches!(event, ExplodeEvent::ActiveChanged(_) | ExplodeEvent::ManagerReset)
                });
                (Target::Explode(service), events)
            }
            ToolbarAction::Floorplan => {
                let service = registry.get::<FloorplanService>(names::FLOORPLAN)?;
                let events = update.watch(service.events(), |event| {
                    matches!(
                        event,
                        FloorplanEvent::ActiveChanged(_) | FloorplanEvent::ManagerReset
                    )
                });
                (Target::Floorplan(service), events)
            }
            ToolbarAction::CuttingSection(section) => {
                let service = registry.get::<CuttingService>(names::CUTTING)?;
                let events = update.watch(service.events(), move |event| match event {
                    CuttingEvent::SectionActiveChanged { section: changed, .. } => {
                        *changed == section
                    }
                    CuttingEvent::ManagerReset => true,
                    _ => false,
                });
                (Target::CuttingSection(service, section), events)
            }
            ToolbarAction::Projection => {
                let service = registry.get::<CameraService>(names::CAMERA)?;
                let events = update.watch(service.events(), |event| {
                    matches!(event, CameraEvent::ProjectionChanged(_) | CameraEvent::ManagerReset)
                });
                (Target::Projection(service), events)
            }
            ToolbarAction::DrawMode(mode) => {
                let service = registry.get::<RenderOptionsService>(names::RENDER_OPTIONS)?;
                let events = update.watch(service.events(), |event| {
                    matches!(
                        event,
                        RenderOptionsEvent::DrawModeChanged(_) | RenderOptionsEvent::ManagerReset
                    )
                });
                (Target::DrawMode(service, mode), events)
            }
        };

        Ok(Self {
            action,
            target,
            update,
            _events: events,
        })
    }

    pub fn action(&self) -> ToolbarAction {
        self.action
    }

    pub fn update(&self) -> &UpdateRequest {
        &self.update
    }

    pub fn is_pressed(&self) -> bool {
        match &self.target {
            Target::Explode(service) => service.is_active(),
            Target::Floorplan(service) => service.is_active(),
            Target::CuttingSection(service, section) => service.is_section_active(*section),
            Target::Projection(service) => service.projection() == Projection::Perspective,
            Target::DrawMode(service, mode) => service.draw_mode() == *mode,
        }
    }

    /// Toggle the action.
    ///
    /// A draw mode button that is already pressed stays pressed; draw modes
    /// are exclusive and one of them is always selected.
    pub async fn click(&self) -> ServiceResult<()> {
        let pressed = self.is_pressed();
        log::debug!("Toolbar button {} clicked", self.action.label());
        match &self.target {
            Target::Explode(service) => service.set_active(!pressed).await,
            Target::Floorplan(service) => service.set_active(!pressed).await,
            Target::CuttingSection(service, section) => {
                service.set_section_active(*section, !pressed).await
            }
            Target::Projection(service) => {
                service.set_projection(service.projection().toggled()).await
            }
            Target::DrawMode(service, mode) => service.set_draw_mode(*mode).await,
        }
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
        registry
            .register(Rc::new(FloorplanService::with_manager(viewer.floorplan.clone())))
            .unwrap();
        registry
            .register(Rc::new(CuttingService::with_manager(viewer.cutting.clone())))
            .unwrap();
        registry
            .register(Rc::new(CameraService::with_manager(viewer.camera.clone())))
            .unwrap();
        registry
            .register(Rc::new(RenderOptionsService::with_manager(
                viewer.render_options.clone(),
            )))
            .unwrap();
        (viewer, registry)
    }

    #[test]
    fn test_toggle_buttons() {
        let (_viewer, registry) = setup();
        for action in [
            ToolbarAction::Explode,
            ToolbarAction::Floorplan,
            ToolbarAction::CuttingSection(1),
            ToolbarAction::Projection,
        ] {
            let button = ToolbarButton::new(&registry, action).unwrap();
            assert!(!button.is_pressed(), "{action:?}");

            block_on(button.click()).unwrap();
            assert!(button.is_pressed(), "{action:?}");
            assert!(button.update().take(), "{action:?}");

            block_on(button.click()).unwrap();
            assert!(!button.is_pressed(), "{action:?}");
        }
    }

    #[test]
    fn test_draw_mode_buttons_are_exclusive() {
        let (_viewer, registry) = setup();
        let button = |mode| ToolbarButton::new(&registry, ToolbarAction::DrawMode(mode)).unwrap();
        let shaded = button(DrawMode::Shaded);
        let xray = button(DrawMode::XRay);

        block_on(xray.click()).unwrap();
        assert!(xray.is_pressed());
        assert!(!shaded.is_pressed());
        assert!(shaded.update().take());

        block_on(xray.click()).unwrap();
        assert!(xray.is_pressed());
    }

    #[test]
    fn test_section_button_ignores_other_sections() {
        let (viewer, registry) = setup();
        let button = ToolbarButton::new(&registry, ToolbarAction::CuttingSection(0)).unwrap();

        viewer.cutting.simulate_section_active(2, true);
        assert!(!button.update().is_requested());

        viewer.cutting.simulate_section_active(0, true);
        assert!(button.update().take());
        assert!(button.is_pressed());
    }

    #[test]
    fn test_cleared_registry() {
        let (_viewer, mut registry) = setup();
        registry.clear();
        assert!(matches!(
            ToolbarButton::new(&registry, ToolbarAction::Projection),
            Err(ServiceError::NotRegistered(_))
        ));
    }

    #[test]
    fn test_labels() {
        assert_eq!(ToolbarAction::CuttingSection(0).label(), "Cutting section 1");
        assert_eq!(ToolbarAction::DrawMode(DrawMode::HiddenLine).label(), "Hidden Line");
    }
}
