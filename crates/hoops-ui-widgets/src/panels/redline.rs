use hoops_ui_core::services::{RedlineService, RedlineView};
use hoops_ui_core::{Rgb, ServiceRegistry, ServiceResult, Subscription, names};
use std::rc::Rc;
use uuid::Uuid;

use crate::update::UpdateRequest;

#[derive(Debug, Clone, PartialEq)]
pub struct RedlinePanelView {
    pub views: Vec<RedlineView>,
    pub active_view: Option<Uuid>,
    pub color: Rgb,
    pub line_width: f64,
}

/// Markup views and pen settings.
pub struct RedlinePanel {
    service: Rc<RedlineService>,
    update: UpdateRequest,
    _events: Subscription,
}

impl RedlinePanel {
    pub fn new(registry: &ServiceRegistry) -> ServiceResult<Self> {
        let service = registry.get::<RedlineService>(names::REDLINE)?;
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

    pub fn view(&self) -> RedlinePanelView {
        RedlinePanelView {
            views: self.service.views(),
            active_view: self.service.active_view(),
            color: self.service.color(),
            line_width: self.service.line_width(),
        }
    }

    /// Create a view and make it the active one.
    pub async fn create_view(&self, name: &str) -> ServiceResult<RedlineView> {
        let view = self.service.create_view(name).await?;
        self.service.activate_view(view.id).await?;
        Ok(view)
    }

    pub async fn activate_view(&self, id: Uuid) -> ServiceResult<()> {
        self.service.activate_view(id).await
    }

    pub async fn delete_view(&self, id: Uuid) -> ServiceResult<()> {
        self.service.delete_view(id).await
    }

    pub async fn set_color(&self, color: Rgb) -> ServiceResult<()> {
        self.service.set_color(color).await
    }

    pub async fn set_line_width(&self, width: f64) -> ServiceResult<()> {
        self.service.set_line_width(width).await
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
            .register(Rc::new(RedlineService::with_manager(viewer.redline.clone())))
            .unwrap();
        (viewer, registry)
    }

    #[test]
    fn test_create_view_activates_it() {
        let (_viewer, registry) = setup();
        let panel = RedlinePanel::new(&registry).unwrap();

        let view = block_on(panel.create_view("Issues")).unwrap();

        let state = panel.view();
        assert_eq!(state.views, vec![view.clone()]);
        assert_eq!(state.active_view, Some(view.id));
        assert_eq!(panel.update().count(), 2);
    }

    #[test]
    fn test_delete_view() {
        let (_viewer, registry) = setup();
        let panel = RedlinePanel::new(&registry).unwrap();
        let view = block_on(panel.create_view("Temp")).unwrap();

        block_on(panel.delete_view(view.id)).unwrap();

        assert!(panel.view().views.is_empty());
        assert_eq!(panel.view().active_view, None);
    }

    #[test]
    fn test_pen_settings() {
        let (viewer, registry) = setup();
        let panel = RedlinePanel::new(&registry).unwrap();

        block_on(panel.set_color(Rgb::new(0, 0, 255))).unwrap();
        assert!(block_on(panel.set_line_width(-1.0)).is_err());

        assert_eq!(panel.view().color, Rgb::new(0, 0, 255));
        assert_eq!(viewer.redline.log().calls(), vec!["set_color(#0000ff)"]);
    }
}
