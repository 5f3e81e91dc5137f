use hoops_ui_core::services::{CuttingEvent, CuttingPlane, CuttingService};
use hoops_ui_core::{ServiceError, ServiceRegistry, ServiceResult, Subscription, names};
use std::rc::Rc;

use crate::update::UpdateRequest;

/// What one cutting section's panel shows.
#[derive(Debug, Clone, PartialEq)]
pub struct CuttingSectionView {
    pub section: usize,
    pub active: bool,
    pub planes: Vec<CuttingPlane>,
}

/// Panel for a single cutting section.
///
/// Only events about its own section (plus manager resets) raise an update.
pub struct CuttingSectionPanel {
    service: Rc<CuttingService>,
    section: usize,
    update: UpdateRequest,
    _events: Subscription,
}

impl CuttingSectionPanel {
    pub fn new(registry: &ServiceRegistry, section: usize) -> ServiceResult<Self> {
        let service = registry.get::<CuttingService>(names::CUTTING)?;
        let update = UpdateRequest::new();
        let events = update.watch(service.events(), move |event| match event {
            CuttingEvent::ManagerReset => true,
            _ => event.section() == Some(section),
        });
        Ok(Self {
            service,
            section,
            update,
            _events: events,
        })
    }

    pub fn section(&self) -> usize {
        self.section
    }

    pub fn update(&self) -> &UpdateRequest {
        &self.update
    }

    pub fn view(&self) -> CuttingSectionView {
        CuttingSectionView {
            section: self.section,
            active: self.service.is_section_active(self.section),
            planes: self.service.planes(self.section),
        }
    }

    pub async fn toggle(&self) -> ServiceResult<()> {
        let active = self.service.is_section_active(self.section);
        self.service.set_section_active(self.section, !active).await
    }

    pub async fn add_plane(&self, plane: CuttingPlane) -> ServiceResult<()> {
        self.service.add_plane(self.section, plane).await
    }

    /// Reverse which side of plane `index` is cut away.
    pub async fn flip_plane(&self, index: usize) -> ServiceResult<()> {
        let plane = self.plane(index)?;
        self.service
            .set_plane(self.section, index, plane.flipped())
            .await
    }

    pub async fn toggle_plane_visibility(&self, index: usize) -> ServiceResult<()> {
        let plane = self.plane(index)?;
        self.service
            .set_plane_visible(self.section, index, !plane.visible)
            .await
    }

    pub async fn remove_plane(&self, index: usize) -> ServiceResult<()> {
        self.service.remove_plane(self.section, index).await
    }

    fn plane(&self, index: usize) -> ServiceResult<CuttingPlane> {
        self.service
            .planes(self.section)
            .get(index)
            .copied()
            .ok_or_else(|| {
                ServiceError::InvalidArgument(format!(
                    "cutting section {} has no plane {index}",
                    self.section
                ))
            })
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
            .register(Rc::new(CuttingService::with_manager(viewer.cutting.clone())))
            .unwrap();
        (viewer, registry)
    }

    #[test]
    fn test_updates_are_filtered_by_section() {
        let (viewer, registry) = setup();
        let first = CuttingSectionPanel::new(&registry, 0).unwrap();
        let second = CuttingSectionPanel::new(&registry, 1).unwrap();

        block_on(second.toggle()).unwrap();
        viewer.cutting.simulate_plane_moved(1, 3.0);

        assert!(!first.update().is_requested());
        assert_eq!(second.update().count(), 2);
        assert!(second.view().active);
        assert!(!first.view().active);
    }

    #[test]
    fn test_plane_actions() {
        let (_viewer, registry) = setup();
        let panel = CuttingSectionPanel::new(&registry, 2).unwrap();

        block_on(panel.add_plane(CuttingPlane::new([0.0, 0.0, 1.0], 5.0))).unwrap();
        block_on(panel.flip_plane(0)).unwrap();
        block_on(panel.toggle_plane_visibility(0)).unwrap();

        let view = panel.view();
        assert_eq!(view.planes[0].normal, [-0.0, -0.0, -1.0]);
        assert_eq!(view.planes[0].distance, -5.0);
        assert!(!view.planes[0].visible);

        block_on(panel.remove_plane(0)).unwrap();
        assert!(panel.view().planes.is_empty());
        assert!(block_on(panel.flip_plane(0)).is_err());
    }

    #[test]
    fn test_capping_changes_do_not_concern_sections() {
        let (_viewer, registry) = setup();
        let panel = CuttingSectionPanel::new(&registry, 0).unwrap();
        let service = registry
            .get::<CuttingService>(names::CUTTING)
            .unwrap();

        block_on(service.set_capping_geometry_visible(false)).unwrap();
        assert!(!panel.update().is_requested());

        service.clear_manager();
        assert!(panel.update().take());
    }
}
