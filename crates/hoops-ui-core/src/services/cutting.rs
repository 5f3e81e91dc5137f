//! Cutting service: capping appearance and the viewer's cutting sections.
//!
//! The viewer owns a fixed number of cutting sections, addressed by index.
//! Each section holds up to [`MAX_PLANES_PER_SECTION`] planes and is either
//! active (cutting the model) or not. Section operations validate the section
//! and plane indices before calling the manager, so an out-of-range index
//! never reaches the viewer.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::rc::Rc;

use crate::color::Rgb;
use crate::config::{Configuration, FieldSpec};
use crate::error::{ManagerResult, ServiceError, ServiceResult};
use crate::event::{EventEmitter, ServiceEvent, Subscription};
use crate::service::{
    BoxFuture, DynResettable, ManagerSlot, ResettableConfigurationService, Service, names,
};

pub const MAX_PLANES_PER_SECTION: usize = 6;

/// A plane `normal · p + distance = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CuttingPlane {
    pub normal: [f64; 3],
    pub distance: f64,
    /// Whether the plane's reference geometry is drawn.
    pub visible: bool,
}

impl CuttingPlane {
    pub fn new(normal: [f64; 3], distance: f64) -> Self {
        Self {
            normal,
            distance,
            visible: true,
        }
    }

    /// The plane facing the other way.
    pub fn flipped(self) -> Self {
        let [x, y, z] = self.normal;
        Self {
            normal: [-x, -y, -z],
            distance: -self.distance,
            ..self
        }
    }

    fn is_valid(&self) -> bool {
        let [x, y, z] = self.normal;
        let length = (x * x + y * y + z * z).sqrt();
        length > f64::EPSILON && length.is_finite() && self.distance.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuttingConfiguration {
    pub capping_geometry_visible: bool,
    pub capping_face_color: Rgb,
    pub capping_line_color: Rgb,
}

impl Default for CuttingConfiguration {
    fn default() -> Self {
        Self {
            capping_geometry_visible: true,
            capping_face_color: Rgb::new(0xc8, 0xc8, 0xc8),
            capping_line_color: Rgb::BLACK,
        }
    }
}

impl Configuration for CuttingConfiguration {
    const SERVICE: &'static str = names::CUTTING;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::bool("cappingGeometryVisible"),
        FieldSpec::color("cappingFaceColor"),
        FieldSpec::color("cappingLineColor"),
    ];
}

pub fn is_cutting_configuration(value: &Value) -> bool {
    CuttingConfiguration::matches(value)
}

/// Viewer-side cutting manager.
pub trait CuttingManager {
    fn capping_geometry_visible(&self) -> bool;
    fn set_capping_geometry_visible(&self, visible: bool) -> BoxFuture<'_, ManagerResult<()>>;
    fn capping_face_color(&self) -> Rgb;
    fn set_capping_face_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>>;
    fn capping_line_color(&self) -> Rgb;
    fn set_capping_line_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>>;

    fn section_count(&self) -> usize;
    fn is_section_active(&self, section: usize) -> bool;
    fn activate_section(&self, section: usize) -> BoxFuture<'_, ManagerResult<()>>;
    fn deactivate_section(&self, section: usize) -> BoxFuture<'_, ManagerResult<()>>;

    fn planes(&self, section: usize) -> Vec<CuttingPlane>;
    fn add_plane(&self, section: usize, plane: CuttingPlane) -> BoxFuture<'_, ManagerResult<()>>;
    fn set_plane(
        &self,
        section: usize,
        index: usize,
        plane: CuttingPlane,
    ) -> BoxFuture<'_, ManagerResult<()>>;
    fn remove_plane(&self, section: usize, index: usize) -> BoxFuture<'_, ManagerResult<()>>;

    fn subscribe(&self, listener: Box<dyn Fn(&CuttingSignal)>) -> Subscription;
}

#[derive(Debug, Clone, PartialEq)]
pub enum CuttingSignal {
    SectionActivated(usize),
    SectionDeactivated(usize),
    /// A plane of `section` was moved with the viewer's handles.
    PlaneUpdated { section: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CuttingEvent {
    ServiceReset,
    ManagerReset,
    CappingGeometryVisibleChanged(bool),
    CappingFaceColorChanged(Rgb),
    CappingLineColorChanged(Rgb),
    SectionActiveChanged { section: usize, active: bool },
    PlanesChanged { section: usize },
}

impl CuttingEvent {
    /// Section the event concerns, for section-scoped events.
    pub fn section(&self) -> Option<usize> {
        match self {
            CuttingEvent::SectionActiveChanged { section, .. }
            | CuttingEvent::PlanesChanged { section } => Some(*section),
            _ => None,
        }
    }
}

impl ServiceEvent for CuttingEvent {
    fn name(&self) -> &'static str {
        match self {
            CuttingEvent::ServiceReset => "hoops-cutting-service-reset",
            CuttingEvent::ManagerReset => "hoops-cutting-manager-reset",
            CuttingEvent::CappingGeometryVisibleChanged(_) => {
                "hoops-cutting-capping-geometry-visible-changed"
            }
            CuttingEvent::CappingFaceColorChanged(_) => "hoops-cutting-capping-face-color-changed",
            CuttingEvent::CappingLineColorChanged(_) => "hoops-cutting-capping-line-color-changed",
            CuttingEvent::SectionActiveChanged { .. } => "hoops-cutting-section-active-changed",
            CuttingEvent::PlanesChanged { .. } => "hoops-cutting-section-planes-changed",
        }
    }

    fn detail(&self) -> Value {
        match self {
            CuttingEvent::ServiceReset | CuttingEvent::ManagerReset => Value::Null,
            CuttingEvent::CappingGeometryVisibleChanged(visible) => json!(visible),
            CuttingEvent::CappingFaceColorChanged(color)
            | CuttingEvent::CappingLineColorChanged(color) => json!(color),
            CuttingEvent::SectionActiveChanged { section, active } => {
                json!({ "sectionIndex": section, "active": active })
            }
            CuttingEvent::PlanesChanged { section } => json!({ "sectionIndex": section }),
        }
    }
}

pub struct CuttingService {
    manager: ManagerSlot<dyn CuttingManager>,
    events: EventEmitter<CuttingEvent>,
}

impl CuttingService {
    pub fn new() -> Self {
        Self {
            manager: ManagerSlot::new(names::CUTTING, "cutting"),
            events: EventEmitter::new(),
        }
    }

    pub fn with_manager(manager: Rc<dyn CuttingManager>) -> Self {
        let service = Self::new();
        service.set_manager(manager);
        service
    }

    pub fn set_manager(&self, manager: Rc<dyn CuttingManager>) {
        self.rebind(Some(manager));
    }

    pub fn clear_manager(&self) {
        self.rebind(None);
    }

    fn rebind(&self, manager: Option<Rc<dyn CuttingManager>>) {
        let events = self.events.clone();
        let changed = self.manager.replace(manager, |manager| {
            Some(manager.subscribe(Box::new(move |signal: &CuttingSignal| {
                let event = match *signal {
                    CuttingSignal::SectionActivated(section) => {
                        CuttingEvent::SectionActiveChanged { section, active: true }
                    }
                    CuttingSignal::SectionDeactivated(section) => {
                        CuttingEvent::SectionActiveChanged { section, active: false }
                    }
                    CuttingSignal::PlaneUpdated { section } => {
                        CuttingEvent::PlanesChanged { section }
                    }
                };
                events.emit(&event);
            })))
        });
        if changed {
            self.events.emit(&CuttingEvent::ManagerReset);
        }
    }

    pub fn manager(&self) -> Option<Rc<dyn CuttingManager>> {
        self.manager.get()
    }

    pub fn events(&self) -> &EventEmitter<CuttingEvent> {
        &self.events
    }

    pub fn subscribe(&self, listener: impl Fn(&CuttingEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn capping_geometry_visible(&self) -> bool {
        self.manager.get().map_or(
            CuttingConfiguration::default().capping_geometry_visible,
            |manager| manager.capping_geometry_visible(),
        )
    }

    pub fn capping_face_color(&self) -> Rgb {
        self.manager.get().map_or(
            CuttingConfiguration::default().capping_face_color,
            |manager| manager.capping_face_color(),
        )
    }

    pub fn capping_line_color(&self) -> Rgb {
        self.manager.get().map_or(
            CuttingConfiguration::default().capping_line_color,
            |manager| manager.capping_line_color(),
        )
    }

    pub async fn set_capping_geometry_visible(&self, visible: bool) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.capping_geometry_visible() == visible {
            return Ok(());
        }
        manager.set_capping_geometry_visible(visible).await?;
        log::debug!("Capping geometry {}", if visible { "shown" } else { "hidden" });
        self.events
            .emit(&CuttingEvent::CappingGeometryVisibleChanged(visible));
        Ok(())
    }

    pub async fn set_capping_face_color(&self, color: Rgb) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.capping_face_color() == color {
            return Ok(());
        }
        manager.set_capping_face_color(color).await?;
        self.events
            .emit(&CuttingEvent::CappingFaceColorChanged(color));
        Ok(())
    }

    pub async fn set_capping_line_color(&self, color: Rgb) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.capping_line_color() == color {
            return Ok(());
        }
        manager.set_capping_line_color(color).await?;
        self.events
            .emit(&CuttingEvent::CappingLineColorChanged(color));
        Ok(())
    }

    pub fn section_count(&self) -> usize {
        self.manager.get().map_or(0, |manager| manager.section_count())
    }

    pub fn is_section_active(&self, section: usize) -> bool {
        self.manager.get().is_some_and(|manager| {
            section < manager.section_count() && manager.is_section_active(section)
        })
    }

    /// Planes of `section`. Empty for an unknown section or without a manager.
    pub fn planes(&self, section: usize) -> Vec<CuttingPlane> {
        match self.manager.get() {
            Some(manager) if section < manager.section_count() => manager.planes(section),
            _ => Vec::new(),
        }
    }

    pub async fn set_section_active(&self, section: usize, active: bool) -> ServiceResult<()> {
        let manager = self.section(section)?;
        if manager.is_section_active(section) == active {
            return Ok(());
        }
        if active {
            manager.activate_section(section).await?;
        } else {
            manager.deactivate_section(section).await?;
        }
        log::debug!(
            "Cutting section {} {}",
            section,
            if active { "activated" } else { "deactivated" }
        );
        self.events
            .emit(&CuttingEvent::SectionActiveChanged { section, active });
        Ok(())
    }

    pub async fn add_plane(&self, section: usize, plane: CuttingPlane) -> ServiceResult<()> {
        let manager = self.section(section)?;
        check_plane(&plane)?;
        if manager.planes(section).len() >= MAX_PLANES_PER_SECTION {
            return Err(ServiceError::InvalidArgument(format!(
                "cutting section {section} already has {MAX_PLANES_PER_SECTION} planes"
            )));
        }
        manager.add_plane(section, plane).await?;
        self.events.emit(&CuttingEvent::PlanesChanged { section });
        Ok(())
    }

    pub async fn set_plane(
        &self,
        section: usize,
        index: usize,
        plane: CuttingPlane,
    ) -> ServiceResult<()> {
        let (manager, current) = self.plane(section, index)?;
        check_plane(&plane)?;
        if current == plane {
            return Ok(());
        }
        manager.set_plane(section, index, plane).await?;
        self.events.emit(&CuttingEvent::PlanesChanged { section });
        Ok(())
    }

    pub async fn remove_plane(&self, section: usize, index: usize) -> ServiceResult<()> {
        let (manager, _) = self.plane(section, index)?;
        manager.remove_plane(section, index).await?;
        self.events.emit(&CuttingEvent::PlanesChanged { section });
        Ok(())
    }

    /// Show or hide one plane's reference geometry.
    pub async fn set_plane_visible(
        &self,
        section: usize,
        index: usize,
        visible: bool,
    ) -> ServiceResult<()> {
        let (_, current) = self.plane(section, index)?;
        self.set_plane(section, index, CuttingPlane { visible, ..current })
            .await
    }

    fn section(&self, section: usize) -> ServiceResult<Rc<dyn CuttingManager>> {
        let manager = self.manager.require()?;
        let count = manager.section_count();
        if section >= count {
            return Err(ServiceError::InvalidArgument(format!(
                "cutting section {section} out of range (0..{count})"
            )));
        }
        Ok(manager)
    }

    fn plane(
        &self,
        section: usize,
        index: usize,
    ) -> ServiceResult<(Rc<dyn CuttingManager>, CuttingPlane)> {
        let manager = self.section(section)?;
        let plane = manager.planes(section).get(index).copied().ok_or_else(|| {
            ServiceError::InvalidArgument(format!(
                "cutting section {section} has no plane {index}"
            ))
        })?;
        Ok((manager, plane))
    }
}

fn check_plane(plane: &CuttingPlane) -> ServiceResult<()> {
    if plane.is_valid() {
        Ok(())
    } else {
        Err(ServiceError::InvalidArgument(
            "cutting plane needs a finite, non-zero normal".to_string(),
        ))
    }
}

impl Default for CuttingService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for CuttingService {
    fn service_name(&self) -> &str {
        names::CUTTING
    }

    fn as_resettable(&self) -> Option<&dyn DynResettable> {
        Some(self)
    }
}

impl ResettableConfigurationService for CuttingService {
    type Configuration = CuttingConfiguration;

    fn configuration(&self) -> CuttingConfiguration {
        CuttingConfiguration {
            capping_geometry_visible: self.capping_geometry_visible(),
            capping_face_color: self.capping_face_color(),
            capping_line_color: self.capping_line_color(),
        }
    }

    fn apply_configuration<'a>(
        &'a self,
        config: &'a CuttingConfiguration,
    ) -> BoxFuture<'a, ServiceResult<()>> {
        Box::pin(async move {
            self.set_capping_geometry_visible(config.capping_geometry_visible)
                .await?;
            self.set_capping_face_color(config.capping_face_color).await?;
            self.set_capping_line_color(config.capping_line_color).await?;
            self.events.emit(&CuttingEvent::ServiceReset);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;
    use crate::memory::MemoryCuttingManager;
    use pollster::block_on;

    fn bound() -> (Rc<MemoryCuttingManager>, CuttingService) {
        let manager = Rc::new(MemoryCuttingManager::new(2));
        let service = CuttingService::with_manager(manager.clone());
        (manager, service)
    }

    fn x_plane() -> CuttingPlane {
        CuttingPlane::new([1.0, 0.0, 0.0], 0.0)
    }

    #[test]
    fn test_section_activation() {
        let (manager, service) = bound();
        let log = EventLog::attach(service.events());

        block_on(service.set_section_active(1, true)).unwrap();
        block_on(service.set_section_active(1, true)).unwrap();

        assert!(service.is_section_active(1));
        assert!(!service.is_section_active(0));
        assert_eq!(manager.log().calls(), vec!["activate_section(1)".to_string()]);
        assert_eq!(
            log.events()[0].detail(),
            json!({"sectionIndex": 1, "active": true})
        );
    }

    #[test]
    fn test_section_out_of_range() {
        let (manager, service) = bound();
        assert!(matches!(
            block_on(service.set_section_active(2, true)),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(!service.is_section_active(5));
        assert!(service.planes(5).is_empty());
        assert!(manager.log().is_empty());
    }

    #[test]
    fn test_plane_lifecycle() {
        let (_manager, service) = bound();
        let log = EventLog::attach(service.events());

        block_on(service.add_plane(0, x_plane())).unwrap();
        block_on(service.set_plane(0, 0, x_plane().flipped())).unwrap();
        block_on(service.set_plane_visible(0, 0, false)).unwrap();
        block_on(service.set_plane_visible(0, 0, false)).unwrap();

        let planes = service.planes(0);
        assert_eq!(planes.len(), 1);
        assert_eq!(planes[0].normal, [-1.0, 0.0, 0.0]);
        assert!(!planes[0].visible);

        block_on(service.remove_plane(0, 0)).unwrap();
        assert!(service.planes(0).is_empty());
        assert_eq!(log.len(), 4);
        assert!(log.events().iter().all(|e| e.section() == Some(0)));
    }

    #[test]
    fn test_plane_limits() {
        let (_manager, service) = bound();
        for _ in 0..MAX_PLANES_PER_SECTION {
            block_on(service.add_plane(1, x_plane())).unwrap();
        }
        assert!(block_on(service.add_plane(1, x_plane())).is_err());
        assert!(block_on(service.add_plane(0, CuttingPlane::new([0.0; 3], 1.0))).is_err());
        assert!(block_on(service.remove_plane(0, 0)).is_err());
    }

    #[test]
    fn test_viewer_signals_forwarded() {
        let (manager, service) = bound();
        let log = EventLog::attach(service.events());

        manager.simulate_section_active(0, true);
        manager.simulate_plane_moved(0, 0.0);

        assert_eq!(
            log.events(),
            vec![
                CuttingEvent::SectionActiveChanged { section: 0, active: true },
                CuttingEvent::PlanesChanged { section: 0 },
            ]
        );
    }

    #[test]
    fn test_reset_round_trip() {
        let (_manager, service) = bound();
        let config = CuttingConfiguration {
            capping_geometry_visible: false,
            capping_face_color: Rgb::new(10, 20, 30),
            capping_line_color: Rgb::WHITE,
        };
        block_on(service.reset_configuration(Some(config.clone()))).unwrap();
        assert_eq!(service.configuration(), config);
    }

    #[test]
    fn test_without_manager() {
        let service = CuttingService::new();
        assert_eq!(service.section_count(), 0);
        assert!(service.capping_geometry_visible());
        assert!(matches!(
            block_on(service.set_section_active(0, true)),
            Err(ServiceError::NotInitialized { .. })
        ));
    }
}
