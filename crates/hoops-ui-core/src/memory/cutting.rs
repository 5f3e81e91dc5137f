use std::cell::{Cell, RefCell};

use super::CallLog;
use crate::color::Rgb;
use crate::error::{ManagerError, ManagerResult};
use crate::event::{EventEmitter, Subscription};
use crate::service::BoxFuture;
use crate::services::cutting::{CuttingConfiguration, CuttingManager, CuttingPlane, CuttingSignal};

#[derive(Debug, Clone, Default)]
struct Section {
    active: bool,
    planes: Vec<CuttingPlane>,
}

/// In-memory cutting manager with a fixed number of sections.
pub struct MemoryCuttingManager {
    capping_visible: Cell<bool>,
    capping_face_color: Cell<Rgb>,
    capping_line_color: Cell<Rgb>,
    sections: RefCell<Vec<Section>>,
    signals: EventEmitter<CuttingSignal>,
    log: CallLog,
}

impl MemoryCuttingManager {
    pub const DEFAULT_SECTIONS: usize = 4;

    pub fn new(sections: usize) -> Self {
        let defaults = CuttingConfiguration::default();
        Self {
            capping_visible: Cell::new(defaults.capping_geometry_visible),
            capping_face_color: Cell::new(defaults.capping_face_color),
            capping_line_color: Cell::new(defaults.capping_line_color),
            sections: RefCell::new(vec![Section::default(); sections]),
            signals: EventEmitter::new(),
            log: CallLog::new(),
        }
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// A section was toggled from inside the viewer.
    pub fn simulate_section_active(&self, section: usize, active: bool) {
        if let Some(entry) = self.sections.borrow_mut().get_mut(section) {
            entry.active = active;
        }
        let signal = if active {
            CuttingSignal::SectionActivated(section)
        } else {
            CuttingSignal::SectionDeactivated(section)
        };
        self.signals.emit(&signal);
    }

    /// The user dragged the first plane of `section` to `distance`.
    pub fn simulate_plane_moved(&self, section: usize, distance: f64) {
        if let Some(plane) = self
            .sections
            .borrow_mut()
            .get_mut(section)
            .and_then(|entry| entry.planes.first_mut())
        {
            plane.distance = distance;
        }
        self.signals.emit(&CuttingSignal::PlaneUpdated { section });
    }

    fn with_section<T>(
        &self,
        section: usize,
        f: impl FnOnce(&mut Section) -> ManagerResult<T>,
    ) -> ManagerResult<T> {
        let mut sections = self.sections.borrow_mut();
        let entry = sections
            .get_mut(section)
            .ok_or_else(|| ManagerError::NotFound(format!("cutting section {section}")))?;
        f(entry)
    }
}

impl Default for MemoryCuttingManager {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SECTIONS)
    }
}

fn plane_mut(entry: &mut Section, index: usize) -> ManagerResult<&mut CuttingPlane> {
    entry
        .planes
        .get_mut(index)
        .ok_or_else(|| ManagerError::NotFound(format!("cutting plane {index}")))
}

impl CuttingManager for MemoryCuttingManager {
    fn capping_geometry_visible(&self) -> bool {
        self.capping_visible.get()
    }

    fn set_capping_geometry_visible(&self, visible: bool) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_capping_geometry_visible", visible)?;
            self.capping_visible.set(visible);
            Ok(())
        })
    }

    fn capping_face_color(&self) -> Rgb {
        self.capping_face_color.get()
    }

    fn set_capping_face_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_capping_face_color", color)?;
            self.capping_face_color.set(color);
            Ok(())
        })
    }

    fn capping_line_color(&self) -> Rgb {
        self.capping_line_color.get()
    }

    fn set_capping_line_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_capping_line_color", color)?;
            self.capping_line_color.set(color);
            Ok(())
        })
    }

    fn section_count(&self) -> usize {
        self.sections.borrow().len()
    }

    fn is_section_active(&self, section: usize) -> bool {
        self.sections
            .borrow()
            .get(section)
            .is_some_and(|entry| entry.active)
    }

    fn activate_section(&self, section: usize) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("activate_section", section)?;
            self.with_section(section, |entry| {
                entry.active = true;
                Ok(())
            })
        })
    }

    fn deactivate_section(&self, section: usize) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("deactivate_section", section)?;
            self.with_section(section, |entry| {
                entry.active = false;
                Ok(())
            })
        })
    }

    fn planes(&self, section: usize) -> Vec<CuttingPlane> {
        self.sections
            .borrow()
            .get(section)
            .map(|entry| entry.planes.clone())
            .unwrap_or_default()
    }

    fn add_plane(&self, section: usize, plane: CuttingPlane) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("add_plane", section)?;
            self.with_section(section, |entry| {
                entry.planes.push(plane);
                Ok(())
            })
        })
    }

    fn set_plane(
        &self,
        section: usize,
        index: usize,
        plane: CuttingPlane,
    ) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log
                .record("set_plane", format_args!("{section}, {index}"))?;
            self.with_section(section, |entry| {
                *plane_mut(entry, index)? = plane;
                Ok(())
            })
        })
    }

    fn remove_plane(&self, section: usize, index: usize) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log
                .record("remove_plane", format_args!("{section}, {index}"))?;
            self.with_section(section, |entry| {
                plane_mut(entry, index)?;
                entry.planes.remove(index);
                Ok(())
            })
        })
    }

    fn subscribe(&self, listener: Box<dyn Fn(&CuttingSignal)>) -> Subscription {
        self.signals.subscribe(listener)
    }
}
