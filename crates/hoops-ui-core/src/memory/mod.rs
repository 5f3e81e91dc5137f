//! In-memory viewer managers.
//!
//! Stand-ins for the viewer SDK's per-feature managers, for tests and for
//! running the UI layer without a viewer. Every mutating call is recorded in a
//! [`CallLog`], and a call can be configured to fail.
//!
//! Setters never fire the manager's own callbacks; `simulate_*` methods model
//! changes that originate inside the viewer and fire them.

mod camera;
mod cutting;
mod explode;
mod floorplan;
mod measurement;
mod pmi;
mod redline;
mod render_options;
mod selection;
mod sheet;
mod space_mouse;

pub use camera::MemoryCameraManager;
pub use cutting::MemoryCuttingManager;
pub use explode::MemoryExplodeManager;
pub use floorplan::MemoryFloorplanManager;
pub use measurement::MemoryMeasurementManager;
pub use pmi::MemoryPmiManager;
pub use redline::MemoryRedlineManager;
pub use render_options::MemoryRenderOptionsManager;
pub use selection::MemorySelectionManager;
pub use sheet::MemorySheetManager;
pub use space_mouse::MemorySpaceMouseManager;

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::Display;
use std::rc::Rc;

use crate::error::{ManagerError, ManagerResult};

/// Record of the mutating calls a manager received.
#[derive(Debug, Default)]
pub struct CallLog {
    calls: RefCell<Vec<String>>,
    failing: RefCell<HashSet<&'static str>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `operation(args)`; fails if `operation` was marked with
    /// [`CallLog::fail_on`].
    pub fn record(&self, operation: &'static str, args: impl Display) -> ManagerResult<()> {
        self.calls.borrow_mut().push(format!("{operation}({args})"));
        if self.failing.borrow().contains(operation) {
            return Err(ManagerError::Rejected {
                operation: operation.to_string(),
                reason: "configured to fail".to_string(),
            });
        }
        Ok(())
    }

    /// Make every later call to `operation` fail.
    pub fn fail_on(&self, operation: &'static str) {
        self.failing.borrow_mut().insert(operation);
    }

    /// Recorded calls, oldest first, formatted as `operation(args)`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Number of recorded calls to `operation`.
    pub fn count_of(&self, operation: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.split('(').next() == Some(operation))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

/// One in-memory manager per viewer feature.
#[derive(Clone)]
pub struct MemoryViewer {
    pub camera: Rc<MemoryCameraManager>,
    pub cutting: Rc<MemoryCuttingManager>,
    pub explode: Rc<MemoryExplodeManager>,
    pub floorplan: Rc<MemoryFloorplanManager>,
    pub measurement: Rc<MemoryMeasurementManager>,
    pub pmi: Rc<MemoryPmiManager>,
    pub redline: Rc<MemoryRedlineManager>,
    pub render_options: Rc<MemoryRenderOptionsManager>,
    pub selection: Rc<MemorySelectionManager>,
    pub sheet: Rc<MemorySheetManager>,
    pub space_mouse: Rc<MemorySpaceMouseManager>,
}

impl MemoryViewer {
    /// A viewer with default state in every manager.
    pub fn new() -> Self {
        Self {
            camera: Rc::new(MemoryCameraManager::new()),
            cutting: Rc::new(MemoryCuttingManager::new(MemoryCuttingManager::DEFAULT_SECTIONS)),
            explode: Rc::new(MemoryExplodeManager::new()),
            floorplan: Rc::new(MemoryFloorplanManager::new()),
            measurement: Rc::new(MemoryMeasurementManager::new()),
            pmi: Rc::new(MemoryPmiManager::new()),
            redline: Rc::new(MemoryRedlineManager::new()),
            render_options: Rc::new(MemoryRenderOptionsManager::new()),
            selection: Rc::new(MemorySelectionManager::new()),
            sheet: Rc::new(MemorySheetManager::new()),
            space_mouse: Rc::new(MemorySpaceMouseManager::new()),
        }
    }
}

impl Default for MemoryViewer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_log_records_and_counts() {
        let log = CallLog::new();
        log.record("set_color", "#ff0000").unwrap();
        log.record("set_color", "#00ff00").unwrap();
        log.record("set_width", 2).unwrap();

        assert_eq!(log.count(), 3);
        assert_eq!(log.count_of("set_color"), 2);
        assert_eq!(log.calls()[2], "set_width(2)");
    }

    #[test]
    fn test_call_log_failures_are_still_recorded() {
        let log = CallLog::new();
        log.fail_on("start");
        assert!(log.record("start", "").is_err());
        assert_eq!(log.calls(), vec!["start()".to_string()]);
        assert!(log.record("stop", "").is_ok());
    }
}
