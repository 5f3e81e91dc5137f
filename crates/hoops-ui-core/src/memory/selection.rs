use std::cell::{Cell, RefCell};

use super::CallLog;
use crate::color::Rgb;
use crate::error::ManagerResult;
use crate::event::{EventEmitter, Subscription};
use crate::service::BoxFuture;
use crate::services::selection::{
    NodeId, SelectionConfiguration, SelectionManager, SelectionSignal,
};

/// In-memory selection manager.
pub struct MemorySelectionManager {
    highlight_color: Cell<Rgb>,
    pick_tolerance: Cell<f64>,
    face_line_selection: Cell<bool>,
    selected: RefCell<Vec<NodeId>>,
    signals: EventEmitter<SelectionSignal>,
    log: CallLog,
}

impl MemorySelectionManager {
    pub fn new() -> Self {
        let defaults = SelectionConfiguration::default();
        Self {
            highlight_color: Cell::new(defaults.highlight_color),
            pick_tolerance: Cell::new(defaults.pick_tolerance),
            face_line_selection: Cell::new(defaults.face_line_selection_enabled),
            selected: RefCell::new(Vec::new()),
            signals: EventEmitter::new(),
            log: CallLog::new(),
        }
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// The user picked `nodes` in the viewer.
    pub fn simulate_select(&self, nodes: Vec<NodeId>) {
        *self.selected.borrow_mut() = nodes.clone();
        self.signals.emit(&SelectionSignal::SelectionChanged(nodes));
    }
}

impl Default for MemorySelectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionManager for MemorySelectionManager {
    fn highlight_color(&self) -> Rgb {
        self.highlight_color.get()
    }

    fn set_highlight_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_highlight_color", color)?;
            self.highlight_color.set(color);
            Ok(())
        })
    }

    fn pick_tolerance(&self) -> f64 {
        self.pick_tolerance.get()
    }

    fn set_pick_tolerance(&self, tolerance: f64) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_pick_tolerance", tolerance)?;
            self.pick_tolerance.set(tolerance);
            Ok(())
        })
    }

    fn face_line_selection_enabled(&self) -> bool {
        self.face_line_selection.get()
    }

    fn set_face_line_selection_enabled(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_face_line_selection_enabled", enabled)?;
            self.face_line_selection.set(enabled);
            Ok(())
        })
    }

    fn selected_nodes(&self) -> Vec<NodeId> {
        self.selected.borrow().clone()
    }

    fn clear(&self) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("clear", "")?;
            self.selected.borrow_mut().clear();
            Ok(())
        })
    }

    fn subscribe(&self, listener: Box<dyn Fn(&SelectionSignal)>) -> Subscription {
        self.signals.subscribe(listener)
    }
}
