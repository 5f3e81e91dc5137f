use std::cell::{Cell, RefCell};
use uuid::Uuid;

use super::CallLog;
use crate::color::Rgb;
use crate::error::{ManagerError, ManagerResult};
use crate::event::{EventEmitter, Subscription};
use crate::service::BoxFuture;
use crate::services::redline::{
    RedlineConfiguration, RedlineManager, RedlineSignal, RedlineView,
};

/// In-memory markup manager. View ids are random v4 uuids.
pub struct MemoryRedlineManager {
    color: Cell<Rgb>,
    line_width: Cell<f64>,
    views: RefCell<Vec<RedlineView>>,
    active: Cell<Option<Uuid>>,
    signals: EventEmitter<RedlineSignal>,
    log: CallLog,
}

impl MemoryRedlineManager {
    pub fn new() -> Self {
        let defaults = RedlineConfiguration::default();
        Self {
            color: Cell::new(defaults.color),
            line_width: Cell::new(defaults.line_width),
            views: RefCell::new(Vec::new()),
            active: Cell::new(None),
            signals: EventEmitter::new(),
            log: CallLog::new(),
        }
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// A view was created from inside the viewer.
    pub fn simulate_create(&self, name: &str) -> RedlineView {
        let view = self.insert(name.to_string());
        self.signals.emit(&RedlineSignal::ViewCreated(view.clone()));
        view
    }

    fn insert(&self, name: String) -> RedlineView {
        let view = RedlineView {
            id: Uuid::new_v4(),
            name,
        };
        self.views.borrow_mut().push(view.clone());
        view
    }

    fn contains(&self, id: Uuid) -> ManagerResult<()> {
        if self.views.borrow().iter().any(|view| view.id == id) {
            Ok(())
        } else {
            Err(ManagerError::NotFound(format!("redline view {id}")))
        }
    }
}

impl Default for MemoryRedlineManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RedlineManager for MemoryRedlineManager {
    fn color(&self) -> Rgb {
        self.color.get()
    }

    fn set_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_color", color)?;
            self.color.set(color);
            Ok(())
        })
    }

    fn line_width(&self) -> f64 {
        self.line_width.get()
    }

    fn set_line_width(&self, width: f64) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_line_width", width)?;
            self.line_width.set(width);
            Ok(())
        })
    }

    fn views(&self) -> Vec<RedlineView> {
        self.views.borrow().clone()
    }

    fn active_view(&self) -> Option<Uuid> {
        self.active.get()
    }

    fn create_view(&self, name: String) -> BoxFuture<'_, ManagerResult<RedlineView>> {
        Box::pin(async move {
            self.log.record("create_view", &name)?;
            Ok(self.insert(name))
        })
    }

    fn activate_view(&self, id: Uuid) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("activate_view", id)?;
            self.contains(id)?;
            self.active.set(Some(id));
            Ok(())
        })
    }

    fn delete_view(&self, id: Uuid) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("delete_view", id)?;
            self.contains(id)?;
            self.views.borrow_mut().retain(|view| view.id != id);
            if self.active.get() == Some(id) {
                self.active.set(None);
            }
            Ok(())
        })
    }

    fn subscribe(&self, listener: Box<dyn Fn(&RedlineSignal)>) -> Subscription {
        self.signals.subscribe(listener)
    }
}
