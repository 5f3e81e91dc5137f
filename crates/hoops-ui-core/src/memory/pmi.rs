use std::cell::Cell;

use super::CallLog;
use crate::color::Rgb;
use crate::error::ManagerResult;
use crate::service::BoxFuture;
use crate::services::pmi::PmiManager;

/// In-memory PMI manager.
pub struct MemoryPmiManager {
    color: Cell<Rgb>,
    color_override: Cell<bool>,
    log: CallLog,
}

impl MemoryPmiManager {
    pub fn new() -> Self {
        Self {
            color: Cell::new(Rgb::BLACK),
            color_override: Cell::new(false),
            log: CallLog::new(),
        }
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

impl Default for MemoryPmiManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PmiManager for MemoryPmiManager {
    fn pmi_color(&self) -> Rgb {
        self.color.get()
    }

    fn set_pmi_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_pmi_color", color)?;
            self.color.set(color);
            Ok(())
        })
    }

    fn color_override(&self) -> bool {
        self.color_override.get()
    }

    fn set_color_override(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_color_override", enabled)?;
            self.color_override.set(enabled);
            Ok(())
        })
    }
}
