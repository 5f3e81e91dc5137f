use std::cell::{Cell, RefCell};

use super::CallLog;
use crate::color::Rgb;
use crate::error::{ManagerError, ManagerResult};
use crate::event::{EventEmitter, Subscription};
use crate::service::BoxFuture;
use crate::services::sheet::{SheetConfiguration, SheetId, SheetManager, SheetSignal};

/// In-memory sheet manager. The first sheet is active after a load.
pub struct MemorySheetManager {
    config: RefCell<SheetConfiguration>,
    sheets: RefCell<Vec<SheetId>>,
    active: Cell<Option<SheetId>>,
    signals: EventEmitter<SheetSignal>,
    log: CallLog,
}

impl MemorySheetManager {
    /// A manager with no drawing loaded.
    pub fn new() -> Self {
        Self::with_sheets(Vec::new())
    }

    pub fn with_sheets(sheets: Vec<SheetId>) -> Self {
        Self {
            config: RefCell::new(SheetConfiguration::default()),
            active: Cell::new(sheets.first().copied()),
            sheets: RefCell::new(sheets),
            signals: EventEmitter::new(),
            log: CallLog::new(),
        }
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// The viewer loaded a drawing with `sheets`.
    pub fn simulate_load(&self, sheets: Vec<SheetId>) {
        let active = sheets.first().copied();
        *self.sheets.borrow_mut() = sheets.clone();
        self.active.set(active);
        self.signals.emit(&SheetSignal::SheetsLoaded(sheets));
        self.signals.emit(&SheetSignal::ActiveSheetChanged(active));
    }

    fn write(
        &self,
        operation: &'static str,
        color: Rgb,
        field: fn(&mut SheetConfiguration) -> &mut Rgb,
    ) -> ManagerResult<()> {
        self.log.record(operation, color)?;
        *field(&mut self.config.borrow_mut()) = color;
        Ok(())
    }
}

impl Default for MemorySheetManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetManager for MemorySheetManager {
    fn background_sheet_enabled(&self) -> bool {
        self.config.borrow().background_sheet_enabled
    }

    fn set_background_sheet_enabled(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_background_sheet_enabled", enabled)?;
            self.config.borrow_mut().background_sheet_enabled = enabled;
            Ok(())
        })
    }

    fn background_color(&self) -> Rgb {
        self.config.borrow().background_color
    }

    fn set_background_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.write("set_background_color", color, |c| &mut c.background_color)
        })
    }

    fn sheet_background_color(&self) -> Rgb {
        self.config.borrow().sheet_background_color
    }

    fn set_sheet_background_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.write("set_sheet_background_color", color, |c| {
                &mut c.sheet_background_color
            })
        })
    }

    fn sheet_shadow_color(&self) -> Rgb {
        self.config.borrow().sheet_shadow_color
    }

    fn set_sheet_shadow_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.write("set_sheet_shadow_color", color, |c| &mut c.sheet_shadow_color)
        })
    }

    fn sheet_ids(&self) -> Vec<SheetId> {
        self.sheets.borrow().clone()
    }

    fn active_sheet(&self) -> Option<SheetId> {
        self.active.get()
    }

    fn set_active_sheet(&self, id: SheetId) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_active_sheet", id)?;
            if !self.sheets.borrow().contains(&id) {
                return Err(ManagerError::NotFound(format!("sheet {id}")));
            }
            self.active.set(Some(id));
            Ok(())
        })
    }

    fn subscribe(&self, listener: Box<dyn Fn(&SheetSignal)>) -> Subscription {
        self.signals.subscribe(listener)
    }
}
