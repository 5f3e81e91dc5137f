use std::cell::{Cell, RefCell};

use super::CallLog;
use crate::config::Configuration;
use crate::error::ManagerResult;
use crate::event::{EventEmitter, Subscription};
use crate::service::BoxFuture;
use crate::services::floorplan::{FloorplanConfiguration, FloorplanManager, FloorplanSignal};

/// In-memory floorplan manager.
#[derive(Default)]
pub struct MemoryFloorplanManager {
    active: Cell<bool>,
    configuration: RefCell<FloorplanConfiguration>,
    signals: EventEmitter<FloorplanSignal>,
    log: CallLog,
}

impl MemoryFloorplanManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    /// The viewer showed or hid the floorplan by itself.
    pub fn simulate_auto_activation(&self, active: bool) {
        self.active.set(active);
        let signal = if active {
            FloorplanSignal::Activated
        } else {
            FloorplanSignal::Deactivated
        };
        self.signals.emit(&signal);
    }
}

impl FloorplanManager for MemoryFloorplanManager {
    fn is_active(&self) -> bool {
        self.active.get()
    }

    fn activate(&self) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("activate", "")?;
            self.active.set(true);
            Ok(())
        })
    }

    fn deactivate(&self) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("deactivate", "")?;
            self.active.set(false);
            Ok(())
        })
    }

    fn configuration(&self) -> FloorplanConfiguration {
        self.configuration.borrow().clone()
    }

    fn set_configuration(
        &self,
        configuration: FloorplanConfiguration,
    ) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_configuration", configuration.to_value())?;
            *self.configuration.borrow_mut() = configuration;
            Ok(())
        })
    }

    fn subscribe(&self, listener: Box<dyn Fn(&FloorplanSignal)>) -> Subscription {
        self.signals.subscribe(listener)
    }
}
