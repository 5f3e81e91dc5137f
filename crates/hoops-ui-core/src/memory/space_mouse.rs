use std::cell::Cell;

use super::CallLog;
use crate::error::ManagerResult;
use crate::service::BoxFuture;
use crate::services::space_mouse::{SpaceMouseConfiguration, SpaceMouseManager};

/// In-memory 3D mouse operator.
pub struct MemorySpaceMouseManager {
    enabled: Cell<bool>,
    rotation: Cell<f64>,
    translation: Cell<f64>,
    lock_horizon: Cell<bool>,
    log: CallLog,
}

impl MemorySpaceMouseManager {
    pub fn new() -> Self {
        let defaults = SpaceMouseConfiguration::default();
        Self {
            enabled: Cell::new(defaults.enabled),
            rotation: Cell::new(defaults.rotation_sensitivity),
            translation: Cell::new(defaults.translation_sensitivity),
            lock_horizon: Cell::new(defaults.lock_horizon),
            log: CallLog::new(),
        }
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

impl Default for MemorySpaceMouseManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SpaceMouseManager for MemorySpaceMouseManager {
    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn set_enabled(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_enabled", enabled)?;
            self.enabled.set(enabled);
            Ok(())
        })
    }

    fn rotation_sensitivity(&self) -> f64 {
        self.rotation.get()
    }

    fn set_rotation_sensitivity(&self, value: f64) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_rotation_sensitivity", value)?;
            self.rotation.set(value);
            Ok(())
        })
    }

    fn translation_sensitivity(&self) -> f64 {
        self.translation.get()
    }

    fn set_translation_sensitivity(&self, value: f64) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_translation_sensitivity", value)?;
            self.translation.set(value);
            Ok(())
        })
    }

    fn lock_horizon(&self) -> bool {
        self.lock_horizon.get()
    }

    fn set_lock_horizon(&self, locked: bool) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_lock_horizon", locked)?;
            self.lock_horizon.set(locked);
            Ok(())
        })
    }
}
