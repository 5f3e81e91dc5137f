//! 3D mouse navigation settings.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::rc::Rc;

use crate::config::{Configuration, FieldSpec, Violation, ensure, positive};
use crate::error::{ManagerResult, ServiceResult};
use crate::event::{EventEmitter, ServiceEvent, Subscription};
use crate::service::{
    BoxFuture, DynResettable, ManagerSlot, ResettableConfigurationService, Service, names,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceMouseConfiguration {
    pub enabled: bool,
    pub rotation_sensitivity: f64,
    pub translation_sensitivity: f64,
    pub lock_horizon: bool,
}

impl Default for SpaceMouseConfiguration {
    fn default() -> Self {
        Self {
            enabled: true,
            rotation_sensitivity: 1.0,
            translation_sensitivity: 1.0,
            lock_horizon: false,
        }
    }
}

impl Configuration for SpaceMouseConfiguration {
    const SERVICE: &'static str = names::SPACE_MOUSE;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::bool("enabled"),
        FieldSpec::number("rotationSensitivity"),
        FieldSpec::number("translationSensitivity"),
        FieldSpec::bool("lockHorizon"),
    ];

    fn violations(&self) -> Vec<Violation> {
        [
            positive("rotationSensitivity", self.rotation_sensitivity),
            positive("translationSensitivity", self.translation_sensitivity),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub fn is_space_mouse_configuration(value: &Value) -> bool {
    SpaceMouseConfiguration::matches(value)
}

/// The viewer's 3D mouse operator.
pub trait SpaceMouseManager {
    fn is_enabled(&self) -> bool;
    fn set_enabled(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>>;
    fn rotation_sensitivity(&self) -> f64;
    fn set_rotation_sensitivity(&self, value: f64) -> BoxFuture<'_, ManagerResult<()>>;
    fn translation_sensitivity(&self) -> f64;
    fn set_translation_sensitivity(&self, value: f64) -> BoxFuture<'_, ManagerResult<()>>;
    fn lock_horizon(&self) -> bool;
    fn set_lock_horizon(&self, locked: bool) -> BoxFuture<'_, ManagerResult<()>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpaceMouseEvent {
    ServiceReset,
    ManagerReset,
    EnabledChanged(bool),
    RotationSensitivityChanged(f64),
    TranslationSensitivityChanged(f64),
    LockHorizonChanged(bool),
}

impl ServiceEvent for SpaceMouseEvent {
    fn name(&self) -> &'static str {
        match self {
            SpaceMouseEvent::ServiceReset => "hoops-spacemouse-service-reset",
            SpaceMouseEvent::ManagerReset => "hoops-spacemouse-manager-reset",
            SpaceMouseEvent::EnabledChanged(_) => "hoops-spacemouse-enabled-changed",
            SpaceMouseEvent::RotationSensitivityChanged(_) => {
                "hoops-spacemouse-rotation-sensitivity-changed"
            }
            SpaceMouseEvent::TranslationSensitivityChanged(_) => {
                "hoops-spacemouse-translation-sensitivity-changed"
            }
            SpaceMouseEvent::LockHorizonChanged(_) => "hoops-spacemouse-lock-horizon-changed",
        }
    }

    fn detail(&self) -> Value {
        match self {
            SpaceMouseEvent::ServiceReset | SpaceMouseEvent::ManagerReset => Value::Null,
            SpaceMouseEvent::EnabledChanged(value) | SpaceMouseEvent::LockHorizonChanged(value) => {
                json!(value)
            }
            SpaceMouseEvent::RotationSensitivityChanged(value)
            | SpaceMouseEvent::TranslationSensitivityChanged(value) => json!(value),
        }
    }
}

pub struct SpaceMouseService {
    manager: ManagerSlot<dyn SpaceMouseManager>,
    events: EventEmitter<SpaceMouseEvent>,
}

impl SpaceMouseService {
    pub fn new() -> Self {
        Self {
            manager: ManagerSlot::new(names::SPACE_MOUSE, "space mouse"),
            events: EventEmitter::new(),
        }
    }

    pub fn with_manager(manager: Rc<dyn SpaceMouseManager>) -> Self {
        let service = Self::new();
        service.set_manager(manager);
        service
    }

    pub fn set_manager(&self, manager: Rc<dyn SpaceMouseManager>) {
        if self.manager.replace(Some(manager), |_| None) {
            self.events.emit(&SpaceMouseEvent::ManagerReset);
        }
    }

    pub fn clear_manager(&self) {
        if self.manager.replace(None, |_| None) {
            self.events.emit(&SpaceMouseEvent::ManagerReset);
        }
    }

    pub fn manager(&self) -> Option<Rc<dyn SpaceMouseManager>> {
        self.manager.get()
    }

    pub fn events(&self) -> &EventEmitter<SpaceMouseEvent> {
        &self.events
    }

    pub fn subscribe(&self, listener: impl Fn(&SpaceMouseEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn is_enabled(&self) -> bool {
        self.manager
            .get()
            .map_or(SpaceMouseConfiguration::default().enabled, |m| m.is_enabled())
    }

    pub fn rotation_sensitivity(&self) -> f64 {
        self.manager.get().map_or(
            SpaceMouseConfiguration::default().rotation_sensitivity,
            |m| m.rotation_sensitivity(),
        )
    }

    pub fn translation_sensitivity(&self) -> f64 {
        self.manager.get().map_or(
            SpaceMouseConfiguration::default().translation_sensitivity,
            |m| m.translation_sensitivity(),
        )
    }

    pub fn lock_horizon(&self) -> bool {
        self.manager.get().is_some_and(|m| m.lock_horizon())
    }

    pub async fn set_enabled(&self, enabled: bool) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.is_enabled() == enabled {
            return Ok(());
        }
        manager.set_enabled(enabled).await?;
        log::debug!("Space mouse {}", if enabled { "enabled" } else { "disabled" });
        self.events.emit(&SpaceMouseEvent::EnabledChanged(enabled));
        Ok(())
    }

    pub async fn set_rotation_sensitivity(&self, value: f64) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        ensure(positive("rotationSensitivity", value))?;
        if manager.rotation_sensitivity() == value {
            return Ok(());
        }
        manager.set_rotation_sensitivity(value).await?;
        self.events
            .emit(&SpaceMouseEvent::RotationSensitivityChanged(value));
        Ok(())
    }

    pub async fn set_translation_sensitivity(&self, value: f64) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        ensure(positive("translationSensitivity", value))?;
        if manager.translation_sensitivity() == value {
            return Ok(());
        }
        manager.set_translation_sensitivity(value).await?;
        self.events
            .emit(&SpaceMouseEvent::TranslationSensitivityChanged(value));
        Ok(())
    }

    pub async fn set_lock_horizon(&self, locked: bool) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.lock_horizon() == locked {
            return Ok(());
        }
        manager.set_lock_horizon(locked).await?;
        self.events.emit(&SpaceMouseEvent::LockHorizonChanged(locked));
        Ok(())
    }
}

impl Default for SpaceMouseService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for SpaceMouseService {
    fn service_name(&self) -> &str {
        names::SPACE_MOUSE
    }

    fn as_resettable(&self) -> Option<&dyn DynResettable> {
        Some(self)
    }
}

impl ResettableConfigurationService for SpaceMouseService {
    type Configuration = SpaceMouseConfiguration;

    fn configuration(&self) -> SpaceMouseConfiguration {
        SpaceMouseConfiguration {
            enabled: self.is_enabled(),
            rotation_sensitivity: self.rotation_sensitivity(),
            translation_sensitivity: self.translation_sensitivity(),
            lock_horizon: self.lock_horizon(),
        }
    }

    fn apply_configuration<'a>(
        &'a self,
        config: &'a SpaceMouseConfiguration,
    ) -> BoxFuture<'a, ServiceResult<()>> {
        Box::pin(async move {
            self.set_enabled(config.enabled).await?;
            self.set_rotation_sensitivity(config.rotation_sensitivity)
                .await?;
            self.set_translation_sensitivity(config.translation_sensitivity)
                .await?;
            self.set_lock_horizon(config.lock_horizon).await?;
            self.events.emit(&SpaceMouseEvent::ServiceReset);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::event::EventLog;
    use crate::memory::MemorySpaceMouseManager;
    use pollster::block_on;

    fn bound() -> (Rc<MemorySpaceMouseManager>, SpaceMouseService) {
        let manager = Rc::new(MemorySpaceMouseManager::new());
        let service = SpaceMouseService::with_manager(manager.clone());
        (manager, service)
    }

    #[test]
    fn test_sensitivity_must_be_positive() {
        let (manager, service) = bound();
        let result = block_on(service.set_rotation_sensitivity(0.0));
        assert!(matches!(result, Err(ServiceError::InvalidArgument(_))));
        assert!(manager.log().is_empty());
    }

    #[test]
    fn test_reset_reports_both_sensitivities() {
        let (manager, service) = bound();
        let value = json!({
            "enabled": true,
            "rotationSensitivity": -1,
            "translationSensitivity": 0,
            "lockHorizon": false,
        });

        let Err(ServiceError::InvalidConfiguration(err)) =
            block_on(service.reset_from_value(Some(&value)))
        else {
            panic!("expected a configuration error");
        };
        assert_eq!(err.fields(), vec!["rotationSensitivity", "translationSensitivity"]);
        assert!(manager.log().is_empty());
    }

    #[test]
    fn test_reset_round_trip() {
        let (_manager, service) = bound();
        let log = EventLog::attach(service.events());
        let config = SpaceMouseConfiguration {
            enabled: false,
            rotation_sensitivity: 2.5,
            translation_sensitivity: 0.5,
            lock_horizon: true,
        };

        block_on(service.reset_configuration(Some(config.clone()))).unwrap();

        assert_eq!(service.configuration(), config);
        assert_eq!(log.len(), 5);
        assert_eq!(log.events().last(), Some(&SpaceMouseEvent::ServiceReset));
    }

    #[test]
    fn test_setters_without_manager_fail() {
        let service = SpaceMouseService::new();
        let log = EventLog::attach(service.events());

        assert_eq!(service.configuration(), SpaceMouseConfiguration::default());
        let err = block_on(service.set_lock_horizon(true)).unwrap_err();
        assert!(matches!(err, ServiceError::NotInitialized { dependency: "space mouse", .. }));
        assert!(err.to_string().contains("space mouse manager is not initialized"));
        assert!(block_on(service.set_enabled(false)).is_err());
        assert!(block_on(service.set_rotation_sensitivity(2.0)).is_err());
        assert!(block_on(service.set_translation_sensitivity(2.0)).is_err());
        assert!(block_on(service.reset_configuration(None)).is_err());
        assert!(log.is_empty());
    }
}
