//! PMI service: color of product manufacturing information annotations.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::rc::Rc;

use crate::color::Rgb;
use crate::config::{Configuration, FieldSpec};
use crate::error::{ManagerResult, ServiceResult};
use crate::event::{EventEmitter, ServiceEvent, Subscription};
use crate::service::{
    BoxFuture, DynResettable, ManagerSlot, ResettableConfigurationService, Service, names,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PmiConfiguration {
    pub color: Rgb,
    /// Draw every annotation in `color` instead of its authored color.
    pub color_override: bool,
}

impl Default for PmiConfiguration {
    fn default() -> Self {
        Self {
            color: Rgb::BLACK,
            color_override: false,
        }
    }
}

impl Configuration for PmiConfiguration {
    const SERVICE: &'static str = names::PMI;
    const FIELDS: &'static [FieldSpec] =
        &[FieldSpec::color("color"), FieldSpec::bool("colorOverride")];
}

pub fn is_pmi_configuration(value: &Value) -> bool {
    PmiConfiguration::matches(value)
}

pub trait PmiManager {
    fn pmi_color(&self) -> Rgb;
    fn set_pmi_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>>;
    fn color_override(&self) -> bool;
    fn set_color_override(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum PmiEvent {
    ServiceReset,
    ManagerReset,
    ColorChanged(Rgb),
    ColorOverrideChanged(bool),
}

impl ServiceEvent for PmiEvent {
    fn name(&self) -> &'static str {
        match self {
            PmiEvent::ServiceReset => "hoops-pmi-service-reset",
            PmiEvent::ManagerReset => "hoops-pmi-manager-reset",
            PmiEvent::ColorChanged(_) => "hoops-pmi-color-changed",
            PmiEvent::ColorOverrideChanged(_) => "hoops-pmi-color-override-changed",
        }
    }

    fn detail(&self) -> Value {
        match self {
            PmiEvent::ServiceReset | PmiEvent::ManagerReset => Value::Null,
            PmiEvent::ColorChanged(color) => json!(color),
            PmiEvent::ColorOverrideChanged(enabled) => json!(enabled),
        }
    }
}

pub struct PmiService {
    manager: ManagerSlot<dyn PmiManager>,
    events: EventEmitter<PmiEvent>,
}

impl PmiService {
    pub fn new() -> Self {
        Self {
            manager: ManagerSlot::new(names::PMI, "pmi"),
            events: EventEmitter::new(),
        }
    }

    pub fn with_manager(manager: Rc<dyn PmiManager>) -> Self {
        let service = Self::new();
        service.set_manager(manager);
        service
    }

    pub fn set_manager(&self, manager: Rc<dyn PmiManager>) {
        if self.manager.replace(Some(manager), |_| None) {
            self.events.emit(&PmiEvent::ManagerReset);
        }
    }

    pub fn clear_manager(&self) {
        if self.manager.replace(None, |_| None) {
            self.events.emit(&PmiEvent::ManagerReset);
        }
    }

    pub fn manager(&self) -> Option<Rc<dyn PmiManager>> {
        self.manager.get()
    }

    pub fn events(&self) -> &EventEmitter<PmiEvent> {
        &self.events
    }

    pub fn subscribe(&self, listener: impl Fn(&PmiEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn color(&self) -> Rgb {
        self.manager
            .get()
            .map_or(PmiConfiguration::default().color, |manager| manager.pmi_color())
    }

    pub fn color_override(&self) -> bool {
        self.manager
            .get()
            .is_some_and(|manager| manager.color_override())
    }

    pub async fn set_color(&self, color: Rgb) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.pmi_color() == color {
            return Ok(());
        }
        manager.set_pmi_color(color).await?;
        log::debug!("PMI color set to {}", color);
        self.events.emit(&PmiEvent::ColorChanged(color));
        Ok(())
    }

    pub async fn set_color_override(&self, enabled: bool) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.color_override() == enabled {
            return Ok(());
        }
        manager.set_color_override(enabled).await?;
        self.events.emit(&PmiEvent::ColorOverrideChanged(enabled));
        Ok(())
    }
}

impl Default for PmiService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for PmiService {
    fn service_name(&self) -> &str {
        names::PMI
    }

    fn as_resettable(&self) -> Option<&dyn DynResettable> {
        Some(self)
    }
}

impl ResettableConfigurationService for PmiService {
    type Configuration = PmiConfiguration;

    fn configuration(&self) -> PmiConfiguration {
        PmiConfiguration {
            color: self.color(),
            color_override: self.color_override(),
        }
    }

    fn apply_configuration<'a>(
        &'a self,
        config: &'a PmiConfiguration,
    ) -> BoxFuture<'a, ServiceResult<()>> {
        Box::pin(async move {
            self.set_color(config.color).await?;
            self.set_color_override(config.color_override).await?;
            self.events.emit(&PmiEvent::ServiceReset);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::event::EventLog;
    use crate::memory::MemoryPmiManager;
    use pollster::block_on;

    #[test]
    fn test_set_color() {
        let manager = Rc::new(MemoryPmiManager::new());
        let service = PmiService::with_manager(manager.clone());
        let log = EventLog::attach(service.events());

        block_on(service.set_color("#FF8800".parse().unwrap())).unwrap();
        block_on(service.set_color(Rgb::new(0xff, 0x88, 0x00))).unwrap();

        assert_eq!(manager.log().calls(), vec!["set_pmi_color(#ff8800)".to_string()]);
        assert_eq!(log.events()[0].detail(), json!("#ff8800"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_partial_reset_keeps_applied_color() {
        let manager = Rc::new(MemoryPmiManager::new());
        manager.log().fail_on("set_color_override");
        let service = PmiService::with_manager(manager.clone());
        let log = EventLog::attach(service.events());
        let config = PmiConfiguration {
            color: Rgb::new(0, 0, 255),
            color_override: true,
        };

        let result = block_on(service.reset_configuration(Some(config)));

        assert!(matches!(result, Err(ServiceError::Manager(_))));
        assert_eq!(service.color(), Rgb::new(0, 0, 255));
        assert!(!service.color_override());
        assert_eq!(log.names(), vec!["hoops-pmi-color-changed"]);
    }

    #[test]
    fn test_manager_reset_event() {
        let service = PmiService::new();
        let log = EventLog::attach(service.events());
        let manager: Rc<dyn PmiManager> = Rc::new(MemoryPmiManager::new());

        service.set_manager(manager.clone());
        service.set_manager(manager);
        service.clear_manager();
        service.clear_manager();

        assert_eq!(log.events(), vec![PmiEvent::ManagerReset, PmiEvent::ManagerReset]);
        assert_eq!(service.color(), Rgb::BLACK);
    }

    #[test]
    fn test_configuration_guard() {
        assert!(is_pmi_configuration(&json!({"color": "#abc", "colorOverride": true})));
        assert!(!is_pmi_configuration(&json!({"color": "#abc"})));
        assert!(!is_pmi_configuration(&json!({"color": 7, "colorOverride": true})));
    }

    #[test]
    fn test_setters_without_manager_fail() {
        let service = PmiService::new();
        let log = EventLog::attach(service.events());

        assert_eq!(service.configuration(), PmiConfiguration::default());
        let err = block_on(service.set_color(Rgb::WHITE)).unwrap_err();
        assert!(matches!(err, ServiceError::NotInitialized { dependency: "pmi", .. }));
        assert!(block_on(service.set_color_override(true)).is_err());
        assert!(block_on(service.reset_configuration(None)).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_reset_round_trip() {
        let manager = Rc::new(MemoryPmiManager::new());
        let service = PmiService::with_manager(manager.clone());
        let log = EventLog::attach(service.events());
        let config = PmiConfiguration {
            color: Rgb::new(0x12, 0x34, 0x56),
            color_override: true,
        };

        block_on(service.reset_configuration(Some(config.clone()))).unwrap();

        assert_eq!(service.configuration(), config);
        assert_eq!(service.color(), Rgb::new(0x12, 0x34, 0x56));
        assert!(service.color_override());
        assert_eq!(
            log.names(),
            vec![
                "hoops-pmi-color-changed",
                "hoops-pmi-color-override-changed",
                "hoops-pmi-service-reset",
            ]
        );
    }
}
