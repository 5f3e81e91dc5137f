//! Explode service: drives the viewer's exploded-view animation.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::rc::Rc;

use crate::config::{Configuration, FieldSpec, Violation, ensure, non_negative};
use crate::error::{ManagerResult, ServiceResult};
use crate::event::{EventEmitter, ServiceEvent, Subscription};
use crate::service::{
    BoxFuture, DynResettable, ManagerSlot, ResettableConfigurationService, Service, names,
};

/// Viewer-side explode controller.
pub trait ExplodeManager {
    fn magnitude(&self) -> f64;
    fn set_magnitude(&self, magnitude: f64) -> BoxFuture<'_, ManagerResult<()>>;
    fn is_active(&self) -> bool;
    /// Start exploding at the current magnitude.
    fn start(&self) -> BoxFuture<'_, ManagerResult<()>>;
    fn stop(&self) -> BoxFuture<'_, ManagerResult<()>>;
    /// Register for changes made inside the viewer.
    fn subscribe(&self, listener: Box<dyn Fn(&ExplodeSignal)>) -> Subscription;
}

/// Change notifications raised by an [`ExplodeManager`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExplodeSignal {
    MagnitudeChanged(f64),
}

/// Events dispatched by [`ExplodeService`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExplodeEvent {
    ServiceReset,
    ManagerReset,
    MagnitudeChanged(f64),
    ActiveChanged(bool),
}

impl ServiceEvent for ExplodeEvent {
    fn name(&self) -> &'static str {
        match self {
            ExplodeEvent::ServiceReset => "hoops-explode-service-reset",
            ExplodeEvent::ManagerReset => "hoops-explode-manager-reset",
            ExplodeEvent::MagnitudeChanged(_) => "hoops-explode-magnitude-changed",
            ExplodeEvent::ActiveChanged(_) => "hoops-explode-active-changed",
        }
    }

    fn detail(&self) -> Value {
        match self {
            ExplodeEvent::ServiceReset | ExplodeEvent::ManagerReset => Value::Null,
            ExplodeEvent::MagnitudeChanged(magnitude) => json!(magnitude),
            ExplodeEvent::ActiveChanged(active) => json!(active),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplodeConfiguration {
    pub magnitude: f64,
    pub active: bool,
}

impl Default for ExplodeConfiguration {
    fn default() -> Self {
        Self {
            magnitude: ExplodeService::DEFAULT_MAGNITUDE,
            active: false,
        }
    }
}

impl Configuration for ExplodeConfiguration {
    const SERVICE: &'static str = names::EXPLODE;
    const FIELDS: &'static [FieldSpec] =
        &[FieldSpec::number("magnitude"), FieldSpec::bool("active")];

    fn violations(&self) -> Vec<Violation> {
        non_negative("magnitude", self.magnitude).into_iter().collect()
    }
}

pub fn is_explode_configuration(value: &Value) -> bool {
    ExplodeConfiguration::matches(value)
}

/// Explode feature service.
pub struct ExplodeService {
    manager: ManagerSlot<dyn ExplodeManager>,
    events: EventEmitter<ExplodeEvent>,
}

impl ExplodeService {
    pub const DEFAULT_MAGNITUDE: f64 = 0.0;

    pub fn new() -> Self {
        Self {
            manager: ManagerSlot::new(names::EXPLODE, "explode"),
            events: EventEmitter::new(),
        }
    }

    pub fn with_manager(manager: Rc<dyn ExplodeManager>) -> Self {
        let service = Self::new();
        service.set_manager(manager);
        service
    }

    /// Bind to `manager`, dropping callbacks registered on the previous one.
    pub fn set_manager(&self, manager: Rc<dyn ExplodeManager>) {
        self.rebind(Some(manager));
    }

    pub fn clear_manager(&self) {
        self.rebind(None);
    }

    fn rebind(&self, manager: Option<Rc<dyn ExplodeManager>>) {
        let events = self.events.clone();
        let changed = self.manager.replace(manager, |manager| {
            Some(manager.subscribe(Box::new(move |signal: &ExplodeSignal| match signal {
                ExplodeSignal::MagnitudeChanged(magnitude) => {
                    events.emit(&ExplodeEvent::MagnitudeChanged(*magnitude))
                }
            })))
        });
        if changed {
            self.events.emit(&ExplodeEvent::ManagerReset);
        }
    }

    pub fn manager(&self) -> Option<Rc<dyn ExplodeManager>> {
        self.manager.get()
    }

    pub fn events(&self) -> &EventEmitter<ExplodeEvent> {
        &self.events
    }

    pub fn subscribe(&self, listener: impl Fn(&ExplodeEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn magnitude(&self) -> f64 {
        self.manager
            .get()
            .map_or(Self::DEFAULT_MAGNITUDE, |manager| manager.magnitude())
    }

    pub fn is_active(&self) -> bool {
        self.manager.get().is_some_and(|manager| manager.is_active())
    }

    pub async fn set_magnitude(&self, magnitude: f64) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        ensure(non_negative("magnitude", magnitude))?;
        if manager.magnitude() == magnitude {
            return Ok(());
        }

        manager.set_magnitude(magnitude).await?;
        log::debug!("Explode magnitude set to {}", magnitude);
        self.events.emit(&ExplodeEvent::MagnitudeChanged(magnitude));
        Ok(())
    }

    /// Start or stop the explode.
    pub async fn set_active(&self, active: bool) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.is_active() == active {
            return Ok(());
        }

        if active {
            manager.start().await?;
        } else {
            manager.stop().await?;
        }
        self.events.emit(&ExplodeEvent::ActiveChanged(active));
        Ok(())
    }
}

impl Default for ExplodeService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for ExplodeService {
    fn service_name(&self) -> &str {
        names::EXPLODE
    }

    fn as_resettable(&self) -> Option<&dyn DynResettable> {
        Some(self)
    }
}

impl ResettableConfigurationService for ExplodeService {
    type Configuration = ExplodeConfiguration;

    fn configuration(&self) -> ExplodeConfiguration {
        ExplodeConfiguration {
            magnitude: self.magnitude(),
            active: self.is_active(),
        }
    }

    fn apply_configuration<'a>(
        &'a self,
        config: &'a ExplodeConfiguration,
    ) -> BoxFuture<'a, ServiceResult<()>> {
        Box::pin(async move {
            self.set_magnitude(config.magnitude).await?;
            self.set_active(config.active).await?;
            self.events.emit(&ExplodeEvent::ServiceReset);
            Ok(())
        })
    }
}
