//! Redline service: markup pen settings and the markup views that hold
//! redline items.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::rc::Rc;
use uuid::Uuid;

use crate::color::Rgb;
use crate::config::{Configuration, FieldSpec, Violation, ensure, positive};
use crate::error::{ManagerResult, ServiceError, ServiceResult};
use crate::event::{EventEmitter, ServiceEvent, Subscription};
use crate::service::{
    BoxFuture, DynResettable, ManagerSlot, ResettableConfigurationService, Service, names,
};

/// A named markup view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedlineView {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedlineConfiguration {
    pub color: Rgb,
    pub line_width: f64,
}

impl Default for RedlineConfiguration {
    fn default() -> Self {
        Self {
            color: Rgb::new(0xff, 0x00, 0x00),
            line_width: 2.0,
        }
    }
}

impl Configuration for RedlineConfiguration {
    const SERVICE: &'static str = names::REDLINE;
    const FIELDS: &'static [FieldSpec] =
        &[FieldSpec::color("color"), FieldSpec::number("lineWidth")];

    fn violations(&self) -> Vec<Violation> {
        positive("lineWidth", self.line_width).into_iter().collect()
    }
}

pub fn is_redline_configuration(value: &Value) -> bool {
    RedlineConfiguration::matches(value)
}

/// Viewer-side markup manager.
pub trait RedlineManager {
    fn color(&self) -> Rgb;
    fn set_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>>;
    fn line_width(&self) -> f64;
    fn set_line_width(&self, width: f64) -> BoxFuture<'_, ManagerResult<()>>;

    fn views(&self) -> Vec<RedlineView>;
    fn active_view(&self) -> Option<Uuid>;
    fn create_view(&self, name: String) -> BoxFuture<'_, ManagerResult<RedlineView>>;
    fn activate_view(&self, id: Uuid) -> BoxFuture<'_, ManagerResult<()>>;
    fn delete_view(&self, id: Uuid) -> BoxFuture<'_, ManagerResult<()>>;

    fn subscribe(&self, listener: Box<dyn Fn(&RedlineSignal)>) -> Subscription;
}

#[derive(Debug, Clone, PartialEq)]
pub enum RedlineSignal {
    ViewCreated(RedlineView),
    ViewDeleted(Uuid),
    ViewActivated(Option<Uuid>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RedlineEvent {
    ServiceReset,
    ManagerReset,
    ColorChanged(Rgb),
    LineWidthChanged(f64),
    ViewCreated(RedlineView),
    ViewDeleted(Uuid),
    ActiveViewChanged(Option<Uuid>),
}

impl ServiceEvent for RedlineEvent {
    fn name(&self) -> &'static str {
        match self {
            RedlineEvent::ServiceReset => "hoops-redline-service-reset",
            RedlineEvent::ManagerReset => "hoops-redline-manager-reset",
            RedlineEvent::ColorChanged(_) => "hoops-redline-color-changed",
            RedlineEvent::LineWidthChanged(_) => "hoops-redline-line-width-changed",
            RedlineEvent::ViewCreated(_) => "hoops-redline-view-created",
            RedlineEvent::ViewDeleted(_) => "hoops-redline-view-deleted",
            RedlineEvent::ActiveViewChanged(_) => "hoops-redline-active-view-changed",
        }
    }

    fn detail(&self) -> Value {
        match self {
            RedlineEvent::ServiceReset | RedlineEvent::ManagerReset => Value::Null,
            RedlineEvent::ColorChanged(color) => json!(color),
            RedlineEvent::LineWidthChanged(width) => json!(width),
            RedlineEvent::ViewCreated(view) => json!(view),
            RedlineEvent::ViewDeleted(id) => json!(id),
            RedlineEvent::ActiveViewChanged(id) => json!(id),
        }
    }
}

impl From<&RedlineSignal> for RedlineEvent {
    fn from(signal: &RedlineSignal) -> Self {
        match signal {
            RedlineSignal::ViewCreated(view) => RedlineEvent::ViewCreated(view.clone()),
            RedlineSignal::ViewDeleted(id) => RedlineEvent::ViewDeleted(*id),
            RedlineSignal::ViewActivated(id) => RedlineEvent::ActiveViewChanged(*id),
        }
    }
}

pub struct RedlineService {
    manager: ManagerSlot<dyn RedlineManager>,
    events: EventEmitter<RedlineEvent>,
}

impl RedlineService {
    pub fn new() -> Self {
        Self {
            manager: ManagerSlot::new(names::REDLINE, "markup"),
            events: EventEmitter::new(),
        }
    }

    pub fn with_manager(manager: Rc<dyn RedlineManager>) -> Self {
        let service = Self::new();
        service.set_manager(manager);
        service
    }

    pub fn set_manager(&self, manager: Rc<dyn RedlineManager>) {
        self.rebind(Some(manager));
    }

    pub fn clear_manager(&self) {
        self.rebind(None);
    }

    fn rebind(&self, manager: Option<Rc<dyn RedlineManager>>) {
        let events = self.events.clone();
        let changed = self.manager.replace(manager, |manager| {
            Some(manager.subscribe(Box::new(move |signal: &RedlineSignal| {
                events.emit(&RedlineEvent::from(signal))
            })))
        });
        if changed {
            self.events.emit(&RedlineEvent::ManagerReset);
        }
    }

    pub fn manager(&self) -> Option<Rc<dyn RedlineManager>> {
        self.manager.get()
    }

    pub fn events(&self) -> &EventEmitter<RedlineEvent> {
        &self.events
    }

    pub fn subscribe(&self, listener: impl Fn(&RedlineEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn color(&self) -> Rgb {
        self.manager
            .get()
            .map_or(RedlineConfiguration::default().color, |manager| manager.color())
    }

    pub fn line_width(&self) -> f64 {
        self.manager.get().map_or(
            RedlineConfiguration::default().line_width,
            |manager| manager.line_width(),
        )
    }

    pub fn views(&self) -> Vec<RedlineView> {
        self.manager
            .get()
            .map(|manager| manager.views())
            .unwrap_or_default()
    }

    pub fn active_view(&self) -> Option<Uuid> {
        self.manager.get().and_then(|manager| manager.active_view())
    }

    pub async fn set_color(&self, color: Rgb) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.color() == color {
            return Ok(());
        }
        manager.set_color(color).await?;
        log::debug!("Redline color set to {}", color);
        self.events.emit(&RedlineEvent::ColorChanged(color));
        Ok(())
    }

    pub async fn set_line_width(&self, width: f64) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        ensure(positive("lineWidth", width))?;
        if manager.line_width() == width {
            return Ok(());
        }
        manager.set_line_width(width).await?;
        self.events.emit(&RedlineEvent::LineWidthChanged(width));
        Ok(())
    }

    /// Create a markup view named `name` and return it.
    pub async fn create_view(&self, name: &str) -> ServiceResult<RedlineView> {
        let manager = self.manager.require()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "redline view name must not be empty".to_string(),
            ));
        }
        let view = manager.create_view(name.to_string()).await?;
        log::debug!("Created redline view {} ({})", view.name, view.id);
        self.events.emit(&RedlineEvent::ViewCreated(view.clone()));
        Ok(view)
    }

    pub async fn activate_view(&self, id: Uuid) -> ServiceResult<()> {
        let manager = self.require_view(id)?;
        if manager.active_view() == Some(id) {
            return Ok(());
        }
        manager.activate_view(id).await?;
        self.events.emit(&RedlineEvent::ActiveViewChanged(Some(id)));
        Ok(())
    }

    /// Delete a view. Deleting the active view leaves no view active.
    pub async fn delete_view(&self, id: Uuid) -> ServiceResult<()> {
        let manager = self.require_view(id)?;
        let was_active = manager.active_view() == Some(id);
        manager.delete_view(id).await?;
        self.events.emit(&RedlineEvent::ViewDeleted(id));
        if was_active {
            self.events.emit(&RedlineEvent::ActiveViewChanged(None));
        }
        Ok(())
    }

    fn require_view(&self, id: Uuid) -> ServiceResult<Rc<dyn RedlineManager>> {
        let manager = self.manager.require()?;
        if !manager.views().iter().any(|view| view.id == id) {
            return Err(ServiceError::InvalidArgument(format!("unknown redline view {id}")));
        }
        Ok(manager)
    }
}

impl Default for RedlineService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for RedlineService {
    fn service_name(&self) -> &str {
        names::REDLINE
    }

    fn as_resettable(&self) -> Option<&dyn DynResettable> {
        Some(self)
    }
}

impl ResettableConfigurationService for RedlineService {
    type Configuration = RedlineConfiguration;

    fn configuration(&self) -> RedlineConfiguration {
        RedlineConfiguration {
            color: self.color(),
            line_width: self.line_width(),
        }
    }

    fn apply_configuration<'a>(
        &'a self,
        config: &'a RedlineConfiguration,
    ) -> BoxFuture<'a, ServiceResult<()>> {
        Box::pin(async move {
            self.set_color(config.color).await?;
            self.set_line_width(config.line_width).await?;
            self.events.emit(&RedlineEvent::ServiceReset);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;
    use crate::memory::MemoryRedlineManager;
    use pollster::block_on;

    fn bound() -> (Rc<MemoryRedlineManager>, RedlineService) {
        let manager = Rc::new(MemoryRedlineManager::new());
        let service = RedlineService::with_manager(manager.clone());
        (manager, service)
    }

    #[test]
    fn test_create_and_activate_view() {
        let (_manager, service) = bound();
        let log = EventLog::attach(service.events());

        let view = block_on(service.create_view("  Review  ")).unwrap();
        assert_eq!(view.name, "Review");
        assert_eq!(service.views(), vec![view.clone()]);
        assert_eq!(service.active_view(), None);

        block_on(service.activate_view(view.id)).unwrap();
        block_on(service.activate_view(view.id)).unwrap();

        assert_eq!(service.active_view(), Some(view.id));
        assert_eq!(
            log.names(),
            vec!["hoops-redline-view-created", "hoops-redline-active-view-changed"]
        );
    }

    #[test]
    fn test_delete_active_view() {
        let (_manager, service) = bound();
        let view = block_on(service.create_view("A")).unwrap();
        block_on(service.activate_view(view.id)).unwrap();
        let log = EventLog::attach(service.events());

        block_on(service.delete_view(view.id)).unwrap();

        assert!(service.views().is_empty());
        assert_eq!(
            log.events(),
            vec![RedlineEvent::ViewDeleted(view.id), RedlineEvent::ActiveViewChanged(None)]
        );
    }

    #[test]
    fn test_unknown_view_rejected() {
        let (manager, service) = bound();
        let id = Uuid::new_v4();
        assert!(matches!(
            block_on(service.activate_view(id)),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            block_on(service.delete_view(id)),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(manager.log().is_empty());
    }

    #[test]
    fn test_empty_view_name_rejected() {
        let (manager, service) = bound();
        assert!(block_on(service.create_view(" ")).is_err());
        assert!(manager.log().is_empty());
    }

    #[test]
    fn test_viewer_view_signals_forwarded() {
        let (manager, service) = bound();
        let log = EventLog::attach(service.events());

        let view = manager.simulate_create("From viewer");

        assert_eq!(log.events(), vec![RedlineEvent::ViewCreated(view)]);
    }

    #[test]
    fn test_line_width_must_be_positive() {
        let (manager, service) = bound();
        let value = json!({"color": "#f00", "lineWidth": 0});
        let err = block_on(service.reset_from_value(Some(&value))).unwrap_err();
        let ServiceError::InvalidConfiguration(err) = err else {
            panic!("expected a configuration error");
        };
        assert_eq!(err.fields(), vec!["lineWidth"]);
        assert!(manager.log().is_empty());
    }

    #[test]
    fn test_reset_round_trip() {
        let (_manager, service) = bound();
        let config = RedlineConfiguration {
            color: Rgb::new(0, 128, 0),
            line_width: 4.5,
        };
        block_on(service.reset_configuration(Some(config.clone()))).unwrap();
        assert_eq!(service.configuration(), config);
    }

    #[test]
    fn test_setters_without_manager_fail() {
        let service = RedlineService::new();
        let log = EventLog::attach(service.events());

        assert_eq!(service.configuration(), RedlineConfiguration::default());
        assert!(service.views().is_empty());
        assert_eq!(service.active_view(), None);
        let err = block_on(service.set_color(Rgb::BLACK)).unwrap_err();
        assert!(matches!(err, ServiceError::NotInitialized { dependency: "markup", .. }));
        assert!(block_on(service.set_line_width(3.0)).is_err());
        assert!(block_on(service.create_view("Notes")).is_err());
        assert!(block_on(service.activate_view(Uuid::new_v4())).is_err());
        assert!(block_on(service.reset_configuration(None)).is_err());
        assert!(log.is_empty());
    }
}
