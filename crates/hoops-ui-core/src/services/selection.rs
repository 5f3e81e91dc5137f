//! Selection service: highlight appearance and the current selection.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::rc::Rc;

use crate::color::Rgb;
use crate::config::{Configuration, FieldSpec, Violation, ensure, non_negative};
use crate::error::{ManagerResult, ServiceResult};
use crate::event::{EventEmitter, ServiceEvent, Subscription};
use crate::service::{
    BoxFuture, DynResettable, ManagerSlot, ResettableConfigurationService, Service, names,
};

/// Viewer node id.
pub type NodeId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionConfiguration {
    pub highlight_color: Rgb,
    /// Pixels.
    pub pick_tolerance: f64,
    pub face_line_selection_enabled: bool,
}

impl Default for SelectionConfiguration {
    fn default() -> Self {
        Self {
            highlight_color: Rgb::new(0x00, 0x99, 0xff),
            pick_tolerance: 5.0,
            face_line_selection_enabled: true,
        }
    }
}

impl Configuration for SelectionConfiguration {
    const SERVICE: &'static str = names::SELECTION;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::color("highlightColor"),
        FieldSpec::number("pickTolerance"),
        FieldSpec::bool("faceLineSelectionEnabled"),
    ];

    fn violations(&self) -> Vec<Violation> {
        non_negative("pickTolerance", self.pick_tolerance)
            .into_iter()
            .collect()
    }
}

pub fn is_selection_configuration(value: &Value) -> bool {
    SelectionConfiguration::matches(value)
}

pub trait SelectionManager {
    fn highlight_color(&self) -> Rgb;
    fn set_highlight_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>>;
    fn pick_tolerance(&self) -> f64;
    fn set_pick_tolerance(&self, tolerance: f64) -> BoxFuture<'_, ManagerResult<()>>;
    fn face_line_selection_enabled(&self) -> bool;
    fn set_face_line_selection_enabled(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>>;
    fn selected_nodes(&self) -> Vec<NodeId>;
    fn clear(&self) -> BoxFuture<'_, ManagerResult<()>>;
    fn subscribe(&self, listener: Box<dyn Fn(&SelectionSignal)>) -> Subscription;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionSignal {
    /// The user picked in the viewer. Carries the full new selection.
    SelectionChanged(Vec<NodeId>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    ServiceReset,
    ManagerReset,
    HighlightColorChanged(Rgb),
    PickToleranceChanged(f64),
    FaceLineSelectionEnabledChanged(bool),
    SelectionChanged(Vec<NodeId>),
}

impl ServiceEvent for SelectionEvent {
    fn name(&self) -> &'static str {
        match self {
            SelectionEvent::ServiceReset => "hoops-selection-service-reset",
            SelectionEvent::ManagerReset => "hoops-selection-manager-reset",
            SelectionEvent::HighlightColorChanged(_) => "hoops-selection-highlight-color-changed",
            SelectionEvent::PickToleranceChanged(_) => "hoops-selection-pick-tolerance-changed",
            SelectionEvent::FaceLineSelectionEnabledChanged(_) => {
                "hoops-selection-face-line-selection-enabled-changed"
            }
            SelectionEvent::SelectionChanged(_) => "hoops-selection-selection-changed",
        }
    }

    fn detail(&self) -> Value {
        match self {
            SelectionEvent::ServiceReset | SelectionEvent::ManagerReset => Value::Null,
            SelectionEvent::HighlightColorChanged(color) => json!(color),
            SelectionEvent::PickToleranceChanged(tolerance) => json!(tolerance),
            SelectionEvent::FaceLineSelectionEnabledChanged(enabled) => json!(enabled),
            SelectionEvent::SelectionChanged(nodes) => json!(nodes),
        }
    }
}

pub struct SelectionService {
    manager: ManagerSlot<dyn SelectionManager>,
    events: EventEmitter<SelectionEvent>,
}

impl SelectionService {
    pub fn new() -> Self {
        Self {
            manager: ManagerSlot::new(names::SELECTION, "selection"),
            events: EventEmitter::new(),
        }
    }

    pub fn with_manager(manager: Rc<dyn SelectionManager>) -> Self {
        let service = Self::new();
        service.set_manager(manager);
        service
    }

    pub fn set_manager(&self, manager: Rc<dyn SelectionManager>) {
        self.rebind(Some(manager));
    }

    pub fn clear_manager(&self) {
        self.rebind(None);
    }

    fn rebind(&self, manager: Option<Rc<dyn SelectionManager>>) {
        let events = self.events.clone();
        let changed = self.manager.replace(manager, |manager| {
            Some(manager.subscribe(Box::new(move |signal: &SelectionSignal| match signal {
                SelectionSignal::SelectionChanged(nodes) => {
                    events.emit(&SelectionEvent::SelectionChanged(nodes.clone()))
                }
            })))
        });
        if changed {
            self.events.emit(&SelectionEvent::ManagerReset);
        }
    }

    pub fn manager(&self) -> Option<Rc<dyn SelectionManager>> {
        self.manager.get()
    }

    pub fn events(&self) -> &EventEmitter<SelectionEvent> {
        &self.events
    }

    pub fn subscribe(&self, listener: impl Fn(&SelectionEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn highlight_color(&self) -> Rgb {
        self.manager.get().map_or(
            SelectionConfiguration::default().highlight_color,
            |manager| manager.highlight_color(),
        )
    }

    pub fn pick_tolerance(&self) -> f64 {
        self.manager.get().map_or(
            SelectionConfiguration::default().pick_tolerance,
            |manager| manager.pick_tolerance(),
        )
    }

    pub fn face_line_selection_enabled(&self) -> bool {
        self.manager.get().map_or(
            SelectionConfiguration::default().face_line_selection_enabled,
            |manager| manager.face_line_selection_enabled(),
        )
    }

    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.manager
            .get()
            .map(|manager| manager.selected_nodes())
            .unwrap_or_default()
    }

    pub async fn set_highlight_color(&self, color: Rgb) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.highlight_color() == color {
            return Ok(());
        }
        manager.set_highlight_color(color).await?;
        log::debug!("Selection highlight color set to {}", color);
        self.events
            .emit(&SelectionEvent::HighlightColorChanged(color));
        Ok(())
    }

    pub async fn set_pick_tolerance(&self, tolerance: f64) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        ensure(non_negative("pickTolerance", tolerance))?;
        if manager.pick_tolerance() == tolerance {
            return Ok(());
        }
        manager.set_pick_tolerance(tolerance).await?;
        self.events
            .emit(&SelectionEvent::PickToleranceChanged(tolerance));
        Ok(())
    }

    pub async fn set_face_line_selection_enabled(&self, enabled: bool) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.face_line_selection_enabled() == enabled {
            return Ok(());
        }
        manager.set_face_line_selection_enabled(enabled).await?;
        self.events
            .emit(&SelectionEvent::FaceLineSelectionEnabledChanged(enabled));
        Ok(())
    }

    /// Deselect everything. No-op when nothing is selected.
    pub async fn clear_selection(&self) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.selected_nodes().is_empty() {
            return Ok(());
        }
        manager.clear().await?;
        self.events
            .emit(&SelectionEvent::SelectionChanged(Vec::new()));
        Ok(())
    }
}

impl Default for SelectionService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for SelectionService {
    fn service_name(&self) -> &str {
        names::SELECTION
    }

    fn as_resettable(&self) -> Option<&dyn DynResettable> {
        Some(self)
    }
}

impl ResettableConfigurationService for SelectionService {
    type Configuration = SelectionConfiguration;

    fn configuration(&self) -> SelectionConfiguration {
        SelectionConfiguration {
            highlight_color: self.highlight_color(),
            pick_tolerance: self.pick_tolerance(),
            face_line_selection_enabled: self.face_line_selection_enabled(),
        }
    }

    fn apply_configuration<'a>(
        &'a self,
        config: &'a SelectionConfiguration,
    ) -> BoxFuture<'a, ServiceResult<()>> {
        Box::pin(async move {
            self.set_highlight_color(config.highlight_color).await?;
            self.set_pick_tolerance(config.pick_tolerance).await?;
            self.set_face_line_selection_enabled(config.face_line_selection_enabled)
                .await?;
            self.events.emit(&SelectionEvent::ServiceReset);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::event::EventLog;
    use crate::memory::MemorySelectionManager;
    use pollster::block_on;

    fn bound() -> (Rc<MemorySelectionManager>, SelectionService) {
        let manager = Rc::new(MemorySelectionManager::new());
        let service = SelectionService::with_manager(manager.clone());
        (manager, service)
    }

    #[test]
    fn test_viewer_selection_forwarded() {
        let (manager, service) = bound();
        let log = EventLog::attach(service.events());

        manager.simulate_select(vec![4, 8]);

        assert_eq!(service.selected_nodes(), vec![4, 8]);
        assert_eq!(log.events()[0].detail(), json!([4, 8]));
    }

    #[test]
    fn test_clear_selection() {
        let (manager, service) = bound();
        block_on(service.clear_selection()).unwrap();
        assert!(manager.log().is_empty());

        manager.simulate_select(vec![1]);
        let log = EventLog::attach(service.events());
        block_on(service.clear_selection()).unwrap();

        assert!(service.selected_nodes().is_empty());
        assert_eq!(manager.log().calls(), vec!["clear()".to_string()]);
        assert_eq!(log.events(), vec![SelectionEvent::SelectionChanged(vec![])]);
    }

    #[test]
    fn test_reset_skips_unchanged_fields() {
        let (manager, service) = bound();
        let log = EventLog::attach(service.events());
        let config = SelectionConfiguration {
            pick_tolerance: 12.0,
            ..SelectionConfiguration::default()
        };

        block_on(service.reset_configuration(Some(config))).unwrap();

        assert_eq!(manager.log().calls(), vec!["set_pick_tolerance(12)".to_string()]);
        assert_eq!(
            log.names(),
            vec!["hoops-selection-pick-tolerance-changed", "hoops-selection-service-reset"]
        );
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let (_manager, service) = bound();
        assert!(matches!(
            block_on(service.set_pick_tolerance(-1.0)),
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rebinding_moves_signal_subscription() {
        let (first, service) = bound();
        let second = Rc::new(MemorySelectionManager::new());
        service.set_manager(second.clone());
        let log = EventLog::attach(service.events());

        first.simulate_select(vec![1]);
        second.simulate_select(vec![2]);

        assert_eq!(log.events(), vec![SelectionEvent::SelectionChanged(vec![2])]);
    }

    #[test]
    fn test_setters_without_manager_fail() {
        let service = SelectionService::new();
        let log = EventLog::attach(service.events());

        assert_eq!(service.configuration(), SelectionConfiguration::default());
        assert!(service.selected_nodes().is_empty());
        let err = block_on(service.set_pick_tolerance(1.0)).unwrap_err();
        assert!(matches!(err, ServiceError::NotInitialized { dependency: "selection", .. }));
        assert!(block_on(service.set_highlight_color(Rgb::BLACK)).is_err());
        assert!(block_on(service.set_face_line_selection_enabled(false)).is_err());
        assert!(block_on(service.clear_selection()).is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_reset_round_trip() {
        let (_manager, service) = bound();
        let log = EventLog::attach(service.events());
        let config = SelectionConfiguration {
            highlight_color: Rgb::new(0xff, 0xcc, 0x00),
            pick_tolerance: 0.0,
            face_line_selection_enabled: false,
        };

        block_on(service.reset_configuration(Some(config.clone()))).unwrap();

        assert_eq!(service.configuration(), config);
        assert_eq!(service.highlight_color(), Rgb::new(0xff, 0xcc, 0x00));
        assert_eq!(service.pick_tolerance(), 0.0);
        assert!(!service.face_line_selection_enabled());
        assert_eq!(log.len(), 4);
        assert_eq!(log.events().last(), Some(&SelectionEvent::ServiceReset));
    }
}
