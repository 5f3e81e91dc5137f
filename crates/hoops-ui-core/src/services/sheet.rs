//! Sheet service: the 2D drawing sheets of a drawing model.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::rc::Rc;

use crate::color::Rgb;
use crate::config::{Configuration, FieldSpec};
use crate::error::{ManagerResult, ServiceError, ServiceResult};
use crate::event::{EventEmitter, ServiceEvent, Subscription};
use crate::service::{
    BoxFuture, DynResettable, ManagerSlot, ResettableConfigurationService, Service, names,
};

/// Viewer node id of a sheet.
pub type SheetId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetConfiguration {
    pub background_sheet_enabled: bool,
    pub background_color: Rgb,
    pub sheet_background_color: Rgb,
    pub sheet_shadow_color: Rgb,
}

impl Default for SheetConfiguration {
    fn default() -> Self {
        Self {
            background_sheet_enabled: true,
            background_color: Rgb::new(0x6b, 0x6b, 0x6b),
            sheet_background_color: Rgb::WHITE,
            sheet_shadow_color: Rgb::new(0x3a, 0x3a, 0x3a),
        }
    }
}

impl Configuration for SheetConfiguration {
    const SERVICE: &'static str = names::SHEET;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::bool("backgroundSheetEnabled"),
        FieldSpec::color("backgroundColor"),
        FieldSpec::color("sheetBackgroundColor"),
        FieldSpec::color("sheetShadowColor"),
    ];
}

pub fn is_sheet_configuration(value: &Value) -> bool {
    SheetConfiguration::matches(value)
}

/// Viewer-side sheet manager.
pub trait SheetManager {
    fn background_sheet_enabled(&self) -> bool;
    fn set_background_sheet_enabled(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>>;
    fn background_color(&self) -> Rgb;
    fn set_background_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>>;
    fn sheet_background_color(&self) -> Rgb;
    fn set_sheet_background_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>>;
    fn sheet_shadow_color(&self) -> Rgb;
    fn set_sheet_shadow_color(&self, color: Rgb) -> BoxFuture<'_, ManagerResult<()>>;

    /// Sheets of the loaded model, in model order.
    fn sheet_ids(&self) -> Vec<SheetId>;
    fn active_sheet(&self) -> Option<SheetId>;
    fn set_active_sheet(&self, id: SheetId) -> BoxFuture<'_, ManagerResult<()>>;

    fn subscribe(&self, listener: Box<dyn Fn(&SheetSignal)>) -> Subscription;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetSignal {
    /// A model was loaded and its sheets are known.
    SheetsLoaded(Vec<SheetId>),
    ActiveSheetChanged(Option<SheetId>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetEvent {
    ServiceReset,
    ManagerReset,
    BackgroundSheetEnabledChanged(bool),
    BackgroundColorChanged(Rgb),
    SheetBackgroundColorChanged(Rgb),
    SheetShadowColorChanged(Rgb),
    SheetsChanged(Vec<SheetId>),
    ActiveSheetChanged(Option<SheetId>),
}

impl ServiceEvent for SheetEvent {
    fn name(&self) -> &'static str {
        match self {
            SheetEvent::ServiceReset => "hoops-sheet-service-reset",
            SheetEvent::ManagerReset => "hoops-sheet-manager-reset",
            SheetEvent::BackgroundSheetEnabledChanged(_) => {
                "hoops-sheet-background-sheet-enabled-changed"
            }
            SheetEvent::BackgroundColorChanged(_) => "hoops-sheet-background-color-changed",
            SheetEvent::SheetBackgroundColorChanged(_) => {
                "hoops-sheet-sheet-background-color-changed"
            }
            SheetEvent::SheetShadowColorChanged(_) => "hoops-sheet-sheet-shadow-color-changed",
            SheetEvent::SheetsChanged(_) => "hoops-sheet-sheets-changed",
            SheetEvent::ActiveSheetChanged(_) => "hoops-sheet-active-sheet-changed",
        }
    }

    fn detail(&self) -> Value {
        match self {
            SheetEvent::ServiceReset | SheetEvent::ManagerReset => Value::Null,
            SheetEvent::BackgroundSheetEnabledChanged(enabled) => json!(enabled),
            SheetEvent::BackgroundColorChanged(color)
            | SheetEvent::SheetBackgroundColorChanged(color)
            | SheetEvent::SheetShadowColorChanged(color) => json!(color),
            SheetEvent::SheetsChanged(ids) => json!(ids),
            SheetEvent::ActiveSheetChanged(id) => json!(id),
        }
    }
}

pub struct SheetService {
    manager: ManagerSlot<dyn SheetManager>,
    events: EventEmitter<SheetEvent>,
}

impl SheetService {
    pub fn new() -> Self {
        Self {
            manager: ManagerSlot::new(names::SHEET, "sheet"),
            events: EventEmitter::new(),
        }
    }

    pub fn with_manager(manager: Rc<dyn SheetManager>) -> Self {
        let service = Self::new();
        service.set_manager(manager);
        service
    }

    pub fn set_manager(&self, manager: Rc<dyn SheetManager>) {
        self.rebind(Some(manager));
    }

    pub fn clear_manager(&self) {
        self.rebind(None);
    }

    fn rebind(&self, manager: Option<Rc<dyn SheetManager>>) {
        let events = self.events.clone();
        let changed = self.manager.replace(manager, |manager| {
            Some(manager.subscribe(Box::new(move |signal: &SheetSignal| {
                let event = match signal {
                    SheetSignal::SheetsLoaded(ids) => SheetEvent::SheetsChanged(ids.clone()),
                    SheetSignal::ActiveSheetChanged(id) => SheetEvent::ActiveSheetChanged(*id),
                };
                events.emit(&event);
            })))
        });
        if changed {
            self.events.emit(&SheetEvent::ManagerReset);
        }
    }

    pub fn manager(&self) -> Option<Rc<dyn SheetManager>> {
        self.manager.get()
    }

    pub fn events(&self) -> &EventEmitter<SheetEvent> {
        &self.events
    }

    pub fn subscribe(&self, listener: impl Fn(&SheetEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn background_sheet_enabled(&self) -> bool {
        self.manager.get().map_or(
            SheetConfiguration::default().background_sheet_enabled,
            |manager| manager.background_sheet_enabled(),
        )
    }

    pub fn background_color(&self) -> Rgb {
        self.manager.get().map_or(
            SheetConfiguration::default().background_color,
            |manager| manager.background_color(),
        )
    }

    pub fn sheet_background_color(&self) -> Rgb {
        self.manager.get().map_or(
            SheetConfiguration::default().sheet_background_color,
            |manager| manager.sheet_background_color(),
        )
    }

    pub fn sheet_shadow_color(&self) -> Rgb {
        self.manager.get().map_or(
            SheetConfiguration::default().sheet_shadow_color,
            |manager| manager.sheet_shadow_color(),
        )
    }

    pub fn sheet_ids(&self) -> Vec<SheetId> {
        self.manager
            .get()
            .map(|manager| manager.sheet_ids())
            .unwrap_or_default()
    }

    pub fn active_sheet(&self) -> Option<SheetId> {
        self.manager.get().and_then(|manager| manager.active_sheet())
    }

    pub async fn set_background_sheet_enabled(&self, enabled: bool) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.background_sheet_enabled() == enabled {
            return Ok(());
        }
        manager.set_background_sheet_enabled(enabled).await?;
        log::debug!("Background sheet {}", if enabled { "enabled" } else { "disabled" });
        self.events
            .emit(&SheetEvent::BackgroundSheetEnabledChanged(enabled));
        Ok(())
    }

    pub async fn set_background_color(&self, color: Rgb) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.background_color() == color {
            return Ok(());
        }
        manager.set_background_color(color).await?;
        self.events.emit(&SheetEvent::BackgroundColorChanged(color));
        Ok(())
    }

    pub async fn set_sheet_background_color(&self, color: Rgb) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.sheet_background_color() == color {
            return Ok(());
        }
        manager.set_sheet_background_color(color).await?;
        self.events
            .emit(&SheetEvent::SheetBackgroundColorChanged(color));
        Ok(())
    }

    pub async fn set_sheet_shadow_color(&self, color: Rgb) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.sheet_shadow_color() == color {
            return Ok(());
        }
        manager.set_sheet_shadow_color(color).await?;
        self.events.emit(&SheetEvent::SheetShadowColorChanged(color));
        Ok(())
    }

    /// Show sheet `id`. Unknown ids are rejected without a manager call.
    pub async fn set_active_sheet(&self, id: SheetId) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if !manager.sheet_ids().contains(&id) {
            return Err(ServiceError::InvalidArgument(format!("unknown sheet {id}")));
        }
        if manager.active_sheet() == Some(id) {
            return Ok(());
        }
        manager.set_active_sheet(id).await?;
        log::debug!("Active sheet set to {}", id);
        self.events.emit(&SheetEvent::ActiveSheetChanged(Some(id)));
        Ok(())
    }
}

impl Default for SheetService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for SheetService {
    fn service_name(&self) -> &str {
        names::SHEET
    }

    fn as_resettable(&self) -> Option<&dyn DynResettable> {
        Some(self)
    }
}

impl ResettableConfigurationService for SheetService {
    type Configuration = SheetConfiguration;

    fn configuration(&self) -> SheetConfiguration {
        SheetConfiguration {
            background_sheet_enabled: self.background_sheet_enabled(),
            background_color: self.background_color(),
            sheet_background_color: self.sheet_background_color(),
            sheet_shadow_color: self.sheet_shadow_color(),
        }
    }

    fn apply_configuration<'a>(
        &'a self,
        config: &'a SheetConfiguration,
    ) -> BoxFuture<'a, ServiceResult<()>> {
        Box::pin(async move {
            self.set_background_sheet_enabled(config.background_sheet_enabled)
                .await?;
            self.set_background_color(config.background_color).await?;
            self.set_sheet_background_color(config.sheet_background_color)
                .await?;
            self.set_sheet_shadow_color(config.sheet_shadow_color).await?;
            self.events.emit(&SheetEvent::ServiceReset);
            Ok(())
        })
    }
}
