//! Floorplan service: the 2D overview map shown over BIM models.
//!
//! The viewer's floorplan manager holds its settings as one record, so every
//! setter reads the record, changes one field and writes the record back.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::rc::Rc;

use crate::color::Rgb;
use crate::config::{
    Configuration, FieldSpec, Violation, ensure, literal_enum, positive, unit_interval,
};
use crate::error::{ManagerResult, ServiceResult};
use crate::event::{EventEmitter, ServiceEvent, Subscription};
use crate::service::{
    BoxFuture, DynResettable, ManagerSlot, ResettableConfigurationService, Service, names,
};

literal_enum! {
    /// Which direction points up on the floorplan.
    pub enum FloorplanOrientation {
        NorthUp => "North Up",
        AvatarUp => "Avatar Up",
    }
    default NorthUp
}

literal_enum! {
    /// When the viewer shows the floorplan on its own.
    pub enum FloorplanAutoActivation {
        Bim => "Bim",
        BimWalk => "Bim Walk",
        Never => "Never",
    }
    default BimWalk
}

/// Floorplan settings. Also the record the manager stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorplanConfiguration {
    pub orientation: FloorplanOrientation,
    pub auto_activate: FloorplanAutoActivation,
    pub track_camera: bool,
    pub background_color: Rgb,
    pub background_opacity: f64,
    pub border_color: Rgb,
    pub border_opacity: f64,
    pub avatar_color: Rgb,
    pub avatar_outline_color: Rgb,
    pub avatar_scale: f64,
    pub zoom_level: f64,
}

impl Default for FloorplanConfiguration {
    fn default() -> Self {
        Self {
            orientation: FloorplanOrientation::NorthUp,
            auto_activate: FloorplanAutoActivation::BimWalk,
            track_camera: true,
            background_color: Rgb::WHITE,
            background_opacity: 0.25,
            border_color: Rgb::BLACK,
            border_opacity: 1.0,
            avatar_color: Rgb::new(0xff, 0x00, 0xff),
            avatar_outline_color: Rgb::BLACK,
            avatar_scale: 1.0,
            zoom_level: 1.0,
        }
    }
}

impl Configuration for FloorplanConfiguration {
    const SERVICE: &'static str = names::FLOORPLAN;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::literal("orientation", FloorplanOrientation::NAMES),
        FieldSpec::literal("autoActivate", FloorplanAutoActivation::NAMES),
        FieldSpec::bool("trackCamera"),
        FieldSpec::color("backgroundColor"),
        FieldSpec::number("backgroundOpacity"),
        FieldSpec::color("borderColor"),
        FieldSpec::number("borderOpacity"),
        FieldSpec::color("avatarColor"),
        FieldSpec::color("avatarOutlineColor"),
        FieldSpec::number("avatarScale"),
        FieldSpec::number("zoomLevel"),
    ];

    fn violations(&self) -> Vec<Violation> {
        [
            unit_interval("backgroundOpacity", self.background_opacity),
            unit_interval("borderOpacity", self.border_opacity),
            positive("avatarScale", self.avatar_scale),
            positive("zoomLevel", self.zoom_level),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub fn is_floorplan_configuration(value: &Value) -> bool {
    FloorplanConfiguration::matches(value)
}

/// Viewer-side floorplan controller.
pub trait FloorplanManager {
    fn is_active(&self) -> bool;
    fn activate(&self) -> BoxFuture<'_, ManagerResult<()>>;
    fn deactivate(&self) -> BoxFuture<'_, ManagerResult<()>>;
    fn configuration(&self) -> FloorplanConfiguration;
    fn set_configuration(
        &self,
        configuration: FloorplanConfiguration,
    ) -> BoxFuture<'_, ManagerResult<()>>;
    fn subscribe(&self, listener: Box<dyn Fn(&FloorplanSignal)>) -> Subscription;
}

/// Change notifications raised by a [`FloorplanManager`].
#[derive(Debug, Clone, PartialEq)]
pub enum FloorplanSignal {
    /// The viewer activated the floorplan (auto activation).
    Activated,
    Deactivated,
}

/// Events dispatched by [`FloorplanService`].
#[derive(Debug, Clone, PartialEq)]
pub enum FloorplanEvent {
    ServiceReset,
    ManagerReset,
    ActiveChanged(bool),
    OrientationChanged(FloorplanOrientation),
    AutoActivateChanged(FloorplanAutoActivation),
    TrackCameraChanged(bool),
    BackgroundColorChanged(Rgb),
    BackgroundOpacityChanged(f64),
    BorderColorChanged(Rgb),
    BorderOpacityChanged(f64),
    AvatarColorChanged(Rgb),
    AvatarOutlineColorChanged(Rgb),
    AvatarScaleChanged(f64),
    ZoomLevelChanged(f64),
}

impl ServiceEvent for FloorplanEvent {
    fn name(&self) -> &'static str {
        match self {
            FloorplanEvent::ServiceReset => "hoops-floorplan-service-reset",
            FloorplanEvent::ManagerReset => "hoops-floorplan-manager-reset",
            FloorplanEvent::ActiveChanged(_) => "hoops-floorplan-active-changed",
            FloorplanEvent::OrientationChanged(_) => "hoops-floorplan-orientation-changed",
            FloorplanEvent::AutoActivateChanged(_) => "hoops-floorplan-auto-activate-changed",
            FloorplanEvent::TrackCameraChanged(_) => "hoops-floorplan-track-camera-changed",
            FloorplanEvent::BackgroundColorChanged(_) => "hoops-floorplan-background-color-changed",
            FloorplanEvent::BackgroundOpacityChanged(_) => {
                "hoops-floorplan-background-opacity-changed"
            }
            FloorplanEvent::BorderColorChanged(_) => "hoops-floorplan-border-color-changed",
            FloorplanEvent::BorderOpacityChanged(_) => "hoops-floorplan-border-opacity-changed",
            FloorplanEvent::AvatarColorChanged(_) => "hoops-floorplan-avatar-color-changed",
            FloorplanEvent::AvatarOutlineColorChanged(_) => {
                "hoops-floorplan-avatar-outline-color-changed"
            }
            FloorplanEvent::AvatarScaleChanged(_) => "hoops-floorplan-avatar-scale-changed",
            FloorplanEvent::ZoomLevelChanged(_) => "hoops-floorplan-zoom-level-changed",
        }
    }

    fn detail(&self) -> Value {
        match self {
            FloorplanEvent::ServiceReset | FloorplanEvent::ManagerReset => Value::Null,
            FloorplanEvent::ActiveChanged(value) | FloorplanEvent::TrackCameraChanged(value) => {
                json!(value)
            }
            FloorplanEvent::OrientationChanged(value) => json!(value),
            FloorplanEvent::AutoActivateChanged(value) => json!(value),
            FloorplanEvent::BackgroundColorChanged(value)
            | FloorplanEvent::BorderColorChanged(value)
            | FloorplanEvent::AvatarColorChanged(value)
            | FloorplanEvent::AvatarOutlineColorChanged(value) => json!(value),
            FloorplanEvent::BackgroundOpacityChanged(value)
            | FloorplanEvent::BorderOpacityChanged(value)
            | FloorplanEvent::AvatarScaleChanged(value)
            | FloorplanEvent::ZoomLevelChanged(value) => json!(value),
        }
    }
}

/// Floorplan feature service.
pub struct FloorplanService {
    manager: ManagerSlot<dyn FloorplanManager>,
    events: EventEmitter<FloorplanEvent>,
}

impl FloorplanService {
    pub fn new() -> Self {
        Self {
            manager: ManagerSlot::new(names::FLOORPLAN, "floorplan"),
            events: EventEmitter::new(),
        }
    }

    pub fn with_manager(manager: Rc<dyn FloorplanManager>) -> Self {
        let service = Self::new();
        service.set_manager(manager);
        service
    }

    pub fn set_manager(&self, manager: Rc<dyn FloorplanManager>) {
        self.rebind(Some(manager));
    }

    pub fn clear_manager(&self) {
        self.rebind(None);
    }

    fn rebind(&self, manager: Option<Rc<dyn FloorplanManager>>) {
        let events = self.events.clone();
        let changed = self.manager.replace(manager, |manager| {
            Some(manager.subscribe(Box::new(move |signal: &FloorplanSignal| {
                let active = matches!(signal, FloorplanSignal::Activated);
                events.emit(&FloorplanEvent::ActiveChanged(active));
            })))
        });
        if changed {
            self.events.emit(&FloorplanEvent::ManagerReset);
        }
    }

    pub fn manager(&self) -> Option<Rc<dyn FloorplanManager>> {
        self.manager.get()
    }

    pub fn events(&self) -> &EventEmitter<FloorplanEvent> {
        &self.events
    }

    pub fn subscribe(&self, listener: impl Fn(&FloorplanEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    fn current(&self) -> FloorplanConfiguration {
        self.manager
            .get()
            .map(|manager| manager.configuration())
            .unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.manager.get().is_some_and(|manager| manager.is_active())
    }

    pub fn orientation(&self) -> FloorplanOrientation {
        self.current().orientation
    }

    pub fn auto_activate(&self) -> FloorplanAutoActivation {
        self.current().auto_activate
    }

    pub fn track_camera(&self) -> bool {
        self.current().track_camera
    }

    pub fn background_color(&self) -> Rgb {
        self.current().background_color
    }

    pub fn background_opacity(&self) -> f64 {
        self.current().background_opacity
    }

    pub fn border_color(&self) -> Rgb {
        self.current().border_color
    }

    pub fn border_opacity(&self) -> f64 {
        self.current().border_opacity
    }

    pub fn avatar_color(&self) -> Rgb {
        self.current().avatar_color
    }

    pub fn avatar_outline_color(&self) -> Rgb {
        self.current().avatar_outline_color
    }

    pub fn avatar_scale(&self) -> f64 {
        self.current().avatar_scale
    }

    pub fn zoom_level(&self) -> f64 {
        self.current().zoom_level
    }

    /// Show or hide the floorplan.
    pub async fn set_active(&self, active: bool) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.is_active() == active {
            return Ok(());
        }

        if active {
            manager.activate().await?;
        } else {
            manager.deactivate().await?;
        }
        self.events.emit(&FloorplanEvent::ActiveChanged(active));
        Ok(())
    }

    pub async fn set_orientation(&self, orientation: FloorplanOrientation) -> ServiceResult<()> {
        self.update(orientation, |c| &mut c.orientation, FloorplanEvent::OrientationChanged)
            .await
    }

    pub async fn set_auto_activate(&self, mode: FloorplanAutoActivation) -> ServiceResult<()> {
        self.update(mode, |c| &mut c.auto_activate, FloorplanEvent::AutoActivateChanged)
            .await
    }

    pub async fn set_track_camera(&self, track: bool) -> ServiceResult<()> {
        self.update(track, |c| &mut c.track_camera, FloorplanEvent::TrackCameraChanged)
            .await
    }

    pub async fn set_background_color(&self, color: Rgb) -> ServiceResult<()> {
        self.update(color, |c| &mut c.background_color, FloorplanEvent::BackgroundColorChanged)
            .await
    }

    pub async fn set_background_opacity(&self, opacity: f64) -> ServiceResult<()> {
        self.manager.require()?;
        ensure(unit_interval("backgroundOpacity", opacity))?;
        self.update(
            opacity,
            |c| &mut c.background_opacity,
            FloorplanEvent::BackgroundOpacityChanged,
        )
        .await
    }

    pub async fn set_border_color(&self, color: Rgb) -> ServiceResult<()> {
        self.update(color, |c| &mut c.border_color, FloorplanEvent::BorderColorChanged)
            .await
    }

    pub async fn set_border_opacity(&self, opacity: f64) -> ServiceResult<()> {
        self.manager.require()?;
        ensure(unit_interval("borderOpacity", opacity))?;
        self.update(opacity, |c| &mut c.border_opacity, FloorplanEvent::BorderOpacityChanged)
            .await
    }

    pub async fn set_avatar_color(&self, color: Rgb) -> ServiceResult<()> {
        self.update(color, |c| &mut c.avatar_color, FloorplanEvent::AvatarColorChanged)
            .await
    }

    pub async fn set_avatar_outline_color(&self, color: Rgb) -> ServiceResult<()> {
        self.update(
            color,
            |c| &mut c.avatar_outline_color,
            FloorplanEvent::AvatarOutlineColorChanged,
        )
        .await
    }

    pub async fn set_avatar_scale(&self, scale: f64) -> ServiceResult<()> {
        self.manager.require()?;
        ensure(positive("avatarScale", scale))?;
        self.update(scale, |c| &mut c.avatar_scale, FloorplanEvent::AvatarScaleChanged)
            .await
    }

    pub async fn set_zoom_level(&self, zoom: f64) -> ServiceResult<()> {
        self.manager.require()?;
        ensure(positive("zoomLevel", zoom))?;
        self.update(zoom, |c| &mut c.zoom_level, FloorplanEvent::ZoomLevelChanged)
            .await
    }

    /// Write one field of the manager's record, unless it already holds `value`.
    async fn update<T: Copy + PartialEq>(
        &self,
        value: T,
        field: fn(&mut FloorplanConfiguration) -> &mut T,
        event: fn(T) -> FloorplanEvent,
    ) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        let mut next = manager.configuration();
        let slot = field(&mut next);
        if *slot == value {
            return Ok(());
        }

        *slot = value;
        manager.set_configuration(next).await?;
        self.events.emit(&event(value));
        Ok(())
    }
}

impl Default for FloorplanService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for FloorplanService {
    fn service_name(&self) -> &str {
        names::FLOORPLAN
    }

    fn as_resettable(&self) -> Option<&dyn DynResettable> {
        Some(self)
    }
}

impl ResettableConfigurationService for FloorplanService {
    type Configuration = FloorplanConfiguration;

    fn configuration(&self) -> FloorplanConfiguration {
        self.current()
    }

    fn apply_configuration<'a>(
        &'a self,
        config: &'a FloorplanConfiguration,
    ) -> BoxFuture<'a, ServiceResult<()>> {
        Box::pin(async move {
            self.set_orientation(config.orientation).await?;
            self.set_auto_activate(config.auto_activate).await?;
            self.set_track_camera(config.track_camera).await?;
            self.set_background_color(config.background_color).await?;
            self.set_background_opacity(config.background_opacity).await?;
            self.set_border_color(config.border_color).await?;
            self.set_border_opacity(config.border_opacity).await?;
            self.set_avatar_color(config.avatar_color).await?;
            self.set_avatar_outline_color(config.avatar_outline_color).await?;
            self.set_avatar_scale(config.avatar_scale).await?;
            self.set_zoom_level(config.zoom_level).await?;
            self.events.emit(&FloorplanEvent::ServiceReset);
            Ok(())
        })
    }
}
