//! Render options service: draw mode, screen-space effects and background.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::rc::Rc;

use crate::color::Rgb;
use crate::config::{Configuration, FieldSpec, Violation, ensure, literal_enum, positive};
use crate::error::{ManagerResult, ServiceResult};
use crate::event::{EventEmitter, ServiceEvent, Subscription};
use crate::service::{
    BoxFuture, DynResettable, ManagerSlot, ResettableConfigurationService, Service, names,
};

literal_enum! {
    pub enum DrawMode {
        Shaded => "Shaded",
        Wireframe => "Wireframe",
        HiddenLine => "Hidden Line",
        WireframeOnShaded => "Wireframe On Shaded",
        XRay => "XRay",
        Gooch => "Gooch",
        Toon => "Toon",
    }
    default WireframeOnShaded
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptionsConfiguration {
    pub draw_mode: DrawMode,
    pub ambient_occlusion_enabled: bool,
    pub ambient_occlusion_radius: f64,
    pub anti_aliasing_enabled: bool,
    pub silhouette_edges_enabled: bool,
    pub backfaces_visible: bool,
    pub top_background_color: Rgb,
    pub bottom_background_color: Rgb,
}

impl Default for RenderOptionsConfiguration {
    fn default() -> Self {
        Self {
            draw_mode: DrawMode::WireframeOnShaded,
            ambient_occlusion_enabled: false,
            ambient_occlusion_radius: 0.05,
            anti_aliasing_enabled: true,
            silhouette_edges_enabled: false,
            backfaces_visible: false,
            top_background_color: Rgb::new(0xee, 0xf2, 0xf7),
            bottom_background_color: Rgb::WHITE,
        }
    }
}

impl Configuration for RenderOptionsConfiguration {
    const SERVICE: &'static str = names::RENDER_OPTIONS;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::literal("drawMode", DrawMode::NAMES),
        FieldSpec::bool("ambientOcclusionEnabled"),
        FieldSpec::number("ambientOcclusionRadius"),
        FieldSpec::bool("antiAliasingEnabled"),
        FieldSpec::bool("silhouetteEdgesEnabled"),
        FieldSpec::bool("backfacesVisible"),
        FieldSpec::color("topBackgroundColor"),
        FieldSpec::color("bottomBackgroundColor"),
    ];

    fn violations(&self) -> Vec<Violation> {
        positive("ambientOcclusionRadius", self.ambient_occlusion_radius)
            .into_iter()
            .collect()
    }
}

pub fn is_render_options_configuration(value: &Value) -> bool {
    RenderOptionsConfiguration::matches(value)
}

/// Viewer-side view settings.
pub trait RenderOptionsManager {
    fn draw_mode(&self) -> DrawMode;
    fn set_draw_mode(&self, mode: DrawMode) -> BoxFuture<'_, ManagerResult<()>>;
    fn ambient_occlusion_enabled(&self) -> bool;
    fn set_ambient_occlusion_enabled(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>>;
    fn ambient_occlusion_radius(&self) -> f64;
    fn set_ambient_occlusion_radius(&self, radius: f64) -> BoxFuture<'_, ManagerResult<()>>;
    fn anti_aliasing_enabled(&self) -> bool;
    fn set_anti_aliasing_enabled(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>>;
    fn silhouette_edges_enabled(&self) -> bool;
    fn set_silhouette_edges_enabled(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>>;
    fn backfaces_visible(&self) -> bool;
    fn set_backfaces_visible(&self, visible: bool) -> BoxFuture<'_, ManagerResult<()>>;
    /// Gradient background as `(top, bottom)`.
    fn background_color(&self) -> (Rgb, Rgb);
    fn set_background_color(&self, top: Rgb, bottom: Rgb) -> BoxFuture<'_, ManagerResult<()>>;
}

/// Events dispatched by [`RenderOptionsService`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOptionsEvent {
    ServiceReset,
    ManagerReset,
    DrawModeChanged(DrawMode),
    AmbientOcclusionEnabledChanged(bool),
    AmbientOcclusionRadiusChanged(f64),
    AntiAliasingEnabledChanged(bool),
    SilhouetteEdgesEnabledChanged(bool),
    BackfacesVisibleChanged(bool),
    BackgroundColorChanged { top: Rgb, bottom: Rgb },
}

impl ServiceEvent for RenderOptionsEvent {
    fn name(&self) -> &'static str {
        match self {
            RenderOptionsEvent::ServiceReset => "hoops-render-options-service-reset",
            RenderOptionsEvent::ManagerReset => "hoops-render-options-manager-reset",
            RenderOptionsEvent::DrawModeChanged(_) => "hoops-render-options-draw-mode-changed",
            RenderOptionsEvent::AmbientOcclusionEnabledChanged(_) => {
                "hoops-render-options-ambient-occlusion-enabled-changed"
            }
            RenderOptionsEvent::AmbientOcclusionRadiusChanged(_) => {
                "hoops-render-options-ambient-occlusion-radius-changed"
            }
            RenderOptionsEvent::AntiAliasingEnabledChanged(_) => {
                "hoops-render-options-anti-aliasing-enabled-changed"
            }
            RenderOptionsEvent::SilhouetteEdgesEnabledChanged(_) => {
                "hoops-render-options-silhouette-edges-enabled-changed"
            }
            RenderOptionsEvent::BackfacesVisibleChanged(_) => {
                "hoops-render-options-backfaces-visible-changed"
            }
            RenderOptionsEvent::BackgroundColorChanged { .. } => {
                "hoops-render-options-background-color-changed"
            }
        }
    }

    fn detail(&self) -> Value {
        match self {
            RenderOptionsEvent::ServiceReset | RenderOptionsEvent::ManagerReset => Value::Null,
            RenderOptionsEvent::DrawModeChanged(mode) => json!(mode),
            RenderOptionsEvent::AmbientOcclusionEnabledChanged(value)
            | RenderOptionsEvent::AntiAliasingEnabledChanged(value)
            | RenderOptionsEvent::SilhouetteEdgesEnabledChanged(value)
            | RenderOptionsEvent::BackfacesVisibleChanged(value) => json!(value),
            RenderOptionsEvent::AmbientOcclusionRadiusChanged(radius) => json!(radius),
            RenderOptionsEvent::BackgroundColorChanged { top, bottom } => {
                json!({ "top": top, "bottom": bottom })
            }
        }
    }
}

/// Render options service.
pub struct RenderOptionsService {
    manager: ManagerSlot<dyn RenderOptionsManager>,
    events: EventEmitter<RenderOptionsEvent>,
}

impl RenderOptionsService {
    pub fn new() -> Self {
        Self {
            manager: ManagerSlot::new(names::RENDER_OPTIONS, "view"),
            events: EventEmitter::new(),
        }
    }

    pub fn with_manager(manager: Rc<dyn RenderOptionsManager>) -> Self {
        let service = Self::new();
        service.set_manager(manager);
        service
    }

    pub fn set_manager(&self, manager: Rc<dyn RenderOptionsManager>) {
        if self.manager.replace(Some(manager), |_| None) {
            self.events.emit(&RenderOptionsEvent::ManagerReset);
        }
    }

    pub fn clear_manager(&self) {
        if self.manager.replace(None, |_| None) {
            self.events.emit(&RenderOptionsEvent::ManagerReset);
        }
    }

    pub fn manager(&self) -> Option<Rc<dyn RenderOptionsManager>> {
        self.manager.get()
    }

    pub fn events(&self) -> &EventEmitter<RenderOptionsEvent> {
        &self.events
    }

    pub fn subscribe(&self, listener: impl Fn(&RenderOptionsEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    fn read<T>(
        &self,
        default: impl FnOnce(RenderOptionsConfiguration) -> T,
        live: impl FnOnce(&dyn RenderOptionsManager) -> T,
    ) -> T {
        match self.manager.get() {
            Some(manager) => live(manager.as_ref()),
            None => default(RenderOptionsConfiguration::default()),
        }
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.read(|d| d.draw_mode, |m| m.draw_mode())
    }

    pub fn ambient_occlusion_enabled(&self) -> bool {
        self.read(|d| d.ambient_occlusion_enabled, |m| m.ambient_occlusion_enabled())
    }

    pub fn ambient_occlusion_radius(&self) -> f64 {
        self.read(|d| d.ambient_occlusion_radius, |m| m.ambient_occlusion_radius())
    }

    pub fn anti_aliasing_enabled(&self) -> bool {
        self.read(|d| d.anti_aliasing_enabled, |m| m.anti_aliasing_enabled())
    }

    pub fn silhouette_edges_enabled(&self) -> bool {
        self.read(|d| d.silhouette_edges_enabled, |m| m.silhouette_edges_enabled())
    }

    pub fn backfaces_visible(&self) -> bool {
        self.read(|d| d.backfaces_visible, |m| m.backfaces_visible())
    }

    pub fn top_background_color(&self) -> Rgb {
        self.read(|d| d.top_background_color, |m| m.background_color().0)
    }

    pub fn bottom_background_color(&self) -> Rgb {
        self.read(|d| d.bottom_background_color, |m| m.background_color().1)
    }

    pub async fn set_draw_mode(&self, mode: DrawMode) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.draw_mode() == mode {
            return Ok(());
        }
        manager.set_draw_mode(mode).await?;
        log::debug!("Draw mode set to {}", mode);
        self.events.emit(&RenderOptionsEvent::DrawModeChanged(mode));
        Ok(())
    }

    pub async fn set_ambient_occlusion_enabled(&self, enabled: bool) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.ambient_occlusion_enabled() == enabled {
            return Ok(());
        }
        manager.set_ambient_occlusion_enabled(enabled).await?;
        self.events
            .emit(&RenderOptionsEvent::AmbientOcclusionEnabledChanged(enabled));
        Ok(())
    }

    pub async fn set_ambient_occlusion_radius(&self, radius: f64) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        ensure(positive("ambientOcclusionRadius", radius))?;
        if manager.ambient_occlusion_radius() == radius {
            return Ok(());
        }
        manager.set_ambient_occlusion_radius(radius).await?;
        self.events
            .emit(&RenderOptionsEvent::AmbientOcclusionRadiusChanged(radius));
        Ok(())
    }

    pub async fn set_anti_aliasing_enabled(&self, enabled: bool) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.anti_aliasing_enabled() == enabled {
            return Ok(());
        }
        manager.set_anti_aliasing_enabled(enabled).await?;
        self.events
            .emit(&RenderOptionsEvent::AntiAliasingEnabledChanged(enabled));
        Ok(())
    }

    pub async fn set_silhouette_edges_enabled(&self, enabled: bool) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.silhouette_edges_enabled() == enabled {
            return Ok(());
        }
        manager.set_silhouette_edges_enabled(enabled).await?;
        self.events
            .emit(&RenderOptionsEvent::SilhouetteEdgesEnabledChanged(enabled));
        Ok(())
    }

    pub async fn set_backfaces_visible(&self, visible: bool) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.backfaces_visible() == visible {
            return Ok(());
        }
        manager.set_backfaces_visible(visible).await?;
        self.events
            .emit(&RenderOptionsEvent::BackfacesVisibleChanged(visible));
        Ok(())
    }

    pub async fn set_top_background_color(&self, top: Rgb) -> ServiceResult<()> {
        let bottom = self.manager.require()?.background_color().1;
        self.set_background_color(top, bottom).await
    }

    pub async fn set_bottom_background_color(&self, bottom: Rgb) -> ServiceResult<()> {
        let top = self.manager.require()?.background_color().0;
        self.set_background_color(top, bottom).await
    }

    /// Set both gradient stops at once.
    pub async fn set_background_color(&self, top: Rgb, bottom: Rgb) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.background_color() == (top, bottom) {
            return Ok(());
        }
        manager.set_background_color(top, bottom).await?;
        self.events
            .emit(&RenderOptionsEvent::BackgroundColorChanged { top, bottom });
        Ok(())
    }
}

impl Default for RenderOptionsService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for RenderOptionsService {
    fn service_name(&self) -> &str {
        names::RENDER_OPTIONS
    }

    fn as_resettable(&self) -> Option<&dyn DynResettable> {
        Some(self)
    }
}

impl ResettableConfigurationService for RenderOptionsService {
    type Configuration = RenderOptionsConfiguration;

    fn configuration(&self) -> RenderOptionsConfiguration {
        RenderOptionsConfiguration {
            draw_mode: self.draw_mode(),
            ambient_occlusion_enabled: self.ambient_occlusion_enabled(),
            ambient_occlusion_radius: self.ambient_occlusion_radius(),
            anti_aliasing_enabled: self.anti_aliasing_enabled(),
            silhouette_edges_enabled: self.silhouette_edges_enabled(),
            backfaces_visible: self.backfaces_visible(),
            top_background_color: self.top_background_color(),
            bottom_background_color: self.bottom_background_color(),
        }
    }

    fn apply_configuration<'a>(
        &'a self,
        config: &'a RenderOptionsConfiguration,
    ) -> BoxFuture<'a, ServiceResult<()>> {
        Box::pin(async move {
            self.set_draw_mode(config.draw_mode).await?;
            self.set_ambient_occlusion_enabled(config.ambient_occlusion_enabled)
                .await?;
            self.set_ambient_occlusion_radius(config.ambient_occlusion_radius)
                .await?;
            self.set_anti_aliasing_enabled(config.anti_aliasing_enabled)
                .await?;
            self.set_silhouette_edges_enabled(config.silhouette_edges_enabled)
                .await?;
            self.set_backfaces_visible(config.backfaces_visible).await?;
            self.set_top_background_color(config.top_background_color)
                .await?;
            self.set_bottom_background_color(config.bottom_background_color)
                .await?;
            self.events.emit(&RenderOptionsEvent::ServiceReset);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::event::EventLog;
    use crate::memory::MemoryRenderOptionsManager;
    use pollster::block_on;

    fn bound() -> (Rc<MemoryRenderOptionsManager>, RenderOptionsService) {
        let manager = Rc::new(MemoryRenderOptionsManager::new());
        let service = RenderOptionsService::with_manager(manager.clone());
        (manager, service)
    }

    #[test]
    fn test_defaults_without_manager() {
        let service = RenderOptionsService::new();
        assert_eq!(service.draw_mode(), DrawMode::WireframeOnShaded);
        assert!(service.anti_aliasing_enabled());
        assert_eq!(service.bottom_background_color(), Rgb::WHITE);
    }

    #[test]
    fn test_setters_without_manager_fail() {
        let service = RenderOptionsService::new();
        for result in [
            block_on(service.set_draw_mode(DrawMode::XRay)),
            block_on(service.set_backfaces_visible(true)),
            block_on(service.set_top_background_color(Rgb::BLACK)),
        ] {
            assert!(matches!(result, Err(ServiceError::NotInitialized { dependency: "view", .. })));
        }
    }

    #[test]
    fn test_set_draw_mode_is_idempotent() {
        let (manager, service) = bound();
        let log = EventLog::attach(service.events());

        block_on(service.set_draw_mode(DrawMode::HiddenLine)).unwrap();
        block_on(service.set_draw_mode(DrawMode::HiddenLine)).unwrap();

        assert_eq!(manager.log().calls(), vec!["set_draw_mode(Hidden Line)".to_string()]);
        assert_eq!(log.events(), vec![RenderOptionsEvent::DrawModeChanged(DrawMode::HiddenLine)]);
        assert_eq!(log.events()[0].detail(), json!("Hidden Line"));
    }

    #[test]
    fn test_background_stops_are_set_together() {
        let (manager, service) = bound();
        let log = EventLog::attach(service.events());

        block_on(service.set_top_background_color(Rgb::BLACK)).unwrap();

        assert_eq!(service.top_background_color(), Rgb::BLACK);
        assert_eq!(service.bottom_background_color(), Rgb::WHITE);
        assert_eq!(manager.log().count_of("set_background_color"), 1);
        assert_eq!(
            log.events()[0].detail(),
            json!({"top": "#000000", "bottom": "#ffffff"})
        );
    }

    #[test]
    fn test_reset_round_trip() {
        let (_manager, service) = bound();
        let config = RenderOptionsConfiguration {
            draw_mode: DrawMode::Toon,
            ambient_occlusion_enabled: true,
            ambient_occlusion_radius: 0.2,
            anti_aliasing_enabled: false,
            silhouette_edges_enabled: true,
            backfaces_visible: true,
            top_background_color: Rgb::new(1, 1, 1),
            bottom_background_color: Rgb::new(2, 2, 2),
        };

        block_on(service.reset_configuration(Some(config.clone()))).unwrap();
        assert_eq!(service.configuration(), config);
    }

    #[test]
    fn test_invalid_radius_rejected_before_any_call() {
        let (manager, service) = bound();
        let config = RenderOptionsConfiguration {
            draw_mode: DrawMode::Shaded,
            ambient_occlusion_radius: 0.0,
            ..Default::default()
        };

        let result = block_on(service.reset_configuration(Some(config)));
        assert!(matches!(result, Err(ServiceError::InvalidConfiguration(_))));
        assert!(manager.log().is_empty());
    }

    #[test]
    fn test_configuration_guard() {
        let mut value = RenderOptionsConfiguration::default().to_value();
        assert!(is_render_options_configuration(&value));
        value["drawMode"] = json!("Sketchy");
        assert!(!is_render_options_configuration(&value));
    }
}
