use std::cell::Cell;

use super::CallLog;
use crate::color::Rgb;
use crate::error::ManagerResult;
use crate::service::BoxFuture;
use crate::services::render_options::{DrawMode, RenderOptionsConfiguration, RenderOptionsManager};

/// In-memory view settings.
pub struct MemoryRenderOptionsManager {
    draw_mode: Cell<DrawMode>,
    ambient_occlusion_enabled: Cell<bool>,
    ambient_occlusion_radius: Cell<f64>,
    anti_aliasing_enabled: Cell<bool>,
    silhouette_edges_enabled: Cell<bool>,
    backfaces_visible: Cell<bool>,
    background: Cell<(Rgb, Rgb)>,
    log: CallLog,
}

impl MemoryRenderOptionsManager {
    pub fn new() -> Self {
        let defaults = RenderOptionsConfiguration::default();
        Self {
            draw_mode: Cell::new(defaults.draw_mode),
            ambient_occlusion_enabled: Cell::new(defaults.ambient_occlusion_enabled),
            ambient_occlusion_radius: Cell::new(defaults.ambient_occlusion_radius),
            anti_aliasing_enabled: Cell::new(defaults.anti_aliasing_enabled),
            silhouette_edges_enabled: Cell::new(defaults.silhouette_edges_enabled),
            backfaces_visible: Cell::new(defaults.backfaces_visible),
            background: Cell::new((
                defaults.top_background_color,
                defaults.bottom_background_color,
            )),
            log: CallLog::new(),
        }
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

impl Default for MemoryRenderOptionsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderOptionsManager for MemoryRenderOptionsManager {
    fn draw_mode(&self) -> DrawMode {
        self.draw_mode.get()
    }

    fn set_draw_mode(&self, mode: DrawMode) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_draw_mode", mode)?;
            self.draw_mode.set(mode);
            Ok(())
        })
    }

    fn ambient_occlusion_enabled(&self) -> bool {
        self.ambient_occlusion_enabled.get()
    }

    fn set_ambient_occlusion_enabled(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_ambient_occlusion_enabled", enabled)?;
            self.ambient_occlusion_enabled.set(enabled);
            Ok(())
        })
    }

    fn ambient_occlusion_radius(&self) -> f64 {
        self.ambient_occlusion_radius.get()
    }

    fn set_ambient_occlusion_radius(&self, radius: f64) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_ambient_occlusion_radius", radius)?;
            self.ambient_occlusion_radius.set(radius);
            Ok(())
        })
    }

    fn anti_aliasing_enabled(&self) -> bool {
        self.anti_aliasing_enabled.get()
    }

    fn set_anti_aliasing_enabled(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_anti_aliasing_enabled", enabled)?;
            self.anti_aliasing_enabled.set(enabled);
            Ok(())
        })
    }

    fn silhouette_edges_enabled(&self) -> bool {
        self.silhouette_edges_enabled.get()
    }

    fn set_silhouette_edges_enabled(&self, enabled: bool) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_silhouette_edges_enabled", enabled)?;
            self.silhouette_edges_enabled.set(enabled);
            Ok(())
        })
    }

    fn backfaces_visible(&self) -> bool {
        self.backfaces_visible.get()
    }

    fn set_backfaces_visible(&self, visible: bool) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log.record("set_backfaces_visible", visible)?;
            self.backfaces_visible.set(visible);
            Ok(())
        })
    }

    fn background_color(&self) -> (Rgb, Rgb) {
        self.background.get()
    }

    fn set_background_color(&self, top: Rgb, bottom: Rgb) -> BoxFuture<'_, ManagerResult<()>> {
        Box::pin(async move {
            self.log
                .record("set_background_color", format_args!("{top}, {bottom}"))?;
            self.background.set((top, bottom));
            Ok(())
        })
    }
}
