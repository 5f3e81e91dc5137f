//! HOOPS UI application shell.
//!
//! Loads an [`AppConfig`], composes the service registry over an in-memory
//! viewer, applies the configured service settings and builds the toolbar.

pub mod bootstrap;
pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

use hoops_ui_core::services::{CuttingService, DrawMode};
use hoops_ui_core::{MemoryViewer, ServiceRegistry, names};
use hoops_ui_widgets::{ToolbarAction, ToolbarButton};
use serde_json::{Map, Value};

pub struct App {
    config: AppConfig,
    viewer: MemoryViewer,
    registry: ServiceRegistry,
}

impl App {
    /// Compose the registry and apply `config.services`.
    pub async fn start(config: AppConfig) -> AppResult<Self> {
        let viewer = MemoryViewer::new();
        let registry = bootstrap::compose(&viewer, &config)?;
        bootstrap::apply_configurations(&registry, &config).await?;
        log::info!("{} ready", config.title);
        Ok(Self {
            config,
            viewer,
            registry,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn viewer(&self) -> &MemoryViewer {
        &self.viewer
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// One button per action whose service is registered.
    pub fn toolbar(&self) -> Vec<ToolbarButton> {
        let mut actions = Vec::new();
        if self.registry.has(names::EXPLODE) {
            actions.push(ToolbarAction::Explode);
        }
        if self.registry.has(names::FLOORPLAN) {
            actions.push(ToolbarAction::Floorplan);
        }
        if let Some(cutting) = self.registry.try_get::<CuttingService>(names::CUTTING) {
            actions.extend((0..cutting.section_count()).map(ToolbarAction::CuttingSection));
        }
        if self.registry.has(names::CAMERA) {
            actions.push(ToolbarAction::Projection);
        }
        if self.registry.has(names::RENDER_OPTIONS) {
            actions.extend(DrawMode::ALL.iter().copied().map(ToolbarAction::DrawMode));
        }

        actions
            .into_iter()
            .filter_map(|action| match ToolbarButton::new(&self.registry, action) {
                Ok(button) => Some(button),
                Err(e) => {
                    log::warn!("Skipping toolbar button {}: {}", action.label(), e);
                    None
                }
            })
            .collect()
    }

    /// Current configuration of every resettable service, keyed by name.
    pub fn snapshot(&self) -> Value {
        let mut snapshot = Map::new();
        for service in self.registry.get_all() {
            if let Some(resettable) = service.as_resettable() {
                snapshot.insert(
                    service.service_name().to_string(),
                    resettable.configuration_value(),
                );
            }
        }
        Value::Object(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoops_ui_core::memory::MemoryCuttingManager;
    use pollster::block_on;
    use serde_json::json;

    #[test]
    fn test_start_with_defaults() {
        let app = block_on(App::start(AppConfig::default())).unwrap();
        assert_eq!(app.registry().len(), names::ALL.len());

        let snapshot = app.snapshot();
        assert!(snapshot.get(names::MEASUREMENT).is_none());
        assert_eq!(snapshot.as_object().unwrap().len(), names::ALL.len() - 1);
        assert_eq!(
            snapshot[names::EXPLODE],
            json!({"magnitude": 0.0, "active": false})
        );
    }

    #[test]
    fn test_snapshot_reflects_applied_config() {
        let config = AppConfig::from_json(
            r#"{"services": {"CameraService": {"projection": "Perspective",
                "orbitFallback": "Orbit Target", "transitionDuration": 250.0}}}"#,
        )
        .unwrap();
        let app = block_on(App::start(config)).unwrap();

        let camera = &app.snapshot()[names::CAMERA];
        assert_eq!(camera["projection"], json!("Perspective"));
        assert_eq!(camera["transitionDuration"], json!(250.0));
    }

    #[test]
    fn test_toolbar_follows_registry() {
        let app = block_on(App::start(AppConfig::default())).unwrap();
        let toolbar = app.toolbar();
        assert_eq!(
            toolbar.len(),
            3 + MemoryCuttingManager::DEFAULT_SECTIONS + DrawMode::ALL.len()
        );

        let config = AppConfig {
            disabled_services: vec![names::RENDER_OPTIONS.to_string(), names::CUTTING.to_string()],
            ..AppConfig::default()
        };
        let app = block_on(App::start(config)).unwrap();
        let actions: Vec<_> = app.toolbar().iter().map(|b| b.action()).collect();
        assert_eq!(
            actions,
            vec![ToolbarAction::Explode, ToolbarAction::Floorplan, ToolbarAction::Projection]
        );
    }

    #[test]
    fn test_toolbar_drives_viewer() {
        let app = block_on(App::start(AppConfig::default())).unwrap();
        let explode = app
            .toolbar()
            .into_iter()
            .find(|b| b.action() == ToolbarAction::Explode)
            .unwrap();

        block_on(explode.click()).unwrap();

        assert!(explode.is_pressed());
        assert_eq!(app.viewer().explode.log().count_of("start"), 1);
        assert_eq!(app.snapshot()[names::EXPLODE]["active"], json!(true));
    }

    #[test]
    fn test_failed_start() {
        let config = AppConfig::from_json(r#"{"services": {"PmiService": {"color": 3}}}"#).unwrap();
        assert!(matches!(
            block_on(App::start(config)),
            Err(AppError::Service(_))
        ));
    }
}
