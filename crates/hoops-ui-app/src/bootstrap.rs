//! Registry composition and start-up configuration.

use hoops_ui_core::services::{
    CameraService, CuttingService, ExplodeService, FloorplanService, MeasurementService,
    PmiService, RedlineService, RenderOptionsService, SelectionService, SheetService,
    SpaceMouseService,
};
use hoops_ui_core::{MemoryViewer, Service, ServiceRegistry};
use std::rc::Rc;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Every built-in service, bound to the viewer's managers.
fn services(viewer: &MemoryViewer) -> Vec<Rc<dyn Service>> {
    vec![
        Rc::new(CameraService::with_manager(viewer.camera.clone())),
        Rc::new(CuttingService::with_manager(viewer.cutting.clone())),
        Rc::new(ExplodeService::with_manager(viewer.explode.clone())),
        Rc::new(FloorplanService::with_manager(viewer.floorplan.clone())),
        Rc::new(MeasurementService::with_manager(viewer.measurement.clone())),
        Rc::new(PmiService::with_manager(viewer.pmi.clone())),
        Rc::new(RedlineService::with_manager(viewer.redline.clone())),
        Rc::new(RenderOptionsService::with_manager(viewer.render_options.clone())),
        Rc::new(SelectionService::with_manager(viewer.selection.clone())),
        Rc::new(SheetService::with_manager(viewer.sheet.clone())),
        Rc::new(SpaceMouseService::with_manager(viewer.space_mouse.clone())),
    ]
}

/// Build a registry with every service the config does not disable.
pub fn compose(viewer: &MemoryViewer, config: &AppConfig) -> AppResult<ServiceRegistry> {
    let mut registry = ServiceRegistry::new();
    for service in services(viewer) {
        let name = service.service_name().to_string();
        if !config.is_enabled(&name) {
            log::info!("Service {} disabled", name);
            continue;
        }
        registry.register_dyn(service)?;
    }
    log::info!("Registered {} services", registry.len());
    Ok(registry)
}

/// Reset each configured service from its entry in `config.services`.
///
/// Entries are applied in name order. The first failure stops start-up;
/// services applied before it keep their new state.
pub async fn apply_configurations(registry: &ServiceRegistry, config: &AppConfig) -> AppResult<()> {
    for (name, value) in &config.services {
        if !config.is_enabled(name) {
            log::warn!("Ignoring configuration for disabled service {}", name);
            continue;
        }

        let service = registry.get_dyn(name)?;
        let resettable = service
            .as_resettable()
            .ok_or_else(|| AppError::NotResettable(name.clone()))?;
        resettable.reset_from_value(Some(value)).await?;
        log::info!("Applied configuration to {}", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoops_ui_core::{ServiceError, names};
    use pollster::block_on;
    use serde_json::json;

    #[test]
    fn test_compose_registers_everything() {
        let registry = compose(&MemoryViewer::new(), &AppConfig::default()).unwrap();
        assert_eq!(registry.len(), names::ALL.len());
        for name in names::ALL {
            assert!(registry.has(name), "{name}");
        }
    }

    #[test]
    fn test_compose_skips_disabled() {
        let config = AppConfig {
            disabled_services: vec![names::SPACE_MOUSE.to_string(), names::PMI.to_string()],
            ..AppConfig::default()
        };
        let registry = compose(&MemoryViewer::new(), &config).unwrap();

        assert_eq!(registry.len(), names::ALL.len() - 2);
        assert!(!registry.has(names::SPACE_MOUSE));
        assert!(registry.has(names::CAMERA));
    }

    #[test]
    fn test_apply_reaches_the_viewer() {
        let viewer = MemoryViewer::new();
        let config = AppConfig::from_json(
            r##"{"services": {
                "ExplodeService": {"magnitude": 2.5, "active": true},
                "PmiService": {"color": "#ff0000", "colorOverride": true}
            }}"##,
        )
        .unwrap();
        let registry = compose(&viewer, &config).unwrap();

        block_on(apply_configurations(&registry, &config)).unwrap();

        let explode = registry.get::<ExplodeService>(names::EXPLODE).unwrap();
        assert!(explode.is_active());
        assert_eq!(explode.magnitude(), 2.5);
        assert!(viewer.pmi.log().count_of("set_color_override") == 1);
    }

    #[test]
    fn test_invalid_configuration_stops_startup() {
        let viewer = MemoryViewer::new();
        let config = AppConfig::from_json(
            r#"{"services": {"ExplodeService": {"magnitude": -1.0, "active": true}}}"#,
        )
        .unwrap();
        let registry = compose(&viewer, &config).unwrap();

        let err = block_on(apply_configurations(&registry, &config)).unwrap_err();

        assert!(matches!(
            err,
            AppError::Service(ServiceError::InvalidConfiguration(_))
        ));
        assert!(viewer.explode.log().is_empty());
    }

    #[test]
    fn test_measurement_takes_no_configuration() {
        let config = AppConfig {
            services: [(names::MEASUREMENT.to_string(), json!({}))].into_iter().collect(),
            ..AppConfig::default()
        };
        let registry = compose(&MemoryViewer::new(), &config).unwrap();

        assert!(matches!(
            block_on(apply_configurations(&registry, &config)),
            Err(AppError::NotResettable(name)) if name == names::MEASUREMENT
        ));
    }

    #[test]
    fn test_disabled_and_unknown_services() {
        let config = AppConfig {
            services: [(names::SHEET.to_string(), json!({"bogus": 1}))].into_iter().collect(),
            disabled_services: vec![names::SHEET.to_string()],
            ..AppConfig::default()
        };
        let registry = compose(&MemoryViewer::new(), &config).unwrap();
        block_on(apply_configurations(&registry, &config)).unwrap();

        let config = AppConfig {
            services: [("TeleportService".to_string(), json!({}))].into_iter().collect(),
            ..AppConfig::default()
        };
        assert!(matches!(
            block_on(apply_configurations(&registry, &config)),
            Err(AppError::Service(ServiceError::NotRegistered(_)))
        ));
    }
}
