//! Camera service: projection, orbit behavior and view transitions.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::rc::Rc;

use crate::config::{Configuration, FieldSpec, Violation, ensure, literal_enum, non_negative};
use crate::error::{ManagerResult, ServiceResult};
use crate::event::{EventEmitter, ServiceEvent, Subscription};
use crate::service::{
    BoxFuture, DynResettable, ManagerSlot, ResettableConfigurationService, Service, names,
};

literal_enum! {
    pub enum Projection {
        Orthographic => "Orthographic",
        Perspective => "Perspective",
    }
    default Orthographic
}

impl Projection {
    /// The other projection.
    pub fn toggled(self) -> Self {
        match self {
            Projection::Orthographic => Projection::Perspective,
            Projection::Perspective => Projection::Orthographic,
        }
    }
}

literal_enum! {
    /// Orbit center used when the pointer is not over geometry.
    pub enum OrbitFallback {
        ModelCenter => "Model Center",
        CameraTarget => "Camera Target",
        OrbitTarget => "Orbit Target",
    }
    default ModelCenter
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConfiguration {
    pub projection: Projection,
    pub orbit_fallback: OrbitFallback,
    /// Milliseconds.
    pub transition_duration: f64,
}

impl Default for CameraConfiguration {
    fn default() -> Self {
        Self {
            projection: Projection::Orthographic,
            orbit_fallback: OrbitFallback::ModelCenter,
            transition_duration: 400.0,
        }
    }
}

impl Configuration for CameraConfiguration {
    const SERVICE: &'static str = names::CAMERA;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::literal("projection", Projection::NAMES),
        FieldSpec::literal("orbitFallback", OrbitFallback::NAMES),
        FieldSpec::number("transitionDuration"),
    ];

    fn violations(&self) -> Vec<Violation> {
        non_negative("transitionDuration", self.transition_duration)
            .into_iter()
            .collect()
    }
}

pub fn is_camera_configuration(value: &Value) -> bool {
    CameraConfiguration::matches(value)
}

/// Viewer-side camera controller.
pub trait CameraManager {
    fn projection(&self) -> Projection;
    fn set_projection(&self, projection: Projection) -> BoxFuture<'_, ManagerResult<()>>;
    fn orbit_fallback(&self) -> OrbitFallback;
    fn set_orbit_fallback(&self, fallback: OrbitFallback) -> BoxFuture<'_, ManagerResult<()>>;
    fn transition_duration(&self) -> f64;
    fn set_transition_duration(&self, duration: f64) -> BoxFuture<'_, ManagerResult<()>>;
    /// Frame the whole model, animating over `duration` milliseconds.
    fn fit_world(&self, duration: f64) -> BoxFuture<'_, ManagerResult<()>>;
    /// Return to the model's home view.
    fn reset(&self, duration: f64) -> BoxFuture<'_, ManagerResult<()>>;
    fn subscribe(&self, listener: Box<dyn Fn(&CameraSignal)>) -> Subscription;
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraSignal {
    ProjectionChanged(Projection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    ServiceReset,
    ManagerReset,
    ProjectionChanged(Projection),
    OrbitFallbackChanged(OrbitFallback),
    TransitionDurationChanged(f64),
}

impl ServiceEvent for CameraEvent {
    fn name(&self) -> &'static str {
        match self {
            CameraEvent::ServiceReset => "hoops-camera-service-reset",
            CameraEvent::ManagerReset => "hoops-camera-manager-reset",
            CameraEvent::ProjectionChanged(_) => "hoops-camera-projection-changed",
            CameraEvent::OrbitFallbackChanged(_) => "hoops-camera-orbit-fallback-changed",
            CameraEvent::TransitionDurationChanged(_) => "hoops-camera-transition-duration-changed",
        }
    }

    fn detail(&self) -> Value {
        match self {
            CameraEvent::ServiceReset | CameraEvent::ManagerReset => Value::Null,
            CameraEvent::ProjectionChanged(projection) => json!(projection),
            CameraEvent::OrbitFallbackChanged(fallback) => json!(fallback),
            CameraEvent::TransitionDurationChanged(duration) => json!(duration),
        }
    }
}

pub struct CameraService {
    manager: ManagerSlot<dyn CameraManager>,
    events: EventEmitter<CameraEvent>,
}

impl CameraService {
    pub fn new() -> Self {
        Self {
            manager: ManagerSlot::new(names::CAMERA, "camera"),
            events: EventEmitter::new(),
        }
    }

    pub fn with_manager(manager: Rc<dyn CameraManager>) -> Self {
        let service = Self::new();
        service.set_manager(manager);
        service
    }

    pub fn set_manager(&self, manager: Rc<dyn CameraManager>) {
        self.rebind(Some(manager));
    }

    pub fn clear_manager(&self) {
        self.rebind(None);
    }

    fn rebind(&self, manager: Option<Rc<dyn CameraManager>>) {
        let events = self.events.clone();
        let changed = self.manager.replace(manager, |manager| {
            Some(manager.subscribe(Box::new(move |signal: &CameraSignal| match signal {
                CameraSignal::ProjectionChanged(projection) => {
                    events.emit(&CameraEvent::ProjectionChanged(*projection))
                }
            })))
        });
        if changed {
            self.events.emit(&CameraEvent::ManagerReset);
        }
    }

    pub fn manager(&self) -> Option<Rc<dyn CameraManager>> {
        self.manager.get()
    }

    pub fn events(&self) -> &EventEmitter<CameraEvent> {
        &self.events
    }

    pub fn subscribe(&self, listener: impl Fn(&CameraEvent) + 'static) -> Subscription {
        self.events.subscribe(listener)
    }

    pub fn projection(&self) -> Projection {
        self.manager
            .get()
            .map_or(Projection::default(), |manager| manager.projection())
    }

    pub fn orbit_fallback(&self) -> OrbitFallback {
        self.manager
            .get()
            .map_or(OrbitFallback::default(), |manager| manager.orbit_fallback())
    }

    pub fn transition_duration(&self) -> f64 {
        self.manager.get().map_or(
            CameraConfiguration::default().transition_duration,
            |manager| manager.transition_duration(),
        )
    }

    pub async fn set_projection(&self, projection: Projection) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.projection() == projection {
            return Ok(());
        }
        manager.set_projection(projection).await?;
        log::debug!("Camera projection set to {}", projection);
        self.events.emit(&CameraEvent::ProjectionChanged(projection));
        Ok(())
    }

    pub async fn set_orbit_fallback(&self, fallback: OrbitFallback) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        if manager.orbit_fallback() == fallback {
            return Ok(());
        }
        manager.set_orbit_fallback(fallback).await?;
        self.events.emit(&CameraEvent::OrbitFallbackChanged(fallback));
        Ok(())
    }

    pub async fn set_transition_duration(&self, duration: f64) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        ensure(non_negative("transitionDuration", duration))?;
        if manager.transition_duration() == duration {
            return Ok(());
        }
        manager.set_transition_duration(duration).await?;
        self.events
            .emit(&CameraEvent::TransitionDurationChanged(duration));
        Ok(())
    }

    /// Frame the whole model using the configured transition duration.
    pub async fn fit_world(&self) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        manager.fit_world(manager.transition_duration()).await?;
        Ok(())
    }

    pub async fn reset_view(&self) -> ServiceResult<()> {
        let manager = self.manager.require()?;
        manager.reset(manager.transition_duration()).await?;
        Ok(())
    }
}

impl Default for CameraService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for CameraService {
    fn service_name(&self) -> &str {
        names::CAMERA
    }

    fn as_resettable(&self) -> Option<&dyn DynResettable> {
        Some(self)
    }
}

impl ResettableConfigurationService for CameraService {
    type Configuration = CameraConfiguration;

    fn configuration(&self) -> CameraConfiguration {
        CameraConfiguration {
            projection: self.projection(),
            orbit_fallback: self.orbit_fallback(),
            transition_duration: self.transition_duration(),
        }
    }

    fn apply_configuration<'a>(
        &'a self,
        config: &'a CameraConfiguration,
    ) -> BoxFuture<'a, ServiceResult<()>> {
        Box::pin(async move {
            self.set_projection(config.projection).await?;
            self.set_orbit_fallback(config.orbit_fallback).await?;
            self.set_transition_duration(config.transition_duration)
                .await?;
            self.events.emit(&CameraEvent::ServiceReset);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::event::EventLog;
    use crate::memory::MemoryCameraManager;
    use pollster::block_on;

    fn bound() -> (Rc<MemoryCameraManager>, CameraService) {
        let manager = Rc::new(MemoryCameraManager::new());
        let service = CameraService::with_manager(manager.clone());
        (manager, service)
    }

    #[test]
    fn test_projection_toggle() {
        let (manager, service) = bound();
        let log = EventLog::attach(service.events());

        block_on(service.set_projection(service.projection().toggled())).unwrap();

        assert_eq!(service.projection(), Projection::Perspective);
        assert_eq!(manager.log().calls(), vec!["set_projection(Perspective)".to_string()]);
        assert_eq!(log.names(), vec!["hoops-camera-projection-changed"]);
    }

    #[test]
    fn test_viewer_projection_change_forwarded() {
        let (manager, service) = bound();
        let log = EventLog::attach(service.events());

        manager.simulate_projection(Projection::Perspective);

        assert_eq!(log.events(), vec![CameraEvent::ProjectionChanged(Projection::Perspective)]);
    }

    #[test]
    fn test_fit_world_uses_transition_duration() {
        let (manager, service) = bound();
        block_on(service.set_transition_duration(0.0)).unwrap();

        block_on(service.fit_world()).unwrap();
        block_on(service.reset_view()).unwrap();

        assert_eq!(
            manager.log().calls(),
            vec!["set_transition_duration(0)", "fit_world(0)", "reset(0)"]
        );
    }

    #[test]
    fn test_negative_duration_rejected() {
        let (manager, service) = bound();
        let value = json!({
            "projection": "Perspective",
            "orbitFallback": "Orbit Target",
            "transitionDuration": -5,
        });
        let result = block_on(service.reset_from_value(Some(&value)));
        assert!(matches!(result, Err(ServiceError::InvalidConfiguration(_))));
        assert!(manager.log().is_empty());
    }

    #[test]
    fn test_reset_from_value() {
        let (_manager, service) = bound();
        let value = json!({
            "projection": "Perspective",
            "orbitFallback": "Camera Target",
            "transitionDuration": 250.0,
        });

        block_on(service.reset_from_value(Some(&value))).unwrap();

        assert_eq!(service.orbit_fallback(), OrbitFallback::CameraTarget);
        assert_eq!(service.configuration_value(), value);
    }

    #[test]
    fn test_fit_world_requires_manager() {
        let service = CameraService::new();
        assert!(matches!(
            block_on(service.fit_world()),
            Err(ServiceError::NotInitialized { dependency: "camera", .. })
        ));
    }
}
