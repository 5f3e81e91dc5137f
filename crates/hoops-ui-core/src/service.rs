//! Service abstractions: the named service trait, the manager binding shared by
//! every viewer-backed service, and the resettable configuration capability.

use serde_json::Value;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::config::Configuration;
use crate::error::{ServiceError, ServiceResult};
use crate::event::Subscription;

/// Boxed future for pending manager and service operations.
///
/// Not `Send`: the whole service layer runs on one thread.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Registry key of a service.
pub type ServiceName = &'static str;

/// Names under which the built-in services register.
pub mod names {
    use super::ServiceName;

    pub const CAMERA: ServiceName = "CameraService";
    pub const CUTTING: ServiceName = "CuttingService";
    pub const EXPLODE: ServiceName = "ExplodeService";
    pub const FLOORPLAN: ServiceName = "FloorplanService";
    pub const MEASUREMENT: ServiceName = "MeasurementService";
    pub const PMI: ServiceName = "PmiService";
    pub const REDLINE: ServiceName = "RedlineService";
    pub const RENDER_OPTIONS: ServiceName = "RenderOptionsService";
    pub const SELECTION: ServiceName = "SelectionService";
    pub const SHEET: ServiceName = "SheetService";
    pub const SPACE_MOUSE: ServiceName = "SpaceMouseService";

    /// Every built-in service name.
    pub const ALL: &[ServiceName] = &[
        CAMERA,
        CUTTING,
        EXPLODE,
        FLOORPLAN,
        MEASUREMENT,
        PMI,
        REDLINE,
        RENDER_OPTIONS,
        SELECTION,
        SHEET,
        SPACE_MOUSE,
    ];
}

/// Upcast helper so registry entries can be downcast to their concrete type.
pub trait AsAny: Any {
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}

/// A named capability wrapper around one feature of the viewer.
pub trait Service: AsAny {
    /// Registry key. Must not be empty.
    fn service_name(&self) -> &str;

    /// Type-erased configuration reset, for services that support it.
    fn as_resettable(&self) -> Option<&dyn DynResettable> {
        None
    }
}

/// Connection state between a service and its external manager.
pub enum Binding<M: ?Sized> {
    Disconnected,
    Connected {
        manager: Rc<M>,
        /// Callbacks registered on the manager; dropped on rebind.
        callbacks: Option<Subscription>,
    },
}

impl<M: ?Sized> Binding<M> {
    pub fn is_connected(&self) -> bool {
        matches!(self, Binding::Connected { .. })
    }

    /// The bound manager, if any.
    pub fn manager(&self) -> Option<&Rc<M>> {
        match self {
            Binding::Disconnected => None,
            Binding::Connected { manager, .. } => Some(manager),
        }
    }

    fn is_bound_to(&self, other: &Rc<M>) -> bool {
        self.manager()
            .is_some_and(|current| std::ptr::addr_eq(Rc::as_ptr(current), Rc::as_ptr(other)))
    }
}

impl<M: ?Sized> Default for Binding<M> {
    fn default() -> Self {
        Binding::Disconnected
    }
}

impl<M: ?Sized> fmt::Debug for Binding<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Disconnected => f.write_str("Disconnected"),
            Binding::Connected { callbacks, .. } => f
                .debug_struct("Connected")
                .field("callbacks", &callbacks.is_some())
                .finish(),
        }
    }
}

/// Holds a service's [`Binding`] and enforces the manager-required contract.
pub struct ManagerSlot<M: ?Sized> {
    service: &'static str,
    dependency: &'static str,
    binding: RefCell<Binding<M>>,
}

impl<M: ?Sized> ManagerSlot<M> {
    /// `dependency` names the manager in `NotInitialized` errors.
    pub fn new(service: &'static str, dependency: &'static str) -> Self {
        Self {
            service,
            dependency,
            binding: RefCell::new(Binding::Disconnected),
        }
    }

    /// The bound manager, if any.
    pub fn get(&self) -> Option<Rc<M>> {
        self.binding.borrow().manager().cloned()
    }

    /// The bound manager, or `NotInitialized`.
    pub fn require(&self) -> ServiceResult<Rc<M>> {
        self.get().ok_or(ServiceError::NotInitialized {
            service: self.service,
            dependency: self.dependency,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.binding.borrow().is_connected()
    }

    /// Replace the bound manager.
    ///
    /// `bind` registers callbacks on the new manager. The previous manager's
    /// callbacks are dropped. Returns `false` when `manager` is the one already
    /// bound (or both are `None`), in which case nothing changes.
    pub fn replace(
        &self,
        manager: Option<Rc<M>>,
        bind: impl FnOnce(&Rc<M>) -> Option<Subscription>,
    ) -> bool {
        let unchanged = match (&*self.binding.borrow(), &manager) {
            (Binding::Disconnected, None) => true,
            (binding, Some(next)) => binding.is_bound_to(next),
            _ => false,
        };
        if unchanged {
            return false;
        }

        let next = match manager {
            Some(manager) => {
                let callbacks = bind(&manager);
                Binding::Connected { manager, callbacks }
            }
            None => Binding::Disconnected,
        };

        // Old callbacks are dropped here, after the borrow is released.
        let previous = self.binding.replace(next);
        drop(previous);

        log::debug!(
            "{}: {} manager {}",
            self.service,
            self.dependency,
            if self.is_connected() { "bound" } else { "unbound" }
        );
        true
    }
}

impl<M: ?Sized> fmt::Debug for ManagerSlot<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerSlot")
            .field("service", &self.service)
            .field("binding", &*self.binding.borrow())
            .finish()
    }
}

/// A service whose manager state can be reset from a configuration record.
pub trait ResettableConfigurationService: Service {
    type Configuration: Configuration;

    /// Snapshot of the current values, as a configuration record.
    fn configuration(&self) -> Self::Configuration;

    /// Apply every field in declared order through the service's setters,
    /// then dispatch the service-reset event.
    ///
    /// Fields are applied sequentially; a failure stops the reset and leaves
    /// the already applied fields in place.
    fn apply_configuration<'a>(
        &'a self,
        config: &'a Self::Configuration,
    ) -> BoxFuture<'a, ServiceResult<()>>;

    /// Apply `config`, or the default configuration when `None`.
    fn reset_configuration(
        &self,
        config: Option<Self::Configuration>,
    ) -> BoxFuture<'_, ServiceResult<()>> {
        Box::pin(async move {
            let config = config.unwrap_or_default();
            config.check()?;
            self.apply_configuration(&config).await
        })
    }
}

/// Object-safe view of [`ResettableConfigurationService`] over raw JSON.
pub trait DynResettable {
    /// Validate `config` (or take the default when `None`) and apply it.
    fn reset_from_value<'a>(
        &'a self,
        config: Option<&'a Value>,
    ) -> BoxFuture<'a, ServiceResult<()>>;

    /// Current configuration as a JSON object.
    fn configuration_value(&self) -> Value;
}

impl<T: ResettableConfigurationService> DynResettable for T {
    fn reset_from_value<'a>(
        &'a self,
        config: Option<&'a Value>,
    ) -> BoxFuture<'a, ServiceResult<()>> {
        Box::pin(async move {
            let config = match config {
                Some(value) => T::Configuration::validate(value)?,
                None => T::Configuration::default(),
            };
            self.apply_configuration(&config).await
        })
    }

    fn configuration_value(&self) -> Value {
        self.configuration().to_value()
    }
}

/// Check whether `value` is a valid configuration object for `C`.
pub fn is_configuration<C: Configuration>(value: &Value) -> bool {
    C::matches(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventEmitter;

    trait Counter {
        fn value(&self) -> u32;
    }

    struct Fixed(u32);

    impl Counter for Fixed {
        fn value(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_require_before_binding() {
        let slot: ManagerSlot<dyn Counter> = ManagerSlot::new("TestService", "counter");
        let err = slot.require().err().unwrap();
        assert_eq!(
            err,
            ServiceError::NotInitialized { service: "TestService", dependency: "counter" }
        );
        assert!(err.to_string().contains("counter manager is not initialized"));
    }

    #[test]
    fn test_replace_is_noop_for_same_manager() {
        let slot: ManagerSlot<dyn Counter> = ManagerSlot::new("TestService", "counter");
        let manager: Rc<dyn Counter> = Rc::new(Fixed(3));

        assert!(slot.replace(Some(Rc::clone(&manager)), |_| None));
        assert!(!slot.replace(Some(Rc::clone(&manager)), |_| None));
        assert_eq!(slot.require().unwrap().value(), 3);

        assert!(slot.replace(Some(Rc::new(Fixed(4))), |_| None));
        assert_eq!(slot.require().unwrap().value(), 4);

        assert!(slot.replace(None, |_| None));
        assert!(!slot.replace(None, |_| None));
        assert!(!slot.is_connected());
    }

    #[test]
    fn test_rebind_drops_old_callbacks() {
        let slot: ManagerSlot<dyn Counter> = ManagerSlot::new("TestService", "counter");
        let signals = EventEmitter::<()>::new();

        slot.replace(Some(Rc::new(Fixed(1))), |_| Some(signals.subscribe(|_| {})));
        assert_eq!(signals.listener_count(), 1);

        slot.replace(Some(Rc::new(Fixed(2))), |_| None);
        assert_eq!(signals.listener_count(), 0);
    }
}
