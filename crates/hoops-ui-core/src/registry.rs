//! Service registry.
//!
//! Maps service names to service instances. The registry is an ordinary value
//! owned by the application and passed by reference to whatever needs to look
//! services up, so tests can build as many independent registries as they like.

use std::any::type_name;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{ServiceError, ServiceResult};
use crate::service::Service;

/// Lookup table from service name to service instance.
#[derive(Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Rc<dyn Service>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service under its own name.
    ///
    /// Re-registering the identical instance does nothing. A different instance
    /// under an already registered name replaces the old one.
    pub fn register<S: Service>(&mut self, service: Rc<S>) -> ServiceResult<()> {
        self.register_dyn(service)
    }

    /// [`ServiceRegistry::register`] for an already type-erased service.
    pub fn register_dyn(&mut self, service: Rc<dyn Service>) -> ServiceResult<()> {
        let name = service.service_name().to_string();
        if name.is_empty() {
            return Err(ServiceError::InvalidService);
        }

        if let Some(existing) = self.services.get(&name) {
            if std::ptr::addr_eq(Rc::as_ptr(existing), Rc::as_ptr(&service)) {
                return Ok(());
            }
            log::warn!("Service {} is already registered, replacing it", name);
        } else {
            log::debug!("Registered service {}", name);
        }

        self.services.insert(name, service);
        Ok(())
    }

    /// Remove a service, returning it.
    pub fn unregister(&mut self, name: &str) -> ServiceResult<Rc<dyn Service>> {
        self.services
            .remove(name)
            .ok_or_else(|| ServiceError::NotRegistered(name.to_string()))
    }

    /// Look up a service by name and concrete type.
    pub fn get<T: Service>(&self, name: &str) -> ServiceResult<Rc<T>> {
        let service = self.get_dyn(name)?;
        service.into_any().downcast::<T>().map_err(|_| ServiceError::TypeMismatch {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
    }

    /// Like [`ServiceRegistry::get`], but `None` for a missing or mistyped service.
    pub fn try_get<T: Service>(&self, name: &str) -> Option<Rc<T>> {
        self.get(name).ok()
    }

    /// Look up a service by name without downcasting.
    pub fn get_dyn(&self, name: &str) -> ServiceResult<Rc<dyn Service>> {
        self.services
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::NotRegistered(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// All registered services, ordered by name.
    pub fn get_all(&self) -> Vec<Rc<dyn Service>> {
        self.services.values().cloned().collect()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.services.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Remove every service.
    pub fn clear(&mut self) {
        self.services.clear();
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Service for Named {
        fn service_name(&self) -> &str {
            self.0
        }
    }

    struct Other;

    impl Service for Other {
        fn service_name(&self) -> &str {
            "Named"
        }
    }

    #[test]
    fn test_register_then_get_returns_same_instance() {
        let mut registry = ServiceRegistry::new();
        let service = Rc::new(Named("Named"));
        registry.register(Rc::clone(&service)).unwrap();

        let found: Rc<Named> = registry.get("Named").unwrap();
        assert!(Rc::ptr_eq(&found, &service));
        assert!(registry.has("Named"));
    }

    #[test]
    fn test_empty_name_is_invalid() {
        let mut registry = ServiceRegistry::new();
        let result = registry.register(Rc::new(Named("")));
        assert_eq!(result, Err(ServiceError::InvalidService));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reregister_same_instance_is_noop() {
        let mut registry = ServiceRegistry::new();
        let service = Rc::new(Named("Named"));
        registry.register(Rc::clone(&service)).unwrap();
        registry.register(Rc::clone(&service)).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_replaces_different_instance() {
        let mut registry = ServiceRegistry::new();
        let first = Rc::new(Named("Named"));
        let second = Rc::new(Named("Named"));
        registry.register(Rc::clone(&first)).unwrap();
        registry.register(Rc::clone(&second)).unwrap();

        let found: Rc<Named> = registry.get("Named").unwrap();
        assert!(Rc::ptr_eq(&found, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_then_get_fails() {
        let mut registry = ServiceRegistry::new();
        registry.register(Rc::new(Named("Named"))).unwrap();
        registry.unregister("Named").unwrap();

        let result = registry.get::<Named>("Named");
        assert!(matches!(result, Err(ServiceError::NotRegistered(name)) if name == "Named"));
    }

    #[test]
    fn test_unregister_missing() {
        let mut registry = ServiceRegistry::new();
        assert!(matches!(
            registry.unregister("Nope"),
            Err(ServiceError::NotRegistered(_))
        ));
    }

    #[test]
    fn test_try_get() {
        let mut registry = ServiceRegistry::new();
        assert!(registry.try_get::<Named>("Named").is_none());
        registry.register(Rc::new(Named("Named"))).unwrap();
        assert!(registry.try_get::<Named>("Named").is_some());
    }

    #[test]
    fn test_get_with_wrong_type() {
        let mut registry = ServiceRegistry::new();
        registry.register(Rc::new(Other)).unwrap();
        let result = registry.get::<Named>("Named");
        assert!(matches!(result, Err(ServiceError::TypeMismatch { .. })));
        assert!(registry.try_get::<Named>("Named").is_none());
    }

    #[test]
    fn test_clear_empties_all_lookups() {
        let mut registry = ServiceRegistry::new();
        registry.register(Rc::new(Named("A"))).unwrap();
        registry.register(Rc::new(Named("B"))).unwrap();
        assert_eq!(registry.names(), vec!["A", "B"]);
        assert_eq!(registry.get_all().len(), 2);

        registry.clear();
        assert!(registry.is_empty());
        assert!(!registry.has("A"));
        assert!(registry.get_dyn("B").is_err());
    }

    #[test]
    fn test_registries_are_independent() {
        let mut first = ServiceRegistry::new();
        let second = ServiceRegistry::new();
        first.register(Rc::new(Named("A"))).unwrap();
        assert!(!second.has("A"));
    }
}
