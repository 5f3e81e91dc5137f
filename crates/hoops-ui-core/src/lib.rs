//! HOOPS UI Core Library
//!
//! Service registry and the configuration services that wrap the per-feature
//! managers of a 3D viewer. UI consumers look services up by name, observe
//! their events and change viewer state only through service setters.

pub mod color;
pub mod config;
pub mod error;
pub mod event;
pub mod memory;
pub mod registry;
pub mod service;
pub mod services;

pub use color::{Rgb, parse_css_color};
pub use config::{Configuration, ConfigurationError, Violation};
pub use error::{ManagerError, ManagerResult, ServiceError, ServiceResult};
pub use event::{EventEmitter, EventLog, ServiceEvent, Subscription};
pub use memory::MemoryViewer;
pub use registry::ServiceRegistry;
pub use service::{
    BoxFuture, DynResettable, ResettableConfigurationService, Service, ServiceName, names,
};
