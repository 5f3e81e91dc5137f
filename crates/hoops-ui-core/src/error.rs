//! Error types shared by the registry and the services.

use thiserror::Error;

use crate::config::ConfigurationError;

/// Errors raised by external viewer managers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManagerError {
    #[error("Manager rejected {operation}: {reason}")]
    Rejected { operation: String, reason: String },
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type for manager calls.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors raised by services and the service registry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// A manager-backed operation ran before a manager was bound.
    #[error("{service}: {dependency} manager is not initialized")]
    NotInitialized {
        service: &'static str,
        dependency: &'static str,
    },
    #[error(transparent)]
    InvalidConfiguration(#[from] ConfigurationError),
    #[error("Service not registered: {0}")]
    NotRegistered(String),
    #[error("Invalid service: a service name is required")]
    InvalidService,
    #[error("Service {name} is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Manager(#[from] ManagerError),
}

/// Result type for service and registry operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
