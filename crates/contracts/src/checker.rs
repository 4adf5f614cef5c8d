//! HealthChecker trait - instance health probing interface

use async_trait::async_trait;

use crate::{ContractError, InstanceRef, PluginEntry};

/// Health checker capability
///
/// A second plugin kind sharing the registry with event sinks. A checker
/// registered under a name an event-channel descriptor references must be
/// skipped during resolution, not invoked.
#[async_trait]
pub trait HealthChecker: Send + Sync {
    /// Checker name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Configure the checker from its descriptor
    async fn initialize(&self, entry: &PluginEntry) -> Result<(), ContractError>;

    /// Release resources
    async fn destroy(&self) -> Result<(), ContractError>;

    /// Probe one instance, returning whether it is healthy
    async fn check_instance(&self, instance: &InstanceRef) -> Result<bool, ContractError>;
}
