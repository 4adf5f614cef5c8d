//! EventSink trait - event channel output interface
//!
//! Defines the capability every event sink plugin must satisfy.

use async_trait::async_trait;

use crate::{ContractError, InstanceEvent, PluginEntry};

/// Event sink capability
///
/// Sink instances are registry-owned singletons; the channel only holds
/// shared references, so all methods take `&self`.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Configure the sink from its descriptor
    ///
    /// Called exactly once per instance. A failure is unrecoverable for
    /// that instance.
    ///
    /// # Errors
    /// Returns init error (should include context)
    async fn initialize(&self, entry: &PluginEntry) -> Result<(), ContractError>;

    /// Release resources
    ///
    /// Called at most once, normally at shutdown.
    async fn destroy(&self) -> Result<(), ContractError>;

    /// Deliver one event
    ///
    /// Fire-and-forget: must not block the caller and has no failure
    /// signal. Safe to call concurrently.
    fn publish_event(&self, event: &InstanceEvent);
}
