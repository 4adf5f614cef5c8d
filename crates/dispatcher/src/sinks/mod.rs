//! Sink implementations
//!
//! Contains LogSink, FileSink, NetworkSink, and the MockSink test double.

mod file;
mod log;
mod mock;
mod network;

pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::mock::MockSink;
pub use self::network::{NetworkSink, NetworkSinkConfig, WireFormat};

use std::sync::Arc;

use registry::{PluginRegistry, RegistryError};

/// Register the built-in sink singletons
///
/// Called once during bootstrap, before the channel is resolved. Sinks are
/// registered uninitialized; only descriptors that name them trigger
/// `initialize`.
pub fn register_builtin(registry: &PluginRegistry) -> Result<(), RegistryError> {
    registry.register_event_sink(Arc::new(LogSink::new()))?;
    registry.register_event_sink(Arc::new(FileSink::new()))?;
    registry.register_event_sink(Arc::new(NetworkSink::new()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_builtin_names() {
        let registry = PluginRegistry::new();
        register_builtin(&registry).unwrap();
        assert_eq!(registry.plugin_names(), vec!["file", "log", "network"]);
    }

    #[test]
    fn test_register_builtin_twice_fails() {
        let registry = PluginRegistry::new();
        register_builtin(&registry).unwrap();
        assert!(register_builtin(&registry).is_err());
    }
}
