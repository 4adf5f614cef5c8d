//! PluginRegistry - name to singleton instance mapping

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use contracts::{EventSink, HealthChecker};
use tracing::debug;

use crate::error::RegistryError;

/// A registered plugin, tagged by capability
#[derive(Clone)]
pub enum Plugin {
    /// Event sink plugin
    EventSink(Arc<dyn EventSink>),
    /// Health checker plugin
    HealthChecker(Arc<dyn HealthChecker>),
}

impl Plugin {
    /// Plugin name as declared by the instance
    pub fn name(&self) -> String {
        match self {
            Self::EventSink(sink) => sink.name().to_string(),
            Self::HealthChecker(checker) => checker.name().to_string(),
        }
    }

    /// Capability label (used for diagnostics)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EventSink(_) => "event_sink",
            Self::HealthChecker(_) => "health_checker",
        }
    }
}

/// Outcome of an event-sink lookup
pub enum SinkLookup {
    /// Name is registered with the event-sink capability
    Found(Arc<dyn EventSink>),
    /// Name is registered, but under a different capability
    WrongCapability { kind: &'static str },
    /// Name is not registered at all
    Absent,
}

/// Process-scoped plugin registry
///
/// Populated during bootstrap, read-only afterwards.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<HashMap<String, Plugin>>,
}

impl PluginRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin under its declared name
    ///
    /// # Errors
    /// Returns `RegistryError::Duplicate` when the name is taken.
    pub fn register(&self, plugin: Plugin) -> Result<(), RegistryError> {
        let name = plugin.name();
        let kind = plugin.kind();

        let mut plugins = self.plugins.write().expect("registry lock poisoned");
        if let Some(existing) = plugins.get(&name) {
            return Err(RegistryError::Duplicate {
                name,
                kind: existing.kind(),
            });
        }

        debug!(plugin = %name, kind, "plugin registered");
        plugins.insert(name, plugin);
        Ok(())
    }

    /// Register an event sink singleton
    pub fn register_event_sink(&self, sink: Arc<dyn EventSink>) -> Result<(), RegistryError> {
        self.register(Plugin::EventSink(sink))
    }

    /// Register a health checker singleton
    pub fn register_health_checker(
        &self,
        checker: Arc<dyn HealthChecker>,
    ) -> Result<(), RegistryError> {
        self.register(Plugin::HealthChecker(checker))
    }

    /// Look up a name expecting the event-sink capability
    pub fn lookup_event_sink(&self, name: &str) -> SinkLookup {
        let plugins = self.plugins.read().expect("registry lock poisoned");
        match plugins.get(name) {
            Some(Plugin::EventSink(sink)) => SinkLookup::Found(Arc::clone(sink)),
            Some(other) => SinkLookup::WrongCapability { kind: other.kind() },
            None => SinkLookup::Absent,
        }
    }

    /// Whether any plugin is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.plugins
            .read()
            .expect("registry lock poisoned")
            .contains_key(name)
    }

    /// Names of all registered plugins, sorted
    pub fn plugin_names(&self) -> Vec<String> {
        let plugins = self.plugins.read().expect("registry lock poisoned");
        let mut names: Vec<String> = plugins.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contracts::{ContractError, InstanceEvent, InstanceRef, PluginEntry};

    struct NoopSink;

    #[async_trait]
    impl EventSink for NoopSink {
        fn name(&self) -> &str {
            "noop"
        }

        async fn initialize(&self, _entry: &PluginEntry) -> Result<(), ContractError> {
            Ok(())
        }

        async fn destroy(&self) -> Result<(), ContractError> {
            Ok(())
        }

        fn publish_event(&self, _event: &InstanceEvent) {}
    }

    struct NoopChecker;

    #[async_trait]
    impl HealthChecker for NoopChecker {
        fn name(&self) -> &str {
            "probe"
        }

        async fn initialize(&self, _entry: &PluginEntry) -> Result<(), ContractError> {
            Ok(())
        }

        async fn destroy(&self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn check_instance(&self, _instance: &InstanceRef) -> Result<bool, ContractError> {
            Ok(true)
        }
    }

    #[test]
    fn test_register_and_lookup_sink() {
        let registry = PluginRegistry::new();
        registry.register_event_sink(Arc::new(NoopSink)).unwrap();

        match registry.lookup_event_sink("noop") {
            SinkLookup::Found(sink) => assert_eq!(sink.name(), "noop"),
            _ => panic!("expected Found"),
        }
    }

    #[test]
    fn test_lookup_absent() {
        let registry = PluginRegistry::new();
        assert!(matches!(
            registry.lookup_event_sink("missing"),
            SinkLookup::Absent
        ));
    }

    #[test]
    fn test_lookup_wrong_capability() {
        let registry = PluginRegistry::new();
        registry
            .register_health_checker(Arc::new(NoopChecker))
            .unwrap();

        match registry.lookup_event_sink("probe") {
            SinkLookup::WrongCapability { kind } => assert_eq!(kind, "health_checker"),
            _ => panic!("expected WrongCapability"),
        }
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let registry = PluginRegistry::new();
        registry.register_event_sink(Arc::new(NoopSink)).unwrap();

        let result = registry.register_event_sink(Arc::new(NoopSink));
        assert!(matches!(result, Err(RegistryError::Duplicate { .. })));
    }

    #[test]
    fn test_plugin_names_sorted() {
        let registry = PluginRegistry::new();
        registry
            .register_health_checker(Arc::new(NoopChecker))
            .unwrap();
        registry.register_event_sink(Arc::new(NoopSink)).unwrap();

        assert_eq!(registry.plugin_names(), vec!["noop", "probe"]);
    }
}
