//! Lazy one-shot channel construction
//!
//! `LazyChannel` is an explicit run-once guard usable as an injected value;
//! the free functions expose one process-wide instance for call sites that
//! want a single global publication point.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use contracts::EventChannelConfig;
use registry::PluginRegistry;

use crate::composite::{create_channel, CompositeChannel};
use crate::error::DispatcherError;

/// One-shot initialization guard around a channel
///
/// Construction runs to completion for exactly one caller under concurrent
/// first access; everyone else waits and receives the same `Arc`. A failed
/// construction leaves the guard empty (the caller is expected to treat
/// that as fatal and stop the process).
pub struct LazyChannel {
    cell: OnceCell<Arc<CompositeChannel>>,
}

impl LazyChannel {
    /// Create an empty guard
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Get the channel, constructing it on first access
    pub async fn get_or_init(
        &self,
        config: &EventChannelConfig,
        registry: &PluginRegistry,
    ) -> Result<&Arc<CompositeChannel>, DispatcherError> {
        self.cell
            .get_or_try_init(|| async {
                info!("building event channel");
                create_channel(config, registry).await.map(Arc::new)
            })
            .await
    }

    /// Get the channel if it has already been constructed
    pub fn get(&self) -> Option<&Arc<CompositeChannel>> {
        self.cell.get()
    }
}

impl Default for LazyChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide channel guard
static EVENT_CHANNEL: LazyChannel = LazyChannel::new();

/// Get the process-wide event channel, constructing it on first access
///
/// All concurrent callers receive the same reference; construction runs
/// exactly once. A hard resolution failure surfaces here and must be
/// treated as fatal by the bootstrap code.
pub async fn event_channel(
    config: &EventChannelConfig,
    registry: &PluginRegistry,
) -> Result<&'static Arc<CompositeChannel>, DispatcherError> {
    EVENT_CHANNEL.get_or_init(config, registry).await
}

/// Get the process-wide event channel if it has been constructed
pub fn try_event_channel() -> Option<&'static Arc<CompositeChannel>> {
    EVENT_CHANNEL.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MockSink;
    use contracts::PluginEntry;

    fn config_naming(names: &[&str]) -> EventChannelConfig {
        EventChannelConfig {
            name: None,
            params: Default::default(),
            entries: names.iter().map(|n| PluginEntry::named(*n)).collect(),
        }
    }

    #[tokio::test]
    async fn test_concurrent_first_access_constructs_once() {
        let lazy = Arc::new(LazyChannel::new());
        let registry = Arc::new(PluginRegistry::new());
        let sink = MockSink::new("logger");
        registry.register_event_sink(sink.clone()).unwrap();
        let config = Arc::new(config_naming(&["logger"]));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let lazy = Arc::clone(&lazy);
            let registry = Arc::clone(&registry);
            let config = Arc::clone(&config);
            handles.push(tokio::spawn(async move {
                let channel = lazy.get_or_init(&config, &registry).await.unwrap();
                Arc::clone(channel)
            }));
        }

        let mut channels = Vec::new();
        for handle in handles {
            channels.push(handle.await.unwrap());
        }

        // Everyone observes the same instance
        for channel in &channels[1..] {
            assert!(Arc::ptr_eq(&channels[0], channel));
        }
        // And the sink was initialized exactly once
        assert_eq!(sink.init_count(), 1);
    }

    #[tokio::test]
    async fn test_get_before_init_is_none() {
        let lazy = LazyChannel::new();
        assert!(lazy.get().is_none());
    }

    #[tokio::test]
    async fn test_failed_init_leaves_guard_empty() {
        let lazy = LazyChannel::new();
        let registry = PluginRegistry::new();
        registry
            .register_event_sink(MockSink::failing_init("broken"))
            .unwrap();

        let result = lazy.get_or_init(&config_naming(&["broken"]), &registry).await;
        assert!(result.is_err());
        assert!(lazy.get().is_none());
    }

    #[tokio::test]
    async fn test_global_accessor_memoizes() {
        let registry = PluginRegistry::new();
        registry
            .register_event_sink(MockSink::new("logger"))
            .unwrap();
        let config = config_naming(&["logger"]);

        let first = event_channel(&config, &registry).await.unwrap();
        let second = event_channel(&config, &registry).await.unwrap();
        assert!(Arc::ptr_eq(first, second));
        assert!(try_event_channel().is_some());
    }
}
