//! CompositeChannel - descriptor resolution and event fan-out

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use contracts::{ContractError, EventChannelConfig, EventSink, InstanceEvent, PluginEntry};
use registry::{PluginRegistry, SinkLookup};

use crate::error::DispatcherError;

/// Name the composite reports when nested or inspected
const COMPOSITE_NAME: &str = "composite";

/// Builder that resolves descriptors into a CompositeChannel
pub struct ChannelBuilder {
    entries: Vec<PluginEntry>,
}

impl ChannelBuilder {
    /// Create a builder over an ordered descriptor sequence
    pub fn new(entries: Vec<PluginEntry>) -> Self {
        Self { entries }
    }

    /// Resolve descriptors against the registry and build the channel
    ///
    /// Resolution runs exactly once, in declared order:
    /// - unregistered name: logged and skipped (soft failure)
    /// - registered under another capability: logged and skipped (soft failure)
    /// - found sink failing `initialize`: aborts the whole build (hard failure)
    ///
    /// No partially-resolved channel is ever observable; the value exists
    /// only on full success.
    #[instrument(
        name = "channel_resolve",
        skip(self, registry),
        fields(entry_count = self.entries.len())
    )]
    pub async fn resolve(self, registry: &PluginRegistry) -> Result<CompositeChannel, DispatcherError> {
        let mut chain: Vec<Arc<dyn EventSink>> = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let sink = match registry.lookup_event_sink(&entry.name) {
                SinkLookup::Absent => {
                    warn!(entry = %entry.name, "no event sink registered under this name, skipping");
                    continue;
                }
                SinkLookup::WrongCapability { kind } => {
                    warn!(
                        entry = %entry.name,
                        registered_as = kind,
                        "plugin is not an event sink, skipping"
                    );
                    continue;
                }
                SinkLookup::Found(sink) => sink,
            };

            sink.initialize(entry)
                .await
                .map_err(|e| DispatcherError::sink_init(&entry.name, e))?;

            debug!(sink = %entry.name, "sink initialized and appended to chain");
            chain.push(sink);
        }

        info!(
            configured = self.entries.len(),
            resolved = chain.len(),
            "event channel resolved"
        );

        Ok(CompositeChannel { chain })
    }
}

/// Fan-out channel over an ordered, immutable chain of resolved sinks
///
/// Implements `EventSink` itself, so callers cannot tell one sink from a
/// composite of many. The chain is frozen at construction; publishing
/// takes no lock.
pub struct CompositeChannel {
    chain: Vec<Arc<dyn EventSink>>,
}

impl CompositeChannel {
    /// Number of resolved chain members
    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }

    /// Chain member names, in chain order
    pub fn sink_names(&self) -> Vec<&str> {
        self.chain.iter().map(|s| s.name()).collect()
    }
}

#[async_trait]
impl EventSink for CompositeChannel {
    fn name(&self) -> &str {
        COMPOSITE_NAME
    }

    /// Resolution happens at construction; nothing left to do here
    async fn initialize(&self, _entry: &PluginEntry) -> Result<(), ContractError> {
        Ok(())
    }

    /// Destroy every chain member, in order
    ///
    /// A member failure does not halt the pass; all members are destroyed
    /// and the first error is returned afterwards.
    async fn destroy(&self) -> Result<(), ContractError> {
        let mut first_error: Option<ContractError> = None;

        for sink in &self.chain {
            if let Err(e) = sink.destroy().await {
                warn!(sink = %sink.name(), error = %e, "sink destroy failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Deliver the event to every chain member, in chain order
    fn publish_event(&self, event: &InstanceEvent) {
        for sink in &self.chain {
            sink.publish_event(event);
        }
    }
}

/// Convenience function to build a channel from its configuration section
#[instrument(name = "channel_create", skip(config, registry))]
pub async fn create_channel(
    config: &EventChannelConfig,
    registry: &PluginRegistry,
) -> Result<CompositeChannel, DispatcherError> {
    ChannelBuilder::new(config.entries()).resolve(registry).await
}
