//! LogSink - logs event summaries via tracing

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{info, instrument};

use contracts::{ContractError, EventSink, InstanceEvent, PluginEntry};

/// Sink that logs instance events for debugging
#[derive(Debug, Default)]
pub struct LogSink {
    /// Include instance metadata in each line
    detail: AtomicBool,
}

impl LogSink {
    /// Create a new LogSink
    pub fn new() -> Self {
        Self::default()
    }

    fn log_event(&self, event: &InstanceEvent) {
        if self.detail.load(Ordering::Relaxed) {
            info!(
                sink = "log",
                event_id = %event.id,
                event_type = %event.event_type,
                namespace = %event.namespace,
                service = %event.service,
                instance = %event.instance.id,
                host = %event.instance.host,
                port = event.instance.port,
                metadata = ?event.instance.metadata,
                "instance event"
            );
        } else {
            info!(
                sink = "log",
                event_id = %event.id,
                event_type = %event.event_type,
                namespace = %event.namespace,
                service = %event.service,
                instance = %event.instance.id,
                "instance event"
            );
        }
    }
}

#[async_trait]
impl EventSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    #[instrument(name = "log_sink_initialize", skip(self, entry))]
    async fn initialize(&self, entry: &PluginEntry) -> Result<(), ContractError> {
        let detail = matches!(
            entry.params.get("detail").map(String::as_str),
            Some("true" | "1")
        );
        self.detail.store(detail, Ordering::Relaxed);
        info!(sink = "log", detail, "LogSink initialized");
        Ok(())
    }

    #[instrument(name = "log_sink_destroy", skip(self))]
    async fn destroy(&self) -> Result<(), ContractError> {
        info!(sink = "log", "LogSink closed");
        Ok(())
    }

    fn publish_event(&self, event: &InstanceEvent) {
        self.log_event(event);
    }
}
