//! NetworkSink - UDP fire-and-forget event streaming

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::{debug, error, info, instrument, warn};

use contracts::{ContractError, EventSink, InstanceEvent, PluginEntry};

use crate::metrics::MetricsSnapshot;
use crate::worker::{EventWriter, SinkWorker};

const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: WireFormat,
    /// Event queue capacity
    pub queue_capacity: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{addr_str}': {e}"))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => WireFormat::Bincode,
            Some("json") | None => WireFormat::Json,
            Some(other) => return Err(format!("unknown format '{other}'")),
        };

        let queue_capacity = params
            .get("queue_capacity")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_QUEUE_CAPACITY);

        Ok(Self {
            addr,
            format,
            queue_capacity,
        })
    }
}

/// Sink that sends events over UDP
#[derive(Default)]
pub struct NetworkSink {
    worker: RwLock<Option<SinkWorker>>,
}

impl NetworkSink {
    /// Create a new, unconfigured NetworkSink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot worker metrics, if initialized
    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.worker
            .read()
            .expect("network sink lock poisoned")
            .as_ref()
            .map(|w| w.metrics().snapshot())
    }
}

/// Datagram writer driven by the sink worker
struct NetWriter {
    name: String,
    socket: UdpSocket,
    format: WireFormat,
}

impl NetWriter {
    fn serialize(&self, event: &InstanceEvent) -> Result<Vec<u8>, String> {
        match self.format {
            WireFormat::Json => serde_json::to_vec(event).map_err(|e| format!("json error: {e}")),
            WireFormat::Bincode => {
                bincode::serialize(event).map_err(|e| format!("bincode error: {e}"))
            }
        }
    }
}

impl EventWriter for NetWriter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, event: &InstanceEvent) -> Result<(), ContractError> {
        let data = self
            .serialize(event)
            .map_err(|e| ContractError::sink_write(&self.name, e))?;

        match self.socket.send(&data).await {
            Ok(sent) => {
                debug!(sink = %self.name, event_id = %event.id, bytes = sent, "Sent");
            }
            Err(e) => {
                // Log but don't fail - UDP is best-effort
                error!(sink = %self.name, error = %e, "UDP send failed");
            }
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        // UDP doesn't buffer
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "NetWriter closed");
        Ok(())
    }
}

#[async_trait]
impl EventSink for NetworkSink {
    fn name(&self) -> &str {
        "network"
    }

    #[instrument(name = "network_sink_initialize", skip(self, entry))]
    async fn initialize(&self, entry: &PluginEntry) -> Result<(), ContractError> {
        let config = NetworkSinkConfig::from_params(&entry.params)
            .map_err(|e| ContractError::sink_init("network", e))?;

        // Bind to any available port
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| ContractError::SinkConnection {
                sink_name: "network".to_string(),
                message: e.to_string(),
            })?;
        socket
            .connect(&config.addr)
            .await
            .map_err(|e| ContractError::SinkConnection {
                sink_name: "network".to_string(),
                message: e.to_string(),
            })?;

        let writer = NetWriter {
            name: "network".to_string(),
            socket,
            format: config.format,
        };

        let mut guard = self.worker.write().expect("network sink lock poisoned");
        if guard.is_some() {
            return Err(ContractError::sink_init("network", "already initialized"));
        }

        info!(
            sink = "network",
            target = %config.addr,
            format = ?config.format,
            "NetworkSink connected"
        );
        *guard = Some(SinkWorker::spawn(writer, config.queue_capacity));
        Ok(())
    }

    #[instrument(name = "network_sink_destroy", skip(self))]
    async fn destroy(&self) -> Result<(), ContractError> {
        let worker = self
            .worker
            .write()
            .expect("network sink lock poisoned")
            .take();
        if let Some(worker) = worker {
            worker.shutdown().await;
            info!(sink = "network", "NetworkSink closed");
        }
        Ok(())
    }

    fn publish_event(&self, event: &InstanceEvent) {
        let guard = self.worker.read().expect("network sink lock poisoned");
        match guard.as_ref() {
            Some(worker) => {
                worker.try_publish(event.clone());
            }
            None => warn!(sink = "network", event_id = %event.id, "publish before initialize, event discarded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::{EventType, InstanceRef};

    fn sample_event() -> InstanceEvent {
        InstanceEvent {
            id: "evt-1".to_string(),
            namespace: "default".to_string(),
            service: "checkout".to_string(),
            instance: InstanceRef {
                id: "inst-1".to_string(),
                host: "10.0.0.1".to_string(),
                port: 8080,
                metadata: HashMap::new(),
            },
            event_type: EventType::InstanceOnline,
            create_time: Utc::now(),
        }
    }

    #[test]
    fn test_network_config_parsing() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "bincode".to_string());

        let config = NetworkSinkConfig::from_params(&params).unwrap();
        assert_eq!(config.addr.port(), 9999);
        assert_eq!(config.format, WireFormat::Bincode);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_network_config_requires_addr() {
        let result = NetworkSinkConfig::from_params(&HashMap::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_network_config_unknown_format() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());
        params.insert("format".to_string(), "xml".to_string());
        assert!(NetworkSinkConfig::from_params(&params).is_err());
    }

    #[tokio::test]
    async fn test_network_sink_publish_without_receiver() {
        let sink = NetworkSink::new();
        let mut entry = PluginEntry::named("network");
        entry
            .params
            .insert("addr".to_string(), "127.0.0.1:19998".to_string());

        // Should succeed even if no receiver (UDP doesn't care)
        sink.initialize(&entry).await.unwrap();
        sink.publish_event(&sample_event());
        sink.destroy().await.unwrap();
    }
}
