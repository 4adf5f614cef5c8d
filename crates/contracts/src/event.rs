//! InstanceEvent - the payload broadcast through the event channel
//!
//! Describes a single instance-level change in the discovery state. The
//! channel forwards events verbatim; only sinks interpret them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Instance lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceEvent {
    /// Unique event id
    pub id: String,

    /// Namespace the service lives in
    pub namespace: String,

    /// Service name
    pub service: String,

    /// The instance this event is about
    pub instance: InstanceRef,

    /// What happened to the instance
    pub event_type: EventType,

    /// Event creation time
    pub create_time: DateTime<Utc>,
}

/// Reference to a registered service instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRef {
    /// Instance id
    pub id: String,

    /// Instance host (IP or hostname)
    pub host: String,

    /// Instance port
    pub port: u16,

    /// Instance metadata (labels, zone, protocol, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Instance event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Instance registered and came online
    InstanceOnline,
    /// Instance deregistered and went offline
    InstanceOffline,
    /// Health check turned the instance healthy
    InstanceTurnHealthy,
    /// Health check turned the instance unhealthy
    InstanceTurnUnhealthy,
    /// Instance was isolated by an operator
    InstanceOpenIsolate,
    /// Instance isolation was lifted
    InstanceCloseIsolate,
}

impl EventType {
    /// Stable label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InstanceOnline => "instance_online",
            Self::InstanceOffline => "instance_offline",
            Self::InstanceTurnHealthy => "instance_turn_healthy",
            Self::InstanceTurnUnhealthy => "instance_turn_unhealthy",
            Self::InstanceOpenIsolate => "instance_open_isolate",
            Self::InstanceCloseIsolate => "instance_close_isolate",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
