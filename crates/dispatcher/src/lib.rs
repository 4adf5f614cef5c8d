//! # Dispatcher
//!
//! Event fan-out module.
//!
//! Responsibilities:
//! - Resolve configured descriptors into a chain of live sinks
//! - Fan out every published `InstanceEvent` to all chain members in order
//! - Provide the process-wide, lazily-built channel handle
//! - Isolate slow sinks behind bounded queues so publishers never block

pub mod composite;
pub mod error;
pub mod global;
pub mod metrics;
pub mod sinks;
pub mod worker;

pub use composite::{create_channel, ChannelBuilder, CompositeChannel};
pub use contracts::{EventChannelConfig, EventSink, InstanceEvent, PluginEntry};
pub use error::DispatcherError;
pub use global::{event_channel, try_event_channel, LazyChannel};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{register_builtin, FileSink, LogSink, MockSink, NetworkSink};
pub use worker::SinkWorker;
