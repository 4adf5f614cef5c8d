//! FileSink - appends events as JSON lines to a local file

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use contracts::{ContractError, EventSink, InstanceEvent, PluginEntry};

use crate::metrics::MetricsSnapshot;
use crate::worker::{EventWriter, SinkWorker};

const DEFAULT_OUTPUT_PATH: &str = "./discover-events.jsonl";
const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output file path (JSON lines)
    pub output_path: PathBuf,
    /// Event queue capacity
    pub queue_capacity: usize,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let output_path = params
            .get("output_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

        let queue_capacity = params
            .get("queue_capacity")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_QUEUE_CAPACITY);

        Self {
            output_path,
            queue_capacity,
        }
    }
}

/// Sink that persists events to a local JSON-lines file
#[derive(Default)]
pub struct FileSink {
    worker: RwLock<Option<SinkWorker>>,
}

impl FileSink {
    /// Create a new, unconfigured FileSink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot worker metrics, if initialized
    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.worker
            .read()
            .expect("file sink lock poisoned")
            .as_ref()
            .map(|w| w.metrics().snapshot())
    }
}

/// Buffered writer driven by the sink worker
struct FileWriter {
    name: String,
    writer: BufWriter<File>,
}

impl FileWriter {
    fn open(name: &str, path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            name: name.to_string(),
            writer: BufWriter::new(file),
        })
    }
}

impl EventWriter for FileWriter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, event: &InstanceEvent) -> Result<(), ContractError> {
        serde_json::to_writer(&mut self.writer, event)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer.flush()?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.writer.flush()?;
        debug!(sink = %self.name, "FileWriter closed");
        Ok(())
    }
}

#[async_trait]
impl EventSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    #[instrument(name = "file_sink_initialize", skip(self, entry))]
    async fn initialize(&self, entry: &PluginEntry) -> Result<(), ContractError> {
        let config = FileSinkConfig::from_params(&entry.params);

        let mut guard = self.worker.write().expect("file sink lock poisoned");
        if guard.is_some() {
            return Err(ContractError::sink_init("file", "already initialized"));
        }

        let writer = FileWriter::open("file", &config.output_path)
            .map_err(|e| ContractError::sink_init("file", e.to_string()))?;

        info!(
            sink = "file",
            path = %config.output_path.display(),
            queue_capacity = config.queue_capacity,
            "FileSink initialized"
        );
        *guard = Some(SinkWorker::spawn(writer, config.queue_capacity));
        Ok(())
    }

    #[instrument(name = "file_sink_destroy", skip(self))]
    async fn destroy(&self) -> Result<(), ContractError> {
        let worker = self.worker.write().expect("file sink lock poisoned").take();
        if let Some(worker) = worker {
            worker.shutdown().await;
            info!(sink = "file", "FileSink closed");
        }
        Ok(())
    }

    fn publish_event(&self, event: &InstanceEvent) {
        let guard = self.worker.read().expect("file sink lock poisoned");
        match guard.as_ref() {
            Some(worker) => {
                worker.try_publish(event.clone());
            }
            None => warn!(sink = "file", event_id = %event.id, "publish before initialize, event discarded"),
        }
    }
}
