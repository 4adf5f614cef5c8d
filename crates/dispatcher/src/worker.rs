//! SinkWorker - manages a sink's writer with isolated queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{ContractError, InstanceEvent};

use crate::metrics::SinkMetrics;

/// Backend writer driven by a sink worker
///
/// Queue-backed sinks implement this for the blocking half of their work;
/// the worker task serializes all writer access.
#[trait_variant::make(EventWriter: Send)]
pub trait LocalEventWriter {
    /// Writer name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one event
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, event: &InstanceEvent) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close writer
    async fn close(&mut self) -> Result<(), ContractError>;
}

/// Handle to a running sink worker
pub struct SinkWorker {
    /// Sink name
    name: String,
    /// Channel to send events to worker
    tx: mpsc::Sender<InstanceEvent>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl SinkWorker {
    /// Create a new SinkWorker and spawn the worker task
    pub fn spawn<W: EventWriter + Send + 'static>(writer: W, queue_capacity: usize) -> Self {
        let name = writer.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(writer, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Hand an event to the worker (non-blocking)
    ///
    /// Returns true if queued, false if queue full (event dropped)
    pub fn try_publish(&self, event: InstanceEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => {
                // Update queue length approximation
                self.metrics.set_queue_len(self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(e)) => {
                self.metrics.inc_dropped_count();
                warn!(
                    sink = %self.name,
                    event_id = %e.id,
                    "Queue full, event dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the sink worker gracefully
    #[instrument(name = "sink_worker_shutdown", skip(self))]
    pub async fn shutdown(self) {
        // Drop sender to signal worker to stop
        drop(self.tx);
        // Wait for worker to finish
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkWorker shutdown complete");
    }
}

/// Worker task that consumes events and drives the writer
#[instrument(
    name = "sink_worker_loop",
    skip(writer, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<W: EventWriter>(
    mut writer: W,
    mut rx: mpsc::Receiver<InstanceEvent>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(event) = rx.recv().await {
        // Update queue length
        metrics.set_queue_len(rx.len());

        match writer.write(&event).await {
            Ok(()) => {
                metrics.inc_published_count();
            }
            Err(e) => {
                metrics.inc_failure_count();
                error!(
                    sink = %name,
                    event_id = %event.id,
                    error = %e,
                    "Write failed"
                );
                // Continue processing - don't crash on single failure
            }
        }
    }

    // Cleanup
    if let Err(e) = writer.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = writer.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::{EventType, InstanceRef};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    fn sample_event(id: u64) -> InstanceEvent {
        InstanceEvent {
            id: format!("evt-{id}"),
            namespace: "default".to_string(),
            service: "checkout".to_string(),
            instance: InstanceRef {
                id: format!("inst-{id}"),
                host: "10.0.0.1".to_string(),
                port: 8080,
                metadata: HashMap::new(),
            },
            event_type: EventType::InstanceOnline,
            create_time: Utc::now(),
        }
    }

    /// Mock writer for testing
    struct MockWriter {
        name: String,
        write_count: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl EventWriter for MockWriter {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&mut self, _event: &InstanceEvent) -> Result<(), ContractError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(ContractError::sink_write(&self.name, "mock failure"));
            }
            self.write_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sink_worker_basic() {
        let write_count = Arc::new(AtomicU64::new(0));
        let writer = MockWriter {
            name: "test".to_string(),
            write_count: Arc::clone(&write_count),
            should_fail: false,
            delay_ms: 0,
        };

        let worker = SinkWorker::spawn(writer, 10);

        for i in 0..5 {
            assert!(worker.try_publish(sample_event(i)));
        }

        worker.shutdown().await;
        assert_eq!(write_count.load(Ordering::Relaxed), 5);
    }

    #[tokio::test]
    async fn test_sink_worker_queue_full() {
        let write_count = Arc::new(AtomicU64::new(0));
        let writer = MockWriter {
            name: "slow".to_string(),
            write_count: Arc::clone(&write_count),
            should_fail: false,
            delay_ms: 100, // Slow writer
        };

        // Small queue capacity
        let worker = SinkWorker::spawn(writer, 2);

        // Send more than queue can hold
        for i in 0..10 {
            worker.try_publish(sample_event(i));
        }

        // Some should have been dropped
        assert!(worker.metrics().dropped_count() > 0);

        worker.shutdown().await;
    }

    #[tokio::test]
    async fn test_sink_worker_failure_isolation() {
        let writer = MockWriter {
            name: "failing".to_string(),
            write_count: Arc::new(AtomicU64::new(0)),
            should_fail: true,
            delay_ms: 0,
        };

        let worker = SinkWorker::spawn(writer, 10);

        for i in 0..3 {
            worker.try_publish(sample_event(i));
        }

        // Give worker time to process
        sleep(Duration::from_millis(50)).await;

        // Should have recorded failures
        assert!(worker.metrics().failure_count() > 0);

        worker.shutdown().await;
    }
}
