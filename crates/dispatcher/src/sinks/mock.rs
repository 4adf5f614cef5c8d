//! MockSink - records deliveries for tests

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use contracts::{ContractError, EventSink, InstanceEvent, PluginEntry};

/// Test double sink
///
/// Counts lifecycle calls, records delivered event ids in order, and can
/// be configured to fail `initialize` or `destroy`.
pub struct MockSink {
    name: String,
    fail_init: bool,
    fail_destroy: bool,
    init_count: AtomicU64,
    destroy_count: AtomicU64,
    published: Mutex<Vec<String>>,
    /// Shared cross-sink delivery journal ("name:event_id" per delivery)
    journal: Option<Arc<Mutex<Vec<String>>>>,
}

impl MockSink {
    /// Create a well-behaved mock
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            fail_init: false,
            fail_destroy: false,
            init_count: AtomicU64::new(0),
            destroy_count: AtomicU64::new(0),
            published: Mutex::new(Vec::new()),
            journal: None,
        })
    }

    /// Create a mock whose `initialize` always fails
    pub fn failing_init(name: impl Into<String>) -> Arc<Self> {
        let mut sink = Self::template(name);
        sink.fail_init = true;
        Arc::new(sink)
    }

    /// Create a mock whose `destroy` always fails
    pub fn failing_destroy(name: impl Into<String>) -> Arc<Self> {
        let mut sink = Self::template(name);
        sink.fail_destroy = true;
        Arc::new(sink)
    }

    /// Create a mock appending "name:event_id" to a shared journal
    pub fn with_journal(name: impl Into<String>, journal: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        let mut sink = Self::template(name);
        sink.journal = Some(journal);
        Arc::new(sink)
    }

    fn template(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fail_init: false,
            fail_destroy: false,
            init_count: AtomicU64::new(0),
            destroy_count: AtomicU64::new(0),
            published: Mutex::new(Vec::new()),
            journal: None,
        }
    }

    /// Number of successful `initialize` calls
    pub fn init_count(&self) -> u64 {
        self.init_count.load(Ordering::SeqCst)
    }

    /// Number of `destroy` calls
    pub fn destroy_count(&self) -> u64 {
        self.destroy_count.load(Ordering::SeqCst)
    }

    /// Number of delivered events
    pub fn publish_count(&self) -> u64 {
        self.published.lock().expect("mock lock poisoned").len() as u64
    }

    /// Delivered event ids, in delivery order
    pub fn published_ids(&self) -> Vec<String> {
        self.published.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl EventSink for MockSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self, _entry: &PluginEntry) -> Result<(), ContractError> {
        if self.fail_init {
            return Err(ContractError::sink_init(&self.name, "mock init failure"));
        }
        self.init_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn destroy(&self) -> Result<(), ContractError> {
        self.destroy_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_destroy {
            return Err(ContractError::sink_write(&self.name, "mock destroy failure"));
        }
        Ok(())
    }

    fn publish_event(&self, event: &InstanceEvent) {
        self.published
            .lock()
            .expect("mock lock poisoned")
            .push(event.id.clone());

        if let Some(journal) = &self.journal {
            journal
                .lock()
                .expect("mock lock poisoned")
                .push(format!("{}:{}", self.name, event.id));
        }
    }
}
