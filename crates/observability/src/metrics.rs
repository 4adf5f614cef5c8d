//! Event publication metrics
//!
//! Prometheus counters/gauges for the event channel, plus a process-local
//! aggregator for end-of-run summaries.

use std::collections::HashMap;

use contracts::EventType;
use metrics::{counter, gauge};

/// Record one event published through the channel
///
/// Call once per `publish_event` on the composite; `fanout` is the number
/// of chain members that received the event.
pub fn record_event_published(event_type: EventType, fanout: usize) {
    counter!("discover_relay_events_published_total", "event_type" => event_type.as_str())
        .increment(1);
    counter!("discover_relay_event_deliveries_total").increment(fanout as u64);
}

/// Record the resolved chain size after channel construction
pub fn record_resolved_chain(configured: usize, resolved: usize) {
    gauge!("discover_relay_chain_size").set(resolved as f64);
    if configured > resolved {
        counter!("discover_relay_entries_skipped_total")
            .increment((configured - resolved) as u64);
    }
}

/// Process-local aggregation of published events (for run summaries)
#[derive(Debug, Default)]
pub struct EventStats {
    total: u64,
    by_type: HashMap<&'static str, u64>,
}

impl EventStats {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one published event
    pub fn record(&mut self, event_type: EventType) {
        self.total += 1;
        *self.by_type.entry(event_type.as_str()).or_insert(0) += 1;
    }

    /// Total events recorded
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Snapshot for reporting
    pub fn summary(&self) -> EventStatsSummary {
        let mut by_type: Vec<(&'static str, u64)> =
            self.by_type.iter().map(|(k, v)| (*k, *v)).collect();
        by_type.sort();

        EventStatsSummary {
            total: self.total,
            by_type,
        }
    }
}

/// Snapshot of aggregated event counts
#[derive(Debug, Clone)]
pub struct EventStatsSummary {
    pub total: u64,
    pub by_type: Vec<(&'static str, u64)>,
}

impl EventStatsSummary {
    /// Print a human-readable summary to stdout
    pub fn print(&self) {
        println!("\n=== Event Summary ===");
        println!("Total published: {}", self.total);
        for (event_type, count) in &self.by_type {
            println!("  {event_type}: {count}");
        }
    }
}
