//! `run` command implementation.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info, warn};

use contracts::{EventSink, EventType, InstanceEvent, InstanceRef};
use dispatcher::register_builtin;
use observability::{record_event_published, record_resolved_chain, EventStats};
use registry::PluginRegistry;

use crate::cli::RunArgs;
use crate::error::CliError;

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let entries = config.event_channel.entries();
    info!(entries = entries.len(), "Configuration loaded");

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&entries);
        return Ok(());
    }

    // Initialize Metrics (optional)
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
        info!("Metrics endpoint available on port {}", args.metrics_port);
    }

    // Build the registry with built-in sinks
    let registry = PluginRegistry::new();
    register_builtin(&registry).context("Failed to register built-in sinks")?;

    // Construct the process-wide channel. This is the fail-fast boundary:
    // a hard resolution failure means the platform cannot run consistently.
    let channel = match dispatcher::event_channel(&config.event_channel, &registry).await {
        Ok(channel) => channel,
        Err(e) => {
            error!(error = %e, "event channel initialization failed, terminating");
            std::process::exit(1);
        }
    };

    record_resolved_chain(entries.len(), channel.chain_len());
    info!(
        chain = ?channel.sink_names(),
        "Event channel ready"
    );

    // Gather events to publish
    let events = match &args.events {
        Some(path) => load_events(path)?,
        None => synthetic_events(args.count),
    };

    // Publish with graceful-shutdown handling
    let mut stats = EventStats::new();
    let shutdown_signal = setup_shutdown_signal();
    tokio::pin!(shutdown_signal);

    for event in &events {
        tokio::select! {
            biased;
            _ = &mut shutdown_signal => {
                warn!("Received shutdown signal, stopping publication");
                break;
            }
            _ = tokio::task::yield_now() => {
                channel.publish_event(event);
                stats.record(event.event_type);
                record_event_published(event.event_type, channel.chain_len());
            }
        }
    }

    // Shut the chain down; a destroy error is reported to the caller
    channel
        .destroy()
        .await
        .map_err(|e| CliError::shutdown(e.to_string()))?;

    stats.summary().print();
    info!(published = stats.total(), "Discover Relay finished");
    Ok(())
}

/// Load events from a JSON-lines file
fn load_events(path: &Path) -> Result<Vec<InstanceEvent>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::events_load(format!("{}: {e}", path.display())))?;

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| {
                CliError::events_load(format!("invalid event at line {}: {e}", idx + 1)).into()
            })
        })
        .collect()
}

/// Generate synthetic instance events for demo runs
fn synthetic_events(count: u64) -> Vec<InstanceEvent> {
    const TYPES: [EventType; 6] = [
        EventType::InstanceOnline,
        EventType::InstanceTurnHealthy,
        EventType::InstanceTurnUnhealthy,
        EventType::InstanceOpenIsolate,
        EventType::InstanceCloseIsolate,
        EventType::InstanceOffline,
    ];

    (0..count)
        .map(|i| InstanceEvent {
            id: format!("evt-{i}"),
            namespace: "default".to_string(),
            service: format!("service-{}", i % 3),
            instance: InstanceRef {
                id: format!("inst-{}", i % 5),
                host: format!("10.0.0.{}", i % 5 + 1),
                port: 8080,
                metadata: HashMap::new(),
            },
            event_type: TYPES[(i % TYPES.len() as u64) as usize],
            create_time: Utc::now(),
        })
        .collect()
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(entries: &[contracts::PluginEntry]) {
    println!("\n=== Configuration Summary ===\n");
    println!("Entries ({}):", entries.len());
    for entry in entries {
        println!("  - {} ({} params)", entry.name, entry.params.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_synthetic_events_count_and_ids() {
        let events = synthetic_events(7);
        assert_eq!(events.len(), 7);
        assert_eq!(events[0].id, "evt-0");
        assert_eq!(events[6].id, "evt-6");
    }

    #[test]
    fn test_load_events_json_lines() {
        let events = synthetic_events(3);
        let mut file = NamedTempFile::new().unwrap();
        for event in &events {
            writeln!(file, "{}", serde_json::to_string(event).unwrap()).unwrap();
        }

        let loaded = load_events(file.path()).unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[1].id, "evt-1");
    }

    #[test]
    fn test_load_events_rejects_garbage() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        assert!(load_events(file.path()).is_err());
    }
}
