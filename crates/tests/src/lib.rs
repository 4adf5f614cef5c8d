//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Covers:
//! - config -> registry -> channel -> sink data flow (no network required)
//! - resolution skip and hard-failure scenarios across real crate boundaries
//! - exactly-once concurrent channel construction

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // Verify the contracts crate event taxonomy is reachable
        let _ = contracts::EventType::InstanceOnline;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::Utc;
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{EventSink, EventType, InstanceEvent, InstanceRef, PluginEntry};
    use dispatcher::{create_channel, register_builtin, ChannelBuilder, LazyChannel, MockSink};
    use registry::PluginRegistry;

    fn sample_event(id: u64, event_type: EventType) -> InstanceEvent {
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
            event_type,
            create_time: Utc::now(),
        }
    }

    /// End-to-end test: config file -> registry -> channel -> file sink
    ///
    /// Verifies the full flow:
    /// 1. TOML config with a missing entry in the middle
    /// 2. Resolution skips the unknown name, keeps order
    /// 3. Published events land in the file sink as JSON lines
    #[tokio::test]
    async fn test_e2e_config_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("events.jsonl");

        let toml = format!(
            r#"
[[event_channel.entries]]
name = "log"

[[event_channel.entries]]
name = "missing"

[[event_channel.entries]]
name = "file"
[event_channel.entries.params]
output_path = "{}"
"#,
            out_path.display()
        );

        let config = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        let registry = PluginRegistry::new();
        register_builtin(&registry).unwrap();

        let channel = create_channel(&config.event_channel, &registry)
            .await
            .unwrap();
        assert_eq!(channel.sink_names(), vec!["log", "file"]);

        for i in 0..5 {
            channel.publish_event(&sample_event(i, EventType::InstanceOnline));
        }

        // Destroy drains the file sink queue and flushes the writer
        tokio::time::timeout(std::time::Duration::from_secs(5), channel.destroy())
            .await
            .expect("destroy timed out")
            .unwrap();

        let content = std::fs::read_to_string(&out_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);

        for (i, line) in lines.iter().enumerate() {
            let event: InstanceEvent = serde_json::from_str(line).unwrap();
            assert_eq!(event.id, format!("evt-{i}"));
        }
    }

    /// The worked resolution example: [logger, missing, metrics]
    #[tokio::test]
    async fn test_resolution_example_scenario() {
        let registry = PluginRegistry::new();
        let logger = MockSink::new("logger");
        let metrics = MockSink::new("metrics");
        registry.register_event_sink(logger.clone()).unwrap();
        registry.register_event_sink(metrics.clone()).unwrap();

        let entries = vec![
            PluginEntry::named("logger"),
            PluginEntry::named("missing"),
            PluginEntry::named("metrics"),
        ];
        let channel = ChannelBuilder::new(entries).resolve(&registry).await.unwrap();

        assert_eq!(channel.sink_names(), vec!["logger", "metrics"]);

        let event = sample_event(1, EventType::InstanceOffline);
        channel.publish_event(&event);

        assert_eq!(logger.published_ids(), vec!["evt-1"]);
        assert_eq!(metrics.published_ids(), vec!["evt-1"]);
    }

    /// A hard init failure must abort the whole build across crate seams
    #[tokio::test]
    async fn test_hard_failure_aborts_whole_channel() {
        let registry = PluginRegistry::new();
        register_builtin(&registry).unwrap();
        let healthy = MockSink::new("healthy");
        registry.register_event_sink(healthy.clone()).unwrap();
        registry
            .register_event_sink(MockSink::failing_init("broken"))
            .unwrap();

        let entries = vec![
            PluginEntry::named("healthy"),
            PluginEntry::named("broken"),
            PluginEntry::named("log"),
        ];
        let result = ChannelBuilder::new(entries).resolve(&registry).await;
        assert!(result.is_err());

        // The member before the failure was initialized, but no channel
        // value exists for anyone to publish through
        assert_eq!(healthy.init_count(), 1);
    }

    /// Many concurrent first callers construct the channel exactly once
    #[tokio::test]
    async fn test_concurrent_construction_exactly_once() {
        let lazy = Arc::new(LazyChannel::new());
        let registry = Arc::new(PluginRegistry::new());
        let sink = MockSink::new("logger");
        registry.register_event_sink(sink.clone()).unwrap();

        let config = Arc::new(contracts::EventChannelConfig {
            name: Some("logger".to_string()),
            params: HashMap::new(),
            entries: vec![],
        });

        let mut handles = Vec::new();
        for i in 0..32 {
            let lazy = Arc::clone(&lazy);
            let registry = Arc::clone(&registry);
            let config = Arc::clone(&config);
            handles.push(tokio::spawn(async move {
                let channel = lazy.get_or_init(&config, &registry).await.unwrap();
                channel.publish_event(&sample_event(i, EventType::InstanceOnline));
                Arc::clone(channel)
            }));
        }

        let mut channels = Vec::new();
        for handle in handles {
            channels.push(handle.await.unwrap());
        }

        for channel in &channels[1..] {
            assert!(Arc::ptr_eq(&channels[0], channel));
        }
        assert_eq!(sink.init_count(), 1);
        assert_eq!(sink.publish_count(), 32);
    }

    /// Destroy keeps going past a failing member and reports the error
    #[tokio::test]
    async fn test_destroy_aggregates_across_members() {
        let registry = PluginRegistry::new();
        let first = MockSink::failing_destroy("first");
        let second = MockSink::new("second");
        let third = MockSink::new("third");
        registry.register_event_sink(first.clone()).unwrap();
        registry.register_event_sink(second.clone()).unwrap();
        registry.register_event_sink(third.clone()).unwrap();

        let entries = vec![
            PluginEntry::named("first"),
            PluginEntry::named("second"),
            PluginEntry::named("third"),
        ];
        let channel = ChannelBuilder::new(entries).resolve(&registry).await.unwrap();

        let result = channel.destroy().await;
        assert!(result.is_err());
        assert_eq!(first.destroy_count(), 1);
        assert_eq!(second.destroy_count(), 1);
        assert_eq!(third.destroy_count(), 1);
    }

    /// Single-descriptor configuration drives the channel end to end
    #[tokio::test]
    async fn test_single_descriptor_normalization_e2e() {
        let json = r#"{
            "event_channel": {
                "name": "log",
                "params": { "detail": "true" }
            }
        }"#;

        let config = ConfigLoader::load_from_str(json, ConfigFormat::Json).unwrap();

        let registry = PluginRegistry::new();
        register_builtin(&registry).unwrap();

        let channel = create_channel(&config.event_channel, &registry)
            .await
            .unwrap();
        assert_eq!(channel.chain_len(), 1);
        assert_eq!(channel.sink_names(), vec!["log"]);

        channel.publish_event(&sample_event(1, EventType::InstanceTurnHealthy));
        channel.destroy().await.unwrap();
    }

    /// Observability aggregation matches what was published
    #[tokio::test]
    async fn test_event_stats_aggregation_over_publish_loop() {
        let registry = PluginRegistry::new();
        let sink = MockSink::new("logger");
        registry.register_event_sink(sink.clone()).unwrap();

        let channel = ChannelBuilder::new(vec![PluginEntry::named("logger")])
            .resolve(&registry)
            .await
            .unwrap();

        let mut stats = observability::EventStats::new();
        for i in 0..4 {
            let event_type = if i % 2 == 0 {
                EventType::InstanceOnline
            } else {
                EventType::InstanceOffline
            };
            let event = sample_event(i, event_type);
            channel.publish_event(&event);
            stats.record(event.event_type);
        }

        let summary = stats.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(sink.publish_count(), 4);
        assert_eq!(
            summary.by_type,
            vec![("instance_offline", 2), ("instance_online", 2)]
        );
    }
}
