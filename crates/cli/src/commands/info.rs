//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    entries: Vec<EntryInfo>,
    builtin_sinks: Vec<&'static str>,
}

#[derive(Serialize)]
struct EntryInfo {
    name: String,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let entries = config.event_channel.entries();
    let info = ConfigInfo {
        entries: entries
            .iter()
            .map(|e| EntryInfo {
                name: e.name.clone(),
                params: e.params.clone(),
            })
            .collect(),
        builtin_sinks: vec!["log", "file", "network"],
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn print_config_info(info: &ConfigInfo) {
    println!("=== Event Channel ===\n");
    if info.entries.is_empty() {
        println!("No entries configured.");
    } else {
        println!("Entries ({}):", info.entries.len());
        for entry in &info.entries {
            if entry.params.is_empty() {
                println!("  - {}", entry.name);
            } else {
                println!("  - {}:", entry.name);
                let mut params: Vec<_> = entry.params.iter().collect();
                params.sort();
                for (key, value) in params {
                    println!("      {key} = {value}");
                }
            }
        }
    }

    println!("\nBuilt-in sinks: {}", info.builtin_sinks.join(", "));
}
