//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Discover Relay - plugin-backed event fan-out for service discovery
#[derive(Parser, Debug)]
#[command(
    name = "discover-relay",
    author,
    version,
    about = "Discovery event fan-out relay",
    long_about = "Broadcasts instance-change events to configured downstream sinks.\n\n\
                  Resolves declared sink descriptors against the plugin registry, \n\
                  builds the fan-out chain once, and publishes events through it."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "DISCOVER_RELAY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "DISCOVER_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish events through the configured relay
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "DISCOVER_RELAY_CONFIG"
    )]
    pub config: PathBuf,

    /// JSON-lines file of events to publish (one InstanceEvent per line)
    #[arg(long, env = "DISCOVER_RELAY_EVENTS")]
    pub events: Option<PathBuf>,

    /// Number of synthetic events to publish when no events file is given
    #[arg(long, default_value = "10", env = "DISCOVER_RELAY_COUNT")]
    pub count: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "DISCOVER_RELAY_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without publishing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
