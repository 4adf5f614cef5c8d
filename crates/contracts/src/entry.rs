//! Plugin descriptor and event channel configuration
//!
//! A `PluginEntry` names which plugin to resolve and carries its settings.
//! `EventChannelConfig` is the configuration section the channel is built
//! from: either one inline descriptor or an ordered `entries` list.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named plugin descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEntry {
    /// Plugin name, matched against the registry
    pub name: String,

    /// Plugin-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl PluginEntry {
    /// Create an entry with no parameters
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: HashMap::new(),
        }
    }
}

/// Event channel configuration section
///
/// Supports two shapes:
/// - single descriptor: `name` (+ optional `params`) at section level
/// - descriptor list: `entries = [ { name, params }, ... ]`
///
/// A non-empty `entries` list takes precedence over the single form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventChannelConfig {
    /// Single-descriptor form: plugin name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Single-descriptor form: plugin parameters
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, String>,

    /// List form, ordered; takes precedence when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<PluginEntry>,
}

impl EventChannelConfig {
    /// Normalize into an ordered descriptor sequence
    ///
    /// The single-descriptor form is lifted into a one-element sequence.
    /// Neither form present yields an empty sequence (a zero-sink channel).
    pub fn entries(&self) -> Vec<PluginEntry> {
        if !self.entries.is_empty() {
            return self.entries.clone();
        }

        match &self.name {
            Some(name) => vec![PluginEntry {
                name: name.clone(),
                params: self.params.clone(),
            }],
            None => Vec::new(),
        }
    }
}
