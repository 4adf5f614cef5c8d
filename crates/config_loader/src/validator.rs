//! Configuration validation module
//!
//! Validation rules:
//! - entry names non-empty
//! - entry names unique within the normalized sequence
//! - numeric params (queue_capacity) well-formed when present

use std::collections::HashSet;

use contracts::{ContractError, PluginEntry};

use crate::RelayConfig;

/// Validate a RelayConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &RelayConfig) -> Result<(), ContractError> {
    let entries = config.event_channel.entries();
    validate_entry_names(&entries)?;
    validate_entry_params(&entries)?;
    Ok(())
}

/// Validate entry names: non-empty and unique
fn validate_entry_names(entries: &[PluginEntry]) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, entry) in entries.iter().enumerate() {
        if entry.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("event_channel.entries[{idx}].name"),
                "entry name cannot be empty",
            ));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("event_channel.entries[name={}]", entry.name),
                "duplicate entry name",
            ));
        }
    }
    Ok(())
}

/// Validate well-known numeric params
fn validate_entry_params(entries: &[PluginEntry]) -> Result<(), ContractError> {
    for entry in entries {
        if let Some(capacity) = entry.params.get("queue_capacity") {
            match capacity.parse::<usize>() {
                Ok(0) => {
                    return Err(ContractError::config_validation(
                        format!("event_channel.entries[name={}].queue_capacity", entry.name),
                        "queue_capacity must be > 0",
                    ));
                }
                Ok(_) => {}
                Err(_) => {
                    return Err(ContractError::config_validation(
                        format!("event_channel.entries[name={}].queue_capacity", entry.name),
                        format!("queue_capacity must be an integer, got '{capacity}'"),
                    ));
                }
            }
        }
    }
    Ok(())
}
