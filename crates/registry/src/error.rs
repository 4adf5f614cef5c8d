//! Registry error types

use thiserror::Error;

/// Registry-specific errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A plugin with the same name is already registered
    #[error("plugin '{name}' already registered as {kind}")]
    Duplicate { name: String, kind: &'static str },
}
