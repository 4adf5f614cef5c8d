//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// A resolved sink failed its initialization (hard failure)
    #[error("failed to initialize sink '{name}': {source}")]
    SinkInit {
        name: String,
        #[source]
        source: contracts::ContractError,
    },

    /// A chain member failed its destroy
    #[error("failed to destroy sink '{name}': {source}")]
    Destroy {
        name: String,
        #[source]
        source: contracts::ContractError,
    },

    /// Contract-level error
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a sink initialization error
    pub fn sink_init(name: impl Into<String>, source: contracts::ContractError) -> Self {
        Self::SinkInit {
            name: name.into(),
            source,
        }
    }

    /// Create a sink destroy error
    pub fn destroy(name: impl Into<String>, source: contracts::ContractError) -> Self {
        Self::Destroy {
            name: name.into(),
            source,
        }
    }
}
