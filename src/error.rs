//! Error types for readygate.

use thiserror::Error;

use crate::gate::GateError;
use crate::handoff::HandoffError;
use crate::target::TargetError;

/// Result type for readygate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid connection target in {var}: {source}")]
    Target {
        /// Environment variable the URI came from.
        var: String,
        #[source]
        source: TargetError,
    },

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Handoff(#[from] HandoffError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired {
        /// Variable name.
        key: String,
        /// What the operator should do about it.
        hint: String,
    },

    /// A variable is set but cannot be interpreted.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Why the value was rejected.
        message: String,
    },
}
