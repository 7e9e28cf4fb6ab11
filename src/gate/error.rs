//! Error types for the readiness gate.

use std::time::Duration;

use thiserror::Error;

use crate::target::ConnectionTarget;

/// Why a single probe attempt failed.
///
/// The gate treats every variant the same way (not ready yet); the kind is
/// kept for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Name resolution failed or returned no addresses.
    #[error("could not resolve '{host}': {reason}")]
    Resolve {
        /// Host name.
        host: String,
        /// Resolver message.
        reason: String,
    },

    /// The peer actively refused the connection.
    #[error("connection refused")]
    Refused,

    /// The attempt did not complete in time.
    #[error("connect timed out after {0:?}")]
    TimedOut(Duration),

    /// Any other socket error.
    #[error("{0}")]
    Io(String),
}

/// Errors that end the wait without the gate opening.
#[derive(Debug, Error)]
pub enum GateError {
    /// Nothing to wait for.
    #[error("no connection targets configured")]
    NoTargets,

    /// The per-target attempt ceiling was reached.
    #[error("{target} not reachable after {attempts} attempts: {last_error}")]
    AttemptsExhausted {
        /// Target that never became ready.
        target: ConnectionTarget,
        /// Attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last_error: ProbeError,
    },

    /// The overall deadline passed.
    #[error("{target} not reachable within {timeout:?} ({attempts} attempts){}", last_error_suffix(.last_error))]
    DeadlineExceeded {
        /// Target being awaited when time ran out.
        target: ConnectionTarget,
        /// Configured deadline.
        timeout: Duration,
        /// Attempts made on this target.
        attempts: u32,
        /// Error from the most recent attempt, if one completed.
        last_error: Option<ProbeError>,
    },
}

fn last_error_suffix(last_error: &Option<ProbeError>) -> String {
    match last_error {
        Some(e) => format!(": {e}"),
        None => String::new(),
    }
}
