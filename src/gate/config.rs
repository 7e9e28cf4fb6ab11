//! Configuration types for the readiness gate.

use std::time::Duration;

use crate::target::ConnectionTarget;

/// Everything the gate needs to decide when the dependencies are ready.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Targets to wait for, in order.
    pub targets: Vec<ConnectionTarget>,
    /// Pause between failed attempts.
    pub poll_interval: Duration,
    /// Per-attempt connect timeout. `None` leaves it to the OS.
    pub connect_timeout: Option<Duration>,
    /// Attempt ceiling per target. `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Deadline for the whole wait, across all targets. `None` waits forever.
    pub deadline: Option<Duration>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            poll_interval: Duration::from_millis(500),
            connect_timeout: None,
            max_attempts: None,
            deadline: None,
        }
    }
}

impl GateConfig {
    /// Unbounded wait on a single target.
    pub fn for_target(target: ConnectionTarget) -> Self {
        Self {
            targets: vec![target],
            ..Default::default()
        }
    }

    /// Whether the gate may wait forever.
    pub fn is_unbounded(&self) -> bool {
        self.max_attempts.is_none() && self.deadline.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        let config = GateConfig::for_target(ConnectionTarget::new("db", 5432));
        assert!(config.is_unbounded());
        assert_eq!(config.poll_interval, Duration::from_millis(500));

        let bounded = GateConfig {
            deadline: Some(Duration::from_secs(10)),
            ..config
        };
        assert!(!bounded.is_unbounded());
    }
}
