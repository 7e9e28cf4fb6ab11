//! Readiness gate: block until dependency endpoints accept TCP connections.
//!
//! The gate probes each configured target in order. A failed probe of any
//! kind (refused, timed out, unresolvable) means "not ready yet": the gate
//! sleeps for the poll interval and tries again. By default there is no
//! attempt ceiling and no deadline, the surrounding orchestrator is expected
//! to bound the total wait.
//!
//! ```text
//!   wait()
//!     │
//!     ▼
//!   ┌──────────────┐  refused / timeout / DNS   ┌────────────────────┐
//!   │ probe target │──────────────────────────▶│ sleep poll_interval │
//!   └──────────────┘                            └────────────────────┘
//!     │ accepted            ▲                           │
//!     ▼                     └───────────────────────────┘
//!   next target ─▶ ... ─▶ GateReport
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use readygate::gate::{GateConfig, ReadinessGate};
//! use readygate::target::ConnectionTarget;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let target = ConnectionTarget::parse("postgresql://u:p@dbhost:5432/name")?;
//! let gate = ReadinessGate::new(GateConfig::for_target(target));
//!
//! let report = gate.wait().await?;
//! println!("ready after {} attempts", report.total_attempts());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod probe;

pub use config::GateConfig;
pub use error::{GateError, ProbeError};
pub use probe::{Probe, TcpProbe};

use std::time::Duration;

use tokio::time::Instant;

use crate::target::ConnectionTarget;

/// Failed attempts between two `warn` events for the same target.
const WARN_EVERY_ATTEMPTS: u32 = 20;

/// Outcome of waiting on one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub target: ConnectionTarget,
    /// Attempts made, including the successful one.
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Outcome of a successful wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReport {
    pub targets: Vec<TargetReport>,
    pub elapsed: Duration,
}

impl GateReport {
    pub fn total_attempts(&self) -> u32 {
        self.targets.iter().map(|t| t.attempts).sum()
    }
}

/// Blocks until every configured target is reachable.
pub struct ReadinessGate<P = TcpProbe> {
    config: GateConfig,
    probe: P,
}

impl ReadinessGate<TcpProbe> {
    /// Gate using real TCP connects.
    pub fn new(config: GateConfig) -> Self {
        let probe = TcpProbe::new(config.connect_timeout);
        Self { config, probe }
    }
}

impl<P: Probe> ReadinessGate<P> {
    /// Gate with a custom probe.
    pub fn with_probe(config: GateConfig, probe: P) -> Self {
        Self { config, probe }
    }

    /// Get the configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Wait until every target accepts a connection, in order.
    pub async fn wait(&self) -> Result<GateReport, GateError> {
        if self.config.targets.is_empty() {
            return Err(GateError::NoTargets);
        }

        let started = Instant::now();
        // A limit too far out to represent is no limit at all
        let deadline = self
            .config
            .deadline
            .and_then(|limit| Some((started.checked_add(limit)?, limit)));

        let mut reports = Vec::with_capacity(self.config.targets.len());
        for target in &self.config.targets {
            reports.push(self.wait_for(target, deadline).await?);
        }

        Ok(GateReport {
            targets: reports,
            elapsed: started.elapsed(),
        })
    }

    /// Probe every target exactly once.
    pub async fn check(&self) -> Vec<(ConnectionTarget, Result<(), ProbeError>)> {
        let mut results = Vec::with_capacity(self.config.targets.len());
        for target in &self.config.targets {
            results.push((target.clone(), self.probe.probe(target).await));
        }
        results
    }

    async fn wait_for(
        &self,
        target: &ConnectionTarget,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<TargetReport, GateError> {
        tracing::info!(%target, "Waiting for target to accept connections");

        let started = Instant::now();
        let mut attempts: u32 = 0;
        let mut last_error: Option<ProbeError> = None;

        loop {
            if let Some((at, timeout)) = deadline
                && Instant::now() >= at
            {
                return Err(GateError::DeadlineExceeded {
                    target: target.clone(),
                    timeout,
                    attempts,
                    last_error,
                });
            }

            attempts = attempts.saturating_add(1);
            let attempt_started = Instant::now();
            let outcome = match deadline {
                Some((at, _)) => tokio::time::timeout_at(at, self.probe.probe(target))
                    .await
                    .unwrap_or_else(|_| Err(ProbeError::TimedOut(attempt_started.elapsed()))),
                None => self.probe.probe(target).await,
            };

            let error = match outcome {
                Ok(()) => {
                    let elapsed = started.elapsed();
                    tracing::info!(
                        %target,
                        attempts,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Target is accepting connections"
                    );
                    return Ok(TargetReport {
                        target: target.clone(),
                        attempts,
                        elapsed,
                    });
                }
                Err(e) => e,
            };

            tracing::debug!(%target, attempt = attempts, error = %error, "Not ready yet");
            if attempts % WARN_EVERY_ATTEMPTS == 0 {
                tracing::warn!(
                    %target,
                    attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %error,
                    "Still waiting for target"
                );
            }

            if let Some(max) = self.config.max_attempts
                && attempts >= max
            {
                return Err(GateError::AttemptsExhausted {
                    target: target.clone(),
                    attempts,
                    last_error: error,
                });
            }
            last_error = Some(error);

            match deadline {
                Some((at, _)) => {
                    let wake = Instant::now()
                        .checked_add(self.config.poll_interval)
                        .map_or(at, |wake| wake.min(at));
                    tokio::time::sleep_until(wake).await;
                }
                None => tokio::time::sleep(self.config.poll_interval).await,
            }
        }
    }
}
