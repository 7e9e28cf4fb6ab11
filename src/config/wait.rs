use std::time::Duration;

use crate::config::ConfigOverrides;
use crate::config::helpers::{
    Lookup, non_zero_millis, non_zero_secs, parse_env, parse_optional_env,
};
use crate::error::ConfigError;
use crate::gate::GateConfig;
use crate::target::ConnectionTarget;

/// Polling behaviour of the readiness gate.
///
/// The defaults wait forever at a 500 ms cadence with no per-attempt connect
/// timeout of our own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    /// Pause between failed attempts.
    pub interval: Duration,
    /// Per-attempt connect timeout; `None` leaves it to the OS.
    pub connect_timeout: Option<Duration>,
    /// Attempt ceiling per target; `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Overall deadline across all targets; `None` waits forever.
    pub deadline: Option<Duration>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            connect_timeout: None,
            max_attempts: None,
            deadline: None,
        }
    }
}

impl WaitConfig {
    pub(crate) fn resolve(
        env: Lookup<'_>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let interval_ms = match overrides.interval_ms {
            Some(ms) => ms,
            None => parse_optional_env(
                env,
                "READYGATE_INTERVAL_MS",
                defaults.interval.as_millis() as u64,
            )?,
        };
        let interval = non_zero_millis("READYGATE_INTERVAL_MS", interval_ms)?;

        let connect_timeout = overrides
            .connect_timeout_ms
            .map(Ok)
            .or_else(|| parse_env(env, "READYGATE_CONNECT_TIMEOUT_MS").transpose())
            .transpose()?
            .map(|ms| non_zero_millis("READYGATE_CONNECT_TIMEOUT_MS", ms))
            .transpose()?;

        let max_attempts = overrides
            .max_attempts
            .map(Ok)
            .or_else(|| parse_env::<u32>(env, "READYGATE_MAX_ATTEMPTS").transpose())
            .transpose()?;
        if max_attempts == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "READYGATE_MAX_ATTEMPTS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let deadline = overrides
            .timeout_secs
            .map(Ok)
            .or_else(|| parse_env::<u64>(env, "READYGATE_TIMEOUT_SECS").transpose())
            .transpose()?
            .map(|secs| non_zero_secs("READYGATE_TIMEOUT_SECS", secs))
            .transpose()?;

        Ok(Self {
            interval,
            connect_timeout,
            max_attempts,
            deadline,
        })
    }

    /// Build the gate configuration for the given targets.
    pub fn to_gate_config(&self, targets: Vec<ConnectionTarget>) -> GateConfig {
        GateConfig {
            targets,
            poll_interval: self.interval,
            connect_timeout: self.connect_timeout,
            max_attempts: self.max_attempts,
            deadline: self.deadline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::helpers::map_lookup;

    #[test]
    fn test_defaults_wait_forever() {
        let config = WaitConfig::resolve(&map_lookup(&[]), &ConfigOverrides::default()).unwrap();
        assert_eq!(config, WaitConfig::default());
        assert_eq!(config.interval, Duration::from_millis(500));
        assert!(config.max_attempts.is_none());
        assert!(config.deadline.is_none());
    }

    #[test]
    fn test_env_values() {
        let env = map_lookup(&[
            ("READYGATE_INTERVAL_MS", "250"),
            ("READYGATE_CONNECT_TIMEOUT_MS", "1000"),
            ("READYGATE_MAX_ATTEMPTS", "40"),
            ("READYGATE_TIMEOUT_SECS", "30"),
        ]);
        let config = WaitConfig::resolve(&env, &ConfigOverrides::default()).unwrap();

        assert_eq!(
            config,
            WaitConfig {
                interval: Duration::from_millis(250),
                connect_timeout: Some(Duration::from_secs(1)),
                max_attempts: Some(40),
                deadline: Some(Duration::from_secs(30)),
            }
        );
    }

    #[test]
    fn test_overrides_win_over_env() {
        let env = map_lookup(&[("READYGATE_INTERVAL_MS", "250"), ("READYGATE_MAX_ATTEMPTS", "40")]);
        let overrides = ConfigOverrides {
            interval_ms: Some(100),
            max_attempts: Some(3),
            ..Default::default()
        };
        let config = WaitConfig::resolve(&env, &overrides).unwrap();

        assert_eq!(config.interval, Duration::from_millis(100));
        assert_eq!(config.max_attempts, Some(3));
    }

    #[test]
    fn test_zero_values_rejected() {
        for (key, value) in [
            ("READYGATE_INTERVAL_MS", "0"),
            ("READYGATE_CONNECT_TIMEOUT_MS", "0"),
            ("READYGATE_MAX_ATTEMPTS", "0"),
            ("READYGATE_TIMEOUT_SECS", "0"),
        ] {
            let env = map_lookup(&[(key, value)]);
            let err = WaitConfig::resolve(&env, &ConfigOverrides::default()).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { key: ref k, .. } if k == key));
        }
    }

    #[test]
    fn test_zero_timeout_override_rejected() {
        let overrides = ConfigOverrides {
            timeout_secs: Some(0),
            ..Default::default()
        };
        let err = WaitConfig::resolve(&map_lookup(&[]), &overrides).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "READYGATE_TIMEOUT_SECS")
        );
    }

    #[test]
    fn test_largest_timeout_accepted() {
        let env = map_lookup(&[("READYGATE_TIMEOUT_SECS", "18446744073709551615")]);
        let config = WaitConfig::resolve(&env, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.deadline, Some(Duration::from_secs(u64::MAX)));
    }

    #[test]
    fn test_to_gate_config() {
        let config = WaitConfig {
            max_attempts: Some(5),
            ..Default::default()
        };
        let gate = config.to_gate_config(vec![ConnectionTarget::new("db", 5432)]);

        assert_eq!(gate.targets.len(), 1);
        assert_eq!(gate.poll_interval, Duration::from_millis(500));
        assert_eq!(gate.max_attempts, Some(5));
    }
}
