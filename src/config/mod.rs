//! Configuration for readygate.
//!
//! Everything is resolved once at startup from environment variables (after
//! loading `.env` via dotenvy) and command-line overrides. The resulting
//! structs are passed explicitly to the gate and the handoff; nothing below
//! this module reads the process environment.

pub(crate) mod helpers;
mod logging;
mod targets;
mod wait;

pub use helpers::Lookup;
pub use logging::{DEFAULT_LOG_FILTER, LogFormat, LoggingConfig};
pub use targets::{DEFAULT_URL_VAR, TargetSource, TargetsConfig};
pub use wait::WaitConfig;

use crate::config::helpers::parse_optional_env;
use crate::error::ConfigError;
use crate::handoff::HandoffMode;

/// Values given on the command line. Each one, when present, wins over the
/// matching environment variable.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url_var: Option<String>,
    pub also_wait_for: Vec<String>,
    pub interval_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub max_attempts: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub handoff: Option<HandoffMode>,
    pub log_format: Option<LogFormat>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub targets: TargetsConfig,
    pub wait: WaitConfig,
    pub handoff: HandoffMode,
    pub logging: LoggingConfig,
}

impl Config {
    /// Resolve from the process environment.
    pub fn from_env(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();
        Self::from_lookup(&env, overrides)
    }

    /// Resolve from an arbitrary key/value source.
    pub fn from_lookup(env: Lookup<'_>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let handoff = match overrides.handoff {
            Some(mode) => mode,
            None => parse_optional_env(env, "READYGATE_HANDOFF", HandoffMode::default())?,
        };

        Ok(Self {
            targets: TargetsConfig::resolve(env, overrides)?,
            wait: WaitConfig::resolve(env, overrides)?,
            handoff,
            logging: LoggingConfig::resolve(env, overrides)?,
        })
    }
}
