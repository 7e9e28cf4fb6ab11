use crate::config::ConfigOverrides;
use crate::config::helpers::{Lookup, optional_env, parse_optional_env};
use crate::error::ConfigError;

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "readygate=info";

/// Output format for log lines on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single lines.
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" | "human" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "invalid log format '{}', expected 'pretty' or 'json'",
                s
            )),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives.
    pub filter: String,
}

impl LoggingConfig {
    pub(crate) fn resolve(
        env: Lookup<'_>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let format = match overrides.log_format {
            Some(format) => format,
            None => parse_optional_env(env, "READYGATE_LOG_FORMAT", LogFormat::default())?,
        };
        let filter =
            optional_env(env, "RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self { format, filter })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::helpers::map_lookup;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let config = LoggingConfig::resolve(&map_lookup(&[]), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_resolve_env() {
        let env = map_lookup(&[
            ("READYGATE_LOG_FORMAT", "json"),
            ("RUST_LOG", "readygate=debug"),
        ]);
        let config = LoggingConfig::resolve(&env, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter, "readygate=debug");
    }
}
