use secrecy::{ExposeSecret, SecretString};

use crate::config::ConfigOverrides;
use crate::config::helpers::{Lookup, optional_env, parse_list};
use crate::error::{ConfigError, Error};
use crate::target::ConnectionTarget;

/// Variable holding the primary connection URI unless overridden.
pub const DEFAULT_URL_VAR: &str = "DATABASE_URL";

/// A connection URI together with the variable it was read from.
#[derive(Debug, Clone)]
pub struct TargetSource {
    /// Environment variable name.
    pub var: String,
    uri: SecretString,
}

impl TargetSource {
    pub fn new(var: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            var: var.into(),
            uri: SecretString::from(uri.into()),
        }
    }

    /// Get the connection URI (exposes the secret).
    pub fn uri(&self) -> &str {
        self.uri.expose_secret()
    }

    /// Derive the connection target, naming the variable on failure.
    pub fn target(&self) -> Result<ConnectionTarget, Error> {
        ConnectionTarget::parse(self.uri()).map_err(|source| Error::Target {
            var: self.var.clone(),
            source,
        })
    }
}

/// Which dependencies to wait for.
#[derive(Debug, Clone)]
pub struct TargetsConfig {
    /// Primary source first, then extras in the order given.
    pub sources: Vec<TargetSource>,
}

impl TargetsConfig {
    pub(crate) fn resolve(
        env: Lookup<'_>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let url_var = overrides
            .url_var
            .clone()
            .or_else(|| optional_env(env, "READYGATE_URL_VAR"))
            .unwrap_or_else(|| DEFAULT_URL_VAR.to_string());

        let primary = optional_env(env, &url_var).ok_or_else(|| ConfigError::MissingRequired {
            key: url_var.clone(),
            hint: format!(
                "Set {url_var} to the connection URI of the service to wait for \
                 (e.g. postgresql://user:password@db:5432/app)"
            ),
        })?;

        let extra_vars = if overrides.also_wait_for.is_empty() {
            optional_env(env, "READYGATE_ALSO_WAIT_FOR")
                .map(|raw| parse_list(&raw))
                .unwrap_or_default()
        } else {
            overrides.also_wait_for.clone()
        };

        let mut sources = vec![TargetSource::new(url_var.clone(), primary)];
        for var in extra_vars {
            if sources.iter().any(|s| s.var == var) {
                continue;
            }
            let uri = optional_env(env, &var).ok_or_else(|| ConfigError::MissingRequired {
                key: var.clone(),
                hint: format!("{var} is listed as a dependency to wait for but is not set"),
            })?;
            sources.push(TargetSource::new(var, uri));
        }

        Ok(Self { sources })
    }

    /// Parse every source into a connection target, in order.
    pub fn parse_targets(&self) -> Result<Vec<ConnectionTarget>, Error> {
        self.sources.iter().map(TargetSource::target).collect()
    }
}
