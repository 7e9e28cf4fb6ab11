//! Command line interface.
//!
//! Every option is optional and overrides the matching `READYGATE_*`
//! environment variable. Everything after the options (or after `--`) is the
//! command to run once the gate opens, passed through verbatim.

use std::ffi::OsString;

use clap::{ColorChoice, Parser};

use crate::config::{ConfigOverrides, LogFormat};
use crate::handoff::HandoffMode;

#[derive(Parser, Debug)]
#[command(name = "readygate")]
#[command(about = "Wait until dependency endpoints accept TCP connections, then exec a command")]
#[command(
    long_about = "Reads a connection URI (DATABASE_URL by default), waits until its host:port accepts \
TCP connections, then replaces itself with COMMAND.\nExamples:\n  readygate -- gunicorn -w 4 -b 0.0.0.0:8000 app.main:app\n  readygate --also-wait-for REDIS_URL -- rq worker high_priority\n  readygate --check  # probe once, exit 0 if reachable"
)]
#[command(version)]
#[command(color = ColorChoice::Auto)]
pub struct Cli {
    /// Environment variable holding the primary connection URI [default: DATABASE_URL]
    #[arg(long, value_name = "VAR")]
    pub url_var: Option<String>,

    /// Additional environment variables holding URIs to wait for (repeatable or comma-separated)
    #[arg(long = "also-wait-for", value_name = "VAR", value_delimiter = ',')]
    pub also_wait_for: Vec<String>,

    /// Pause between attempts, in milliseconds [default: 500]
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Per-attempt connect timeout, in milliseconds
    #[arg(long, value_name = "MS")]
    pub connect_timeout_ms: Option<u64>,

    /// Give up after this many attempts per target
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Give up after this many seconds in total
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// How to start COMMAND: exec (replace this process) or spawn (run as child)
    #[arg(long, value_name = "MODE")]
    pub handoff: Option<HandoffMode>,

    /// Log output format: pretty or json
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Probe every target once and exit 0 if all are reachable, 1 otherwise
    #[arg(long)]
    pub check: bool,

    /// Command to run once every target is reachable
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

impl Cli {
    /// Configuration values given on the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            url_var: self.url_var.clone(),
            also_wait_for: self.also_wait_for.clone(),
            interval_ms: self.interval_ms,
            connect_timeout_ms: self.connect_timeout_ms,
            max_attempts: self.max_attempts,
            timeout_secs: self.timeout_secs,
            handoff: self.handoff,
            log_format: self.log_format,
        }
    }
}
