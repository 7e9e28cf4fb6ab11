//! Handing control to the real command once the gate opens.
//!
//! Two strategies:
//! - [`HandoffMode::Exec`] replaces the current process image. The command
//!   keeps our PID, standard streams and signal delivery, and its exit status
//!   is the container's exit status. Unix only.
//! - [`HandoffMode::Spawn`] starts the command as a child, forwards
//!   termination signals to it and exits with its status. Used where process
//!   replacement is unavailable, or on request.

#[cfg(unix)]
mod signals;

use std::ffi::OsString;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors raised while starting or supervising the command.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// `exec` returned, which only happens on failure.
    #[error("Failed to exec '{program}': {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install signal forwarding: {0}")]
    Signals(#[source] std::io::Error),
}

/// How to start the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffMode {
    /// Replace the current process image.
    Exec,
    /// Run as a child and mirror its exit status.
    Spawn,
}

impl Default for HandoffMode {
    fn default() -> Self {
        if cfg!(unix) { Self::Exec } else { Self::Spawn }
    }
}

impl std::fmt::Display for HandoffMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exec => write!(f, "exec"),
            Self::Spawn => write!(f, "spawn"),
        }
    }
}

impl std::str::FromStr for HandoffMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exec" | "replace" => Ok(Self::Exec),
            "spawn" | "child" => Ok(Self::Spawn),
            _ => Err(format!(
                "invalid handoff mode '{}', expected 'exec' or 'spawn'",
                s
            )),
        }
    }
}

/// The command to run after the gate, argv verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    program: OsString,
    args: Vec<OsString>,
}

impl Handoff {
    /// `None` when `argv` is empty.
    pub fn from_argv(argv: Vec<OsString>) -> Option<Self> {
        let mut argv = argv.into_iter();
        let program = argv.next()?;
        Some(Self {
            program,
            args: argv.collect(),
        })
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Hand over control.
    ///
    /// In exec mode this only returns on failure. In spawn mode it returns the
    /// exit code the caller should exit with.
    pub async fn run(self, mode: HandoffMode) -> Result<i32, HandoffError> {
        match mode {
            #[cfg(unix)]
            HandoffMode::Exec => self.exec(),
            #[cfg(not(unix))]
            HandoffMode::Exec => {
                tracing::debug!("Process replacement unavailable, running command as a child");
                self.spawn_and_wait().await
            }
            HandoffMode::Spawn => self.spawn_and_wait().await,
        }
    }

    #[cfg(unix)]
    fn exec(self) -> Result<i32, HandoffError> {
        use std::os::unix::process::CommandExt;

        tracing::debug!(program = %self.program_name(), "Replacing process image");
        let source = std::process::Command::new(&self.program)
            .args(&self.args)
            .exec();
        Err(HandoffError::Exec {
            program: self.program_name(),
            source,
        })
    }

    async fn spawn_and_wait(self) -> Result<i32, HandoffError> {
        let program = self.program_name();

        // Listen before the child exists so no signal slips through in between
        #[cfg(unix)]
        let listeners = signals::Forwarder::install().map_err(HandoffError::Signals)?;

        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .spawn()
            .map_err(|source| HandoffError::Spawn {
                program: program.clone(),
                source,
            })?;

        tracing::debug!(program = %program, pid = ?child.id(), "Started command");

        #[cfg(unix)]
        let forwarder = child.id().map(|pid| listeners.forward_to(pid));
        #[cfg(not(unix))]
        let forwarder = Some(tokio::spawn(async {
            // The console delivers Ctrl-C to the child as well; keep it from
            // killing us before the child has exited.
            while tokio::signal::ctrl_c().await.is_ok() {}
        }));

        let status = child.wait().await.map_err(|source| HandoffError::Wait {
            program: program.clone(),
            source,
        });

        if let Some(handle) = forwarder {
            handle.abort();
        }

        let status = status?;
        tracing::debug!(program = %program, %status, "Command exited");
        Ok(exit_code(status))
    }
}

/// Shell convention: the child's code, or `128 + signal` if it was killed.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
