//! Forwarding termination signals to a spawned child.

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;

/// Listeners for SIGTERM, SIGINT, SIGHUP, SIGQUIT, SIGUSR1 and SIGUSR2.
///
/// Install before spawning the child: from then on these signals no longer
/// terminate this process, and anything received before the child's PID is
/// known is buffered and relayed once [`Forwarder::forward_to`] starts.
pub(super) struct Forwarder {
    term: tokio::signal::unix::Signal,
    int: tokio::signal::unix::Signal,
    hup: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
    usr1: tokio::signal::unix::Signal,
    usr2: tokio::signal::unix::Signal,
}

impl Forwarder {
    pub(super) fn install() -> std::io::Result<Self> {
        Ok(Self {
            term: signal(SignalKind::terminate())?,
            int: signal(SignalKind::interrupt())?,
            hup: signal(SignalKind::hangup())?,
            quit: signal(SignalKind::quit())?,
            usr1: signal(SignalKind::user_defined1())?,
            usr2: signal(SignalKind::user_defined2())?,
        })
    }

    /// Relay signals to `pid` until the returned task is aborted.
    pub(super) fn forward_to(self, pid: u32) -> JoinHandle<()> {
        let Self {
            mut term,
            mut int,
            mut hup,
            mut quit,
            mut usr1,
            mut usr2,
        } = self;

        #[allow(clippy::cast_possible_wrap)]
        let target = Pid::from_raw(pid as i32);

        tokio::spawn(async move {
            loop {
                let sig = tokio::select! {
                    Some(()) = term.recv() => Signal::SIGTERM,
                    Some(()) = int.recv() => Signal::SIGINT,
                    Some(()) = hup.recv() => Signal::SIGHUP,
                    Some(()) = quit.recv() => Signal::SIGQUIT,
                    Some(()) = usr1.recv() => Signal::SIGUSR1,
                    Some(()) = usr2.recv() => Signal::SIGUSR2,
                    else => break,
                };

                tracing::debug!(pid = %target, signal = %sig, "Forwarding signal to command");
                if let Err(e) = kill(target, sig) {
                    // ESRCH: the child is gone and wait() is about to return.
                    tracing::debug!(pid = %target, signal = %sig, error = %e, "Signal forwarding failed");
                }
            }
        })
    }
}
