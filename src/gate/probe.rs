//! Reachability probes.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{TcpStream, lookup_host};

use crate::gate::error::ProbeError;
use crate::target::ConnectionTarget;

/// A single reachability check against a target.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Return `Ok(())` when the target is ready.
    async fn probe(&self, target: &ConnectionTarget) -> Result<(), ProbeError>;
}

/// Ready means a TCP connection is accepted. The connection is closed right
/// away; nothing is sent.
#[derive(Debug, Clone, Default)]
pub struct TcpProbe {
    connect_timeout: Option<Duration>,
}

impl TcpProbe {
    pub fn new(connect_timeout: Option<Duration>) -> Self {
        Self { connect_timeout }
    }

    async fn connect(&self, addr: SocketAddr) -> Result<(), ProbeError> {
        let result = match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, TcpStream::connect(addr))
                .await
                .map_err(|_| ProbeError::TimedOut(limit))?,
            None => TcpStream::connect(addr).await,
        };

        match result {
            Ok(_stream) => Ok(()),
            Err(e) if e.kind() == ErrorKind::ConnectionRefused => Err(ProbeError::Refused),
            Err(e) => Err(ProbeError::Io(e.to_string())),
        }
    }
}

#[async_trait]
impl Probe for TcpProbe {
    async fn probe(&self, target: &ConnectionTarget) -> Result<(), ProbeError> {
        let addrs: Vec<SocketAddr> = lookup_host((target.host.as_str(), target.port))
            .await
            .map_err(|e| ProbeError::Resolve {
                host: target.host.clone(),
                reason: e.to_string(),
            })?
            .collect();

        let mut last_error = ProbeError::Resolve {
            host: target.host.clone(),
            reason: "no addresses returned".to_string(),
        };

        // Same order the resolver returned; first accept wins.
        for addr in addrs {
            match self.connect(addr).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::trace!(%addr, error = %e, "Connect attempt failed");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn test_probe_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpProbe::new(Some(Duration::from_secs(2)));
        probe
            .probe(&ConnectionTarget::new("127.0.0.1", port))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_probe_resolves_localhost() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = TcpProbe::new(Some(Duration::from_secs(2)));
        probe
            .probe(&ConnectionTarget::new("localhost", port))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        // Bind then drop to get a port nobody is listening on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let probe = TcpProbe::new(Some(Duration::from_secs(2)));
        let err = probe
            .probe(&ConnectionTarget::new("127.0.0.1", port))
            .await
            .unwrap_err();
        assert_eq!(err, ProbeError::Refused);
    }

    #[tokio::test]
    async fn test_probe_unresolvable_host() {
        let probe = TcpProbe::new(Some(Duration::from_secs(2)));
        let err = probe
            .probe(&ConnectionTarget::new("readygate-does-not-exist.invalid", 5432))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Resolve { .. }), "{err:?}");
    }
}
