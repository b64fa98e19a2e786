//! Single-port probing.
//!
//! A [`ProbeBackend`] makes one connection attempt; [`probe`] bounds it with a
//! timeout and classifies the outcome. Backends never decide the port status
//! themselves, so every backend shares the same classification policy:
//!
//! | backend result         | status     |
//! |------------------------|------------|
//! | connected              | `OPEN`     |
//! | refused                | `CLOSED`   |
//! | timeout / unreachable  | `FILTERED` |

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use probr_common::network::target::Target;
use probr_common::report::PortResult;
use thiserror::Error;
use tracing::{debug, trace};

mod stub;
mod tcp;

pub use stub::{StubBackend, StubOutcome};
pub use tcp::TcpConnectBackend;

/// Why a connection attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("connection refused")]
    Refused,
    #[error("connection attempt timed out")]
    Timeout,
    #[error("target unreachable: {0}")]
    Unreachable(String),
}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ProbeError::Refused,
            io::ErrorKind::TimedOut => ProbeError::Timeout,
            _ => ProbeError::Unreachable(err.to_string()),
        }
    }
}

/// Strategy for reaching a port.
#[async_trait]
pub trait ProbeBackend: Send + Sync {
    /// Attempts a single connection to `target:port`.
    ///
    /// Returns the time taken to establish the connection.
    async fn connect(
        &self,
        target: &Target,
        port: u16,
        timeout: Duration,
    ) -> Result<Duration, ProbeError>;

    /// Short label used in logs.
    fn name(&self) -> &'static str;
}

/// Probes one port and classifies the outcome.
///
/// The backend call is wrapped in its own timeout, so a backend that ignores
/// its `timeout` argument still cannot stall the caller.
pub async fn probe(
    backend: &dyn ProbeBackend,
    target: &Target,
    port: u16,
    timeout: Duration,
) -> PortResult {
    let attempt = backend.connect(target, port, timeout);
    let outcome = match tokio::time::timeout(timeout, attempt).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => Err(ProbeError::Timeout),
    };
    classify(target, port, outcome)
}

fn classify(target: &Target, port: u16, outcome: Result<Duration, ProbeError>) -> PortResult {
    match outcome {
        Ok(latency) => {
            debug!("{target}:{port} open ({}ms)", latency.as_millis());
            PortResult::open(port, latency)
        }
        Err(ProbeError::Refused) => {
            trace!("{target}:{port} closed");
            PortResult::closed(port)
        }
        Err(err) => {
            trace!("{target}:{port} filtered: {err}");
            PortResult::filtered(port)
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
