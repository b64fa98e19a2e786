use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use probr_common::network::target::Target;
use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;

use super::{ProbeBackend, ProbeError};

/// Full TCP handshake against the target, closed again immediately.
///
/// Needs no privileges. Hostnames are resolved on every attempt through the
/// system resolver, preferring IPv4 addresses.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnectBackend;

#[async_trait]
impl ProbeBackend for TcpConnectBackend {
    async fn connect(
        &self,
        target: &Target,
        port: u16,
        probe_timeout: Duration,
    ) -> Result<Duration, ProbeError> {
        let attempt = async {
            let socket_addr: SocketAddr = resolve(target, port).await?;
            handshake(socket_addr).await
        };

        match timeout(probe_timeout, attempt).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(ProbeError::Timeout),
        }
    }

    fn name(&self) -> &'static str {
        "tcp-connect"
    }
}

/// Latency excludes name resolution.
async fn handshake(addr: SocketAddr) -> Result<Duration, ProbeError> {
    let started = Instant::now();
    let _stream = TcpStream::connect(addr).await?;
    Ok(started.elapsed())
}

async fn resolve(target: &Target, port: u16) -> Result<SocketAddr, ProbeError> {
    if let Some(addr) = target.ipv4() {
        return Ok(SocketAddr::new(IpAddr::V4(addr), port));
    }

    let candidates: Vec<SocketAddr> = lookup_host((target.as_str(), port))
        .await
        .map_err(|e| ProbeError::Unreachable(format!("cannot resolve {target}: {e}")))?
        .collect();

    candidates
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| candidates.first())
        .copied()
        .ok_or_else(|| ProbeError::Unreachable(format!("{target} has no addresses")))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
