//! # Scan Report
//!
//! The immutable output of one scan. Per-port results are built through
//! constructors that tie latency to the `OPEN` status, and the report derives
//! its counters from the results it is given, so the totals can never drift
//! from the data.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::network::services;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortStatus {
    /// A connection was established.
    Open,
    /// The target actively refused the connection.
    Closed,
    /// Neither established nor refused within the timeout.
    Filtered,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PortStatus::Open => "OPEN",
            PortStatus::Closed => "CLOSED",
            PortStatus::Filtered => "FILTERED",
        };
        f.write_str(label)
    }
}

/// Outcome of probing a single port.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PortResult {
    port: u16,
    status: PortStatus,
    service: String,
    #[serde(
        serialize_with = "serialize_latency",
        skip_serializing_if = "Option::is_none"
    )]
    latency: Option<Duration>,
}

impl PortResult {
    pub fn open(port: u16, latency: Duration) -> Self {
        Self::new(port, PortStatus::Open, Some(latency))
    }

    pub fn closed(port: u16) -> Self {
        Self::new(port, PortStatus::Closed, None)
    }

    pub fn filtered(port: u16) -> Self {
        Self::new(port, PortStatus::Filtered, None)
    }

    fn new(port: u16, status: PortStatus, latency: Option<Duration>) -> Self {
        Self {
            port,
            status,
            service: services::name_of(port).to_string(),
            latency,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn status(&self) -> PortStatus {
        self.status
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Time to establish the connection. Present only for open ports.
    pub fn latency(&self) -> Option<Duration> {
        self.latency
    }

    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    target: String,
    timestamp: DateTime<Utc>,
    total_ports: usize,
    open_ports: usize,
    #[serde(rename = "timeElapsed", serialize_with = "serialize_seconds")]
    elapsed: Duration,
    ports: Vec<PortResult>,
}

impl ScanReport {
    /// `ports` must already be in the order they were requested.
    pub fn new(
        target: impl Into<String>,
        timestamp: DateTime<Utc>,
        elapsed: Duration,
        ports: Vec<PortResult>,
    ) -> Self {
        let open_ports = ports.iter().filter(|p| p.is_open()).count();
        Self {
            target: target.into(),
            timestamp,
            total_ports: ports.len(),
            open_ports,
            elapsed,
            ports,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// When the scan started.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn total_ports(&self) -> usize {
        self.total_ports
    }

    pub fn open_ports(&self) -> usize {
        self.open_ports
    }

    pub fn closed_ports(&self) -> usize {
        self.count(PortStatus::Closed)
    }

    pub fn filtered_ports(&self) -> usize {
        self.count(PortStatus::Filtered)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn ports(&self) -> &[PortResult] {
        &self.ports
    }

    pub fn open(&self) -> impl Iterator<Item = &PortResult> {
        self.ports.iter().filter(|p| p.is_open())
    }

    fn count(&self, status: PortStatus) -> usize {
        self.ports.iter().filter(|p| p.status == status).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// One advisory finding about the scanned host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub vulnerability: String,
    pub severity: Severity,
    pub recommendation: String,
}

/// The slice of a report handed to an advisory analyzer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OpenPort {
    pub port: u16,
    pub service: String,
}

impl From<&PortResult> for OpenPort {
    fn from(result: &PortResult) -> Self {
        Self {
            port: result.port,
            service: result.service.clone(),
        }
    }
}

fn serialize_latency<S: Serializer>(latency: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match latency {
        Some(latency) => s.serialize_u64(latency.as_millis() as u64),
        None => s.serialize_none(),
    }
}

fn serialize_seconds<S: Serializer>(elapsed: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(elapsed.as_secs_f64())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
