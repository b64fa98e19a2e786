#![cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use probr_common::config::ScanConfig;
use probr_common::network::target::Target;
use probr_common::report::{Insight, OpenPort};
use probr_core::advisory::{AdvisoryAnalyzer, AdvisoryError};
use probr_core::probe::{ProbeBackend, ProbeError};

pub fn config(concurrency: usize, timeout_ms: u64) -> ScanConfig {
    ScanConfig {
        concurrency,
        probe_timeout: Duration::from_millis(timeout_ms),
    }
}

/// Sleeps for `hold` on every probe and records how many probes overlap.
/// Even ports answer open, odd ports are refused.
#[derive(Default)]
pub struct CountingBackend {
    pub hold: Duration,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl CountingBackend {
    pub fn new(hold: Duration) -> Arc<Self> {
        Arc::new(Self {
            hold,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProbeBackend for CountingBackend {
    async fn connect(&self, _: &Target, port: u16, _: Duration) -> Result<Duration, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.hold).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if port % 2 == 0 {
            Ok(self.hold)
        } else {
            Err(ProbeError::Refused)
        }
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Flags every open port it is given and remembers what it saw.
#[derive(Default)]
pub struct EchoAnalyzer {
    pub seen: std::sync::Mutex<Vec<OpenPort>>,
}

#[async_trait]
impl AdvisoryAnalyzer for EchoAnalyzer {
    async fn analyze(
        &self,
        _target: &str,
        open_ports: &[OpenPort],
    ) -> Result<Vec<Insight>, AdvisoryError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.extend_from_slice(open_ports);
        }
        Ok(open_ports
            .iter()
            .map(|p| Insight {
                vulnerability: format!("{} exposed on {}", p.service, p.port),
                severity: probr_common::report::Severity::Medium,
                recommendation: "Restrict access".into(),
            })
            .collect())
    }
}

pub struct BrokenAnalyzer;

#[async_trait]
impl AdvisoryAnalyzer for BrokenAnalyzer {
    async fn analyze(&self, _: &str, _: &[OpenPort]) -> Result<Vec<Insight>, AdvisoryError> {
        Err(AdvisoryError::Unavailable("analysis service offline".into()))
    }
}
