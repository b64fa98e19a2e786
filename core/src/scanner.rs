//! The central **orchestration** point for port scanning.
//!
//! [`Scanner`] turns a raw request into a [`ScanReport`]:
//! validation and port selection happen up front and are the only fatal
//! stages; after that every port is probed through the configured
//! [`ProbeBackend`] and always yields exactly one [`PortResult`].
//!
//! **Concurrency Note:**
//! Probes run on a [`JoinSet`], gated by a [`Semaphore`] sized to
//! [`ScanConfig::concurrency`]. A permit is taken *before* a probe is spawned
//! and released when it finishes, so the number of in-flight probes never
//! exceeds the limit. Each task reports its index in the port set and the
//! coordinator writes the result into that slot, which keeps the report in
//! request order no matter which probe finishes first.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use probr_common::config::ScanConfig;
use probr_common::error::ScanError;
use probr_common::network::ports::{PortSet, ScanMode};
use probr_common::network::target::Target;
use probr_common::report::{Insight, PortResult, ScanReport};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::advisory::{self, AdvisoryAnalyzer};
use crate::probe::{self, ProbeBackend};

/// Invoked with `(completed, total)` after each probe resolves.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// A report together with the advisory findings drawn from it.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    #[serde(flatten)]
    pub report: ScanReport,
    pub insights: Vec<Insight>,
}

pub struct Scanner {
    backend: Arc<dyn ProbeBackend>,
    config: ScanConfig,
    advisor: Option<Arc<dyn AdvisoryAnalyzer>>,
    on_progress: Option<ProgressCallback>,
}

impl Scanner {
    pub fn new(backend: Arc<dyn ProbeBackend>, config: ScanConfig) -> Self {
        Self {
            backend,
            config,
            advisor: None,
            on_progress: None,
        }
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn AdvisoryAnalyzer>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Validates the request and scans it.
    ///
    /// Validation and range errors are returned before any probe is sent.
    /// Once probing starts the only possible error is
    /// [`ScanError::ScanCancelled`].
    pub async fn scan(
        &self,
        raw_target: &str,
        mode: ScanMode,
        range_start: Option<i64>,
        range_end: Option<i64>,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        let target: Target = Target::validate(raw_target)?;
        let ports: PortSet = PortSet::build(mode, range_start, range_end)?;
        self.scan_ports(target, &ports, cancel).await
    }

    /// Like [`Scanner::scan`], then hands the open ports to the advisor.
    ///
    /// Advisory failures never fail the call; they leave `insights` empty.
    pub async fn assess(
        &self,
        raw_target: &str,
        mode: ScanMode,
        range_start: Option<i64>,
        range_end: Option<i64>,
        cancel: &CancellationToken,
    ) -> Result<Assessment, ScanError> {
        let report = self
            .scan(raw_target, mode, range_start, range_end, cancel)
            .await?;
        let insights = advisory::advise(self.advisor.as_deref(), &report).await;
        Ok(Assessment { report, insights })
    }

    /// Probes an already validated target and port set.
    pub async fn scan_ports(
        &self,
        target: Target,
        ports: &PortSet,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        let timestamp = Utc::now();
        let started = Instant::now();
        let total: usize = ports.len();
        let concurrency: usize = self.config.effective_concurrency();

        info!(
            "Scanning {total} ports on {target} ({} backend, {concurrency} in flight, {}ms timeout)",
            self.backend.name(),
            self.config.probe_timeout.as_millis()
        );

        let target = Arc::new(target);
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut tasks: JoinSet<(usize, PortResult)> = JoinSet::new();
        let mut slots: Vec<Option<PortResult>> = vec![None; total];
        let mut pending = ports.iter().enumerate().peekable();
        let mut completed: usize = 0;

        while pending.peek().is_some() || !tasks.is_empty() {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    warn!("Scan of {target} cancelled after {completed}/{total} probes");
                    return Err(ScanError::ScanCancelled);
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    self.record(joined, &mut slots);
                    completed += 1;
                    self.report_progress(completed, total);
                }

                acquired = Arc::clone(&semaphore).acquire_owned(), if pending.peek().is_some() => {
                    let Ok(permit) = acquired else {
                        tasks.abort_all();
                        return Err(ScanError::ScanCancelled);
                    };
                    let Some((idx, port)) = pending.next() else {
                        continue;
                    };

                    let backend = Arc::clone(&self.backend);
                    let target = Arc::clone(&target);
                    let timeout = self.config.probe_timeout;

                    tasks.spawn(async move {
                        let result = probe::probe(backend.as_ref(), &target, port, timeout).await;
                        drop(permit);
                        (idx, result)
                    });
                }
            }
        }

        let results: Vec<PortResult> = fill_abandoned(slots, ports);
        let report = ScanReport::new(target.as_str(), timestamp, started.elapsed(), results);

        info!(
            "Scan of {} finished in {:.2}s: {} open, {} closed, {} filtered",
            report.target(),
            report.elapsed().as_secs_f64(),
            report.open_ports(),
            report.closed_ports(),
            report.filtered_ports()
        );

        Ok(report)
    }

    fn record(
        &self,
        joined: Result<(usize, PortResult), JoinError>,
        slots: &mut [Option<PortResult>],
    ) {
        match joined {
            Ok((idx, result)) => slots[idx] = Some(result),
            Err(e) => warn!("Probe task failed, port will be reported as filtered: {e}"),
        }
    }

    fn report_progress(&self, completed: usize, total: usize) {
        if let Some(callback) = &self.on_progress {
            callback(completed, total);
        }
    }
}

/// Slots left empty by a failed task become `FILTERED`, so every requested
/// port appears exactly once.
fn fill_abandoned(slots: Vec<Option<PortResult>>, ports: &PortSet) -> Vec<PortResult> {
    slots
        .into_iter()
        .zip(ports.iter())
        .map(|(slot, port)| slot.unwrap_or_else(|| PortResult::filtered(port)))
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
