//! # Security Advisories
//!
//! Turns the open ports of a report into human-readable findings.
//!
//! The analysis itself is delegated to an [`AdvisoryAnalyzer`]; the engine
//! only guarantees that a broken or absent analyzer never costs the caller
//! its report.

use async_trait::async_trait;
use probr_common::report::{Insight, OpenPort, ScanReport};
use thiserror::Error;
use tracing::{debug, warn};

mod command;

pub use command::CommandAnalyzer;

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("advisory analyzer unavailable: {0}")]
    Unavailable(String),
    #[error("advisory analyzer returned malformed data: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[async_trait]
pub trait AdvisoryAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        target: &str,
        open_ports: &[OpenPort],
    ) -> Result<Vec<Insight>, AdvisoryError>;
}

/// Best-effort analysis of `report`.
///
/// Returns an empty list when no analyzer is configured or when it fails.
pub async fn advise(analyzer: Option<&dyn AdvisoryAnalyzer>, report: &ScanReport) -> Vec<Insight> {
    let Some(analyzer) = analyzer else {
        return Vec::new();
    };

    let open_ports: Vec<OpenPort> = report.open().map(OpenPort::from).collect();
    match analyzer.analyze(report.target(), &open_ports).await {
        Ok(insights) => {
            debug!("Advisory analyzer produced {} insights", insights.len());
            insights
        }
        Err(e) => {
            warn!("{e}; continuing without insights");
            Vec::new()
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::Utc;
    use probr_common::report::{PortResult, Severity};

    struct Recording {
        seen: Mutex<Vec<OpenPort>>,
    }

    #[async_trait]
    impl AdvisoryAnalyzer for Recording {
        async fn analyze(&self, _: &str, open_ports: &[OpenPort]) -> Result<Vec<Insight>, AdvisoryError> {
            self.seen.lock().unwrap().extend_from_slice(open_ports);
            Ok(vec![Insight {
                vulnerability: "Telnet exposed".into(),
                severity: Severity::High,
                recommendation: "Disable telnet".into(),
            }])
        }
    }

    struct Broken;

    #[async_trait]
    impl AdvisoryAnalyzer for Broken {
        async fn analyze(&self, _: &str, _: &[OpenPort]) -> Result<Vec<Insight>, AdvisoryError> {
            Err(AdvisoryError::Unavailable("quota exceeded".into()))
        }
    }

    fn report() -> ScanReport {
        ScanReport::new(
            "example.com",
            Utc::now(),
            Duration::from_millis(10),
            vec![
                PortResult::open(23, Duration::from_millis(4)),
                PortResult::closed(80),
            ],
        )
    }

    #[tokio::test]
    async fn only_open_ports_are_forwarded() {
        let analyzer = Recording { seen: Mutex::new(Vec::new()) };
        let insights = advise(Some(&analyzer), &report()).await;

        assert_eq!(insights.len(), 1);
        let seen = analyzer.seen.lock().unwrap();
        assert_eq!(*seen, vec![OpenPort { port: 23, service: "Telnet".into() }]);
    }

    #[tokio::test]
    async fn failures_and_absence_yield_nothing() {
        assert!(advise(Some(&Broken), &report()).await.is_empty());
        assert!(advise(None, &report()).await.is_empty());
    }
}
