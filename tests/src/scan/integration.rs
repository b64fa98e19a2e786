#![cfg(test)]
use std::sync::Arc;
use std::time::{Duration, Instant};

use probr_common::error::ScanError;
use probr_common::network::ports::{COMMON_PORTS, ScanMode};
use probr_common::report::{PortStatus, ScanReport};
use probr_core::probe::{StubBackend, StubOutcome};
use probr_core::scanner::Scanner;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::utils::{config, BrokenAnalyzer, CountingBackend, EchoAnalyzer};

/// Probes overlap up to exactly the configured limit and never beyond it,
/// and every port of the range is still probed exactly once.
#[tokio::test]
async fn concurrency_limit_is_respected() {
    const HOLD: Duration = Duration::from_millis(20);
    const PORTS: u32 = 40;

    let backend = CountingBackend::new(HOLD);
    let scanner = Scanner::new(backend.clone(), config(4, 1_000));

    let started = Instant::now();
    let report = scanner
        .scan("scanme.example.org", ScanMode::Range, Some(1), Some(PORTS as i64), &CancellationToken::new())
        .await
        .expect("scan should succeed");
    let elapsed = started.elapsed();

    assert_eq!(report.total_ports(), PORTS as usize);
    assert_eq!(backend.calls(), PORTS as usize);
    assert_eq!(backend.max_in_flight(), 4);

    // Four lanes take about a quarter of the one-at-a-time duration.
    let sequential = HOLD * PORTS;
    assert!(elapsed < sequential / 2, "took {elapsed:?}, one at a time is {sequential:?}");
}

#[tokio::test]
async fn results_keep_request_order_under_jitter() {
    let backend = StubBackend::new(11).with_delay(Duration::from_millis(1), Duration::from_millis(25));
    let scanner = Scanner::new(Arc::new(backend), config(16, 1_000));

    let report = scanner
        .scan("10.20.30.40", ScanMode::Range, Some(100), Some(160), &CancellationToken::new())
        .await
        .expect("scan should succeed");

    let ports: Vec<u16> = report.ports().iter().map(|p| p.port()).collect();
    let expected: Vec<u16> = (100..=160).collect();
    assert_eq!(ports, expected);
}

#[tokio::test]
async fn stub_scans_are_reproducible() {
    async fn run(seed: u64) -> ScanReport {
        Scanner::new(Arc::new(StubBackend::new(seed)), config(8, 500))
            .scan("intranet.example.net", ScanMode::Common, None, None, &CancellationToken::new())
            .await
            .expect("scan should succeed")
    }

    let first = run(42).await;
    let second = run(42).await;

    let statuses = |r: &ScanReport| r.ports().iter().map(|p| p.status()).collect::<Vec<_>>();
    assert_eq!(statuses(&first), statuses(&second));
    assert_eq!(first.open_ports(), second.open_ports());

    let ports: Vec<u16> = first.ports().iter().map(|p| p.port()).collect();
    assert_eq!(ports, COMMON_PORTS.to_vec());
}

#[tokio::test]
async fn popular_hosts_serve_the_web() {
    let scanner = Scanner::new(Arc::new(StubBackend::new(3)), config(8, 500));

    let report = scanner
        .scan("www.github.com", ScanMode::Common, None, None, &CancellationToken::new())
        .await
        .expect("scan should succeed");

    for port in [80, 443] {
        let result = report.ports().iter().find(|p| p.port() == port).expect("web port present");
        assert_eq!(result.status(), PortStatus::Open, "port {port}");
    }
}

#[tokio::test]
async fn latency_is_only_reported_for_open_ports() {
    let backend = StubBackend::new(5)
        .with_outcome(22, StubOutcome::Open(Duration::from_millis(17)))
        .with_outcome(23, StubOutcome::Closed)
        .with_outcome(25, StubOutcome::Filtered);
    let scanner = Scanner::new(Arc::new(backend), config(8, 500));

    let report = scanner
        .scan("198.51.100.4", ScanMode::Common, None, None, &CancellationToken::new())
        .await
        .expect("scan should succeed");

    for result in report.ports() {
        assert_eq!(result.latency().is_some(), result.is_open(), "port {}", result.port());
    }
    let ssh = &report.ports()[1];
    assert_eq!((ssh.port(), ssh.latency()), (22, Some(Duration::from_millis(17))));
    assert_eq!(
        report.open_ports() + report.closed_ports() + report.filtered_ports(),
        report.total_ports()
    );
}

#[tokio::test]
async fn rejected_requests_send_no_probes() {
    let backend = CountingBackend::new(Duration::ZERO);
    let scanner = Scanner::new(backend.clone(), config(8, 500));
    let cancel = CancellationToken::new();

    let restricted = scanner.scan("localhost", ScanMode::Common, None, None, &cancel).await;
    assert!(matches!(restricted, Err(ScanError::RestrictedTarget { .. })));

    let malformed = scanner.scan("not a host", ScanMode::Common, None, None, &cancel).await;
    assert!(matches!(malformed, Err(ScanError::InvalidFormat { .. })));

    let too_large = scanner
        .scan("192.0.2.1", ScanMode::Range, Some(1), Some(1_000), &cancel)
        .await;
    assert_eq!(too_large.unwrap_err(), ScanError::RangeTooLarge { count: 1_000, max: 256 });

    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn advisor_receives_only_open_ports() {
    let backend = StubBackend::new(0)
        .with_outcome(22, StubOutcome::Open(Duration::from_millis(3)))
        .with_outcome(80, StubOutcome::Closed)
        .with_outcome(443, StubOutcome::Open(Duration::from_millis(4)));
    let analyzer = Arc::new(EchoAnalyzer::default());
    let scanner = Scanner::new(Arc::new(backend), config(8, 500)).with_advisor(analyzer.clone());

    let assessment = scanner
        .assess("192.0.2.10", ScanMode::Range, Some(20), Some(30), &CancellationToken::new())
        .await
        .expect("scan should succeed");

    let seen = analyzer.seen.lock().expect("lock").clone();
    let open: Vec<u16> = assessment.report.open().map(|p| p.port()).collect();
    assert_eq!(seen.iter().map(|p| p.port).collect::<Vec<_>>(), open);
    assert!(open.contains(&22));
    assert!(!open.contains(&80));
    assert_eq!(assessment.insights.len(), open.len());
}

#[tokio::test]
async fn failing_advisor_still_yields_the_report() {
    let scanner = Scanner::new(Arc::new(StubBackend::new(1)), config(8, 500))
        .with_advisor(Arc::new(BrokenAnalyzer));

    let assessment = scanner
        .assess("192.0.2.10", ScanMode::Common, None, None, &CancellationToken::new())
        .await
        .expect("advisory failure must not fail the scan");

    assert_eq!(assessment.report.total_ports(), COMMON_PORTS.len());
    assert!(assessment.insights.is_empty());
}

#[tokio::test]
async fn assessment_serializes_to_the_documented_shape() -> anyhow::Result<()> {
    let backend = StubBackend::new(0)
        .with_outcome(80, StubOutcome::Open(Duration::from_millis(12)))
        .with_outcome(81, StubOutcome::Closed)
        .with_outcome(82, StubOutcome::Filtered);
    let scanner = Scanner::new(Arc::new(backend), config(4, 500));

    let assessment = scanner
        .assess("203.0.113.9", ScanMode::Range, Some(80), Some(82), &CancellationToken::new())
        .await?;
    let doc: Value = serde_json::to_value(&assessment)?;

    assert_eq!(doc["target"], "203.0.113.9");
    assert_eq!(doc["totalPorts"], 3);
    assert_eq!(doc["openPorts"], 1);
    assert!(doc["timeElapsed"].is_f64());
    assert!(doc["timestamp"].is_string());
    assert_eq!(doc["insights"], Value::Array(Vec::new()));

    let ports = doc["ports"].as_array().expect("ports array");
    assert_eq!(ports[0]["status"], "OPEN");
    assert_eq!(ports[0]["service"], "HTTP");
    assert_eq!(ports[0]["latency"], 12);
    assert_eq!(ports[1]["status"], "CLOSED");
    assert!(ports[1].get("latency").is_none());
    assert_eq!(ports[2]["status"], "FILTERED");
    assert_eq!(ports[2]["service"], "Unknown");
    Ok(())
}

#[tokio::test]
async fn cancellation_discards_partial_results() {
    let backend = StubBackend::new(9).with_delay(Duration::from_millis(200), Duration::from_millis(300));
    let scanner = Scanner::new(Arc::new(backend), config(1, 5_000));
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let outcome = scanner
        .scan("192.0.2.77", ScanMode::Range, Some(1), Some(50), &cancel)
        .await;

    assert_eq!(outcome.unwrap_err(), ScanError::ScanCancelled);
}
