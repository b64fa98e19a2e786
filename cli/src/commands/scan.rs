use std::sync::Arc;

use anyhow::Context;
use colored::*;
use probr_common::config::Config;
use probr_common::error::ScanError;
use probr_common::report::{Insight, PortResult, ScanReport};
use probr_common::success;
use probr_core::advisory::CommandAnalyzer;
use probr_core::scanner::{Assessment, Scanner};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, info_span, warn};

use crate::commands::ScanArgs;
use crate::terminal::{colors, format, print, progress};

const KEY_WIDTH: usize = 8;

pub async fn scan(args: ScanArgs, cfg: &Config) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping in-flight probes");
                cancel.cancel();
            }
        }
    });

    let span: Span = if args.json || cfg.quiet > 0 {
        Span::none()
    } else {
        let span = info_span!("scan", indicatif.pb_show = true);
        progress::attach(&span, &args.target);
        span
    };

    let mut scanner = Scanner::new(args.backend(), args.scan_config())
        .with_progress(progress::reporter(span.clone()));
    if let Some(program) = &args.advisor_cmd {
        let analyzer = CommandAnalyzer::new(program).with_args(&args.advisor_args);
        scanner = scanner.with_advisor(Arc::new(analyzer));
    }

    if !args.json {
        print::header(&format!("probing {}", args.target), cfg.quiet);
    }

    let outcome = scanner
        .assess(&args.target, args.mode.into(), args.start, args.end, &cancel)
        .instrument(span.clone())
        .await;

    // Finish the progress bar before anything else reaches the terminal.
    drop(scanner);
    drop(span);
    watcher.abort();

    let assessment: Assessment = match outcome {
        Ok(assessment) => assessment,
        Err(e) => {
            if let Some(hint) = hint(&e) {
                warn!("{hint}");
            }
            return Err(e.into());
        }
    };

    if args.json {
        let document = serde_json::to_string_pretty(&assessment)
            .context("failed to serialize the scan report")?;
        println!("{document}");
        return Ok(());
    }

    render(&assessment, args.open_only, cfg);
    Ok(())
}

fn hint(e: &ScanError) -> Option<String> {
    match e {
        ScanError::InvalidFormat { .. } => {
            Some("Use an IPv4 address (203.0.113.7) or a hostname (scanme.example.org)".into())
        }
        ScanError::RestrictedTarget { .. } => {
            Some("Loopback, localhost and 0.0.0.0 cannot be probed".into())
        }
        ScanError::RangeTooLarge { max, .. } => {
            Some(format!("Narrow --start/--end to at most {max} ports"))
        }
        ScanError::ScanCancelled => None,
    }
}

fn render(assessment: &Assessment, open_only: bool, cfg: &Config) {
    let report: &ScanReport = &assessment.report;

    if cfg.quiet < 2 {
        let rows: Vec<&PortResult> = report
            .ports()
            .iter()
            .filter(|result| !open_only || result.is_open())
            .collect();
        for result in rows {
            print_port(result);
        }

        if report.open_ports() == 0 && cfg.quiet == 0 {
            print::no_results();
        }
    }

    print_summary(report, cfg.quiet);

    if !assessment.insights.is_empty() && cfg.quiet < 2 {
        print::header("advisories", cfg.quiet);
        for insight in &assessment.insights {
            print_insight(insight);
        }
    }

    if cfg.quiet == 0 {
        print::fat_separator();
    }
}

fn print_port(result: &PortResult) {
    let port: ColoredString = format!("{:>5}", result.port()).color(colors::PRIMARY);
    let service: ColoredString = format!("{:<14}", result.service()).color(colors::SECONDARY);
    print::print_status(format!(
        "{port}  {}  {service} {}",
        format::status(result.status()),
        format::latency(result.latency())
    ));
}

fn print_summary(report: &ScanReport, q_level: u8) {
    if q_level >= 2 {
        success!(
            "{}: {} open, {} closed, {} filtered in {}",
            report.target(),
            report.open_ports(),
            report.closed_ports(),
            report.filtered_ports(),
            format::seconds(report.elapsed())
        );
        return;
    }

    print::header("summary", q_level);
    print::aligned_line("Target", report.target(), KEY_WIDTH);
    print::aligned_line("Probed", report.total_ports(), KEY_WIDTH);
    print::aligned_line("Open", report.open_ports().to_string().color(colors::OPEN), KEY_WIDTH);
    print::aligned_line("Closed", report.closed_ports(), KEY_WIDTH);
    print::aligned_line("Filtered", report.filtered_ports(), KEY_WIDTH);
    print::aligned_line("Elapsed", format::seconds(report.elapsed()), KEY_WIDTH);
}

fn print_insight(insight: &Insight) {
    print::print_status(format!(
        "{} {}",
        format::severity(insight.severity),
        insight.vulnerability.bold()
    ));
    print::print(&format!(
        "  {} {}",
        "↳".color(colors::SEPARATOR),
        insight.recommendation.color(colors::TEXT_DEFAULT)
    ));
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
