use colored::*;
use probr_common::log::{PRINT_TARGET, SUCCESS_TARGET};
use tracing::{Event, Level, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_indicatif::filter::IndicatifFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

const CRATES: &[&str] = &["probr", "probr_cli", "probr_core", "probr_common"];

pub struct ProbrFormatter;

impl<S, N> FormatEvent<S, N> for ProbrFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if meta.target() != PRINT_TARGET {
            let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) =
                match *meta.level() {
                    _ if meta.target() == SUCCESS_TARGET => ("[+]", |s| s.green().bold()),
                    Level::TRACE => ("[ ]", |s| s.dimmed()),
                    Level::DEBUG => ("[?]", |s| s.blue()),
                    Level::INFO => ("[*]", |s| s.cyan().bold()),
                    Level::WARN => ("[!]", |s| s.yellow().bold()),
                    Level::ERROR => ("[-]", |s| s.red().bold()),
                };
            write!(writer, "{} ", color_func(symbol.into()))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides the level derived from `verbose`. Machine-readable
/// runs send every log line to stderr so stdout carries only the document.
pub fn init(verbose: u8, machine_output: bool) {
    let level: &str = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let directives: String = CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .fold(String::from("warn"), |acc, d| format!("{acc},{d}"));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let indicatif_layer = IndicatifLayer::new();
    let writer: BoxMakeWriter = if machine_output {
        BoxMakeWriter::new(indicatif_layer.get_stderr_writer())
    } else {
        BoxMakeWriter::new(indicatif_layer.get_stdout_writer())
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .event_format(ProbrFormatter)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(indicatif_layer.with_filter(IndicatifFilter::new(false)))
        .init();
}
