use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

const BAR_TEMPLATE: &str = "{spinner:.blue} {msg} [{bar:32.green/bright_black}] {pos}/{len} ports";
const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICKS)
        .progress_chars("━╸ ")
}

/// Turns `span` into a progress bar labelled with `target`.
pub fn attach(span: &Span, target: &str) {
    span.pb_set_style(&bar_style());
    span.pb_set_message(&format!("Probing {target}"));
}

/// Progress callback for the scanner, moving the bar of `span`.
pub fn reporter(span: Span) -> impl Fn(usize, usize) + Send + Sync + 'static {
    move |completed, total| {
        span.pb_set_length(total as u64);
        span.pb_set_position(completed as u64);
    }
}
