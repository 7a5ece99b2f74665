use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use reachr_common::policy::PassPolicy;
use reachr_core::executor::PassSummary;
use reachr_core::progress::{ProgressEvent, ProgressSink, TracingSink};

const BAR_TEMPLATE: &str =
    "{spinner:.blue} {msg} [{bar:32.green/bright_black}] {pos}/{len} {elapsed:.dim}";

pub fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
        .tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ])
}

/// Drives the progress bar of `span` and forwards every observation to
/// [`TracingSink`].
pub struct SpanProgress {
    span: Span,
    log: TracingSink,
}

impl SpanProgress {
    pub fn new(span: Span) -> Self {
        Self {
            span,
            log: TracingSink,
        }
    }
}

impl ProgressSink for SpanProgress {
    fn pass_started(&self, pass: usize, policy: &PassPolicy, targets: usize) {
        self.span.pb_set_length(targets as u64);
        self.span.pb_set_position(0);
        self.span.pb_set_message(&format!("pass {pass} ({policy})"));
        self.log.pass_started(pass, policy, targets);
    }

    fn observe(&self, event: ProgressEvent<'_>) {
        self.span.pb_inc(1);
        self.log.observe(event);
    }

    fn pass_finished(&self, summary: &PassSummary) {
        self.log.pass_finished(summary);
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
