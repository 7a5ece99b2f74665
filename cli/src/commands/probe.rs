use std::process::ExitCode;
use std::time::{Duration, Instant};

use colored::*;

use crate::terminal::{colors, print};
use reachr_common::config::{Config, ProbeConfig};
use reachr_common::outcome::{ProbeOutcome, Unreachable};
use reachr_common::target::Target;
use reachr_core::prober::{HttpProber, Prober};

/// One probe, no passes. Exits with status 1 when the target is unreachable.
pub async fn probe(target: Target, timeout_secs: Option<u64>, cfg: &Config) -> anyhow::Result<ExitCode> {
    let mut probe_cfg = ProbeConfig::default();
    if let Some(secs) = timeout_secs {
        probe_cfg.timeout = Duration::from_secs(secs);
    }
    let prober: HttpProber = HttpProber::new(&probe_cfg)?;

    let start_time: Instant = Instant::now();
    let outcome: ProbeOutcome = prober.probe(&target).await;
    let elapsed: Duration = start_time.elapsed();

    print::header("probe result", cfg.quiet);
    print::align_keys(&["Target", "Outcome", "Time"]);
    print::aligned_line("Target", target.url().as_str());
    print::aligned_line("Outcome", outcome_value(&outcome));
    if cfg.quiet == 0 {
        print::aligned_line("Time", format!("{}ms", elapsed.as_millis()).color(colors::ACCENT));
    }

    match outcome {
        ProbeOutcome::Live => Ok(ExitCode::SUCCESS),
        ProbeOutcome::Unreachable(_) => Ok(ExitCode::FAILURE),
    }
}

fn outcome_value(outcome: &ProbeOutcome) -> ColoredString {
    match outcome {
        ProbeOutcome::Live => "live".color(colors::LIVE).bold(),
        ProbeOutcome::Unreachable(reason @ Unreachable::BadStatus(_)) => {
            reason.to_string().color(colors::BAD_STATUS)
        }
        ProbeOutcome::Unreachable(reason) => reason.to_string().color(colors::TRANSPORT),
    }
}
