use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::{Instrument, info, info_span};

use crate::commands::CheckArgs;
use crate::terminal::{colors, print, progress::SpanProgress};
use crate::{input, mprint, report};
use reachr_common::config::{Config, ProbeConfig, ScheduleConfig};
use reachr_common::outcome::Unreachable;
use reachr_common::schedule::PassSchedule;
use reachr_common::target::Target;
use reachr_core::controller::{ConvergenceController, Resolution, Termination};
use reachr_core::executor::Failure;
use reachr_core::prober::HttpProber;

type Detail = (String, ColoredString);

pub async fn check(args: CheckArgs, cfg: &Config) -> anyhow::Result<ExitCode> {
    let targets: Vec<Target> = input::load_targets(&args.input)?;
    let schedule_cfg: ScheduleConfig = schedule_config(&args)?;
    let schedule: Box<dyn PassSchedule> = schedule_cfg.build().context("invalid schedule")?;
    let prober: HttpProber = HttpProber::new(&probe_config(&args))?;

    print_plan(&args, &schedule_cfg, targets.len(), cfg);

    let start_time: Instant = Instant::now();
    let span = info_span!("check", indicatif.pb_show = true);
    let sink = SpanProgress::new(span.clone());
    let resolution: Resolution = ConvergenceController::new(&prober, &sink)
        .resolve(targets, schedule.as_ref())
        .instrument(span)
        .await;
    // The sink holds the last handle to the span; dropping it closes the bar.
    drop(sink);

    check_ends(&resolution, start_time.elapsed(), cfg);

    if let Some(path) = &args.output {
        report::write_unresolved(path, &resolution.unresolved)?;
        info!(path = %path.display(), "unresolved targets written to {}", path.display());
    }

    if args.fail_on_unresolved && !resolution.is_clean() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Schedule file first, then flag overrides.
fn schedule_config(args: &CheckArgs) -> anyhow::Result<ScheduleConfig> {
    let mut schedule_cfg: ScheduleConfig = match &args.schedule {
        Some(path) => ScheduleConfig::load(path)?,
        None => ScheduleConfig::default(),
    };

    if let Some(preset) = args.preset {
        schedule_cfg.preset = preset;
    }
    if args.width.is_some() {
        schedule_cfg.width = args.width;
    }
    if args.delay_ms.is_some() {
        schedule_cfg.delay_ms = args.delay_ms;
    }
    if args.slow_after.is_some() {
        schedule_cfg.slow_after = args.slow_after;
    }
    if args.max_passes.is_some() {
        schedule_cfg.max_passes = args.max_passes;
    }
    if args.retries.is_some() {
        schedule_cfg.retries = args.retries;
    }

    Ok(schedule_cfg)
}

fn probe_config(args: &CheckArgs) -> ProbeConfig {
    let mut probe_cfg = ProbeConfig::default();
    if let Some(secs) = args.timeout_secs {
        probe_cfg.timeout = Duration::from_secs(secs);
    }
    probe_cfg
}

fn print_plan(args: &CheckArgs, schedule_cfg: &ScheduleConfig, total: usize, cfg: &Config) {
    print::header("getting ready to check", cfg.quiet);
    if cfg.quiet > 0 {
        return;
    }

    let schedule: String = if schedule_cfg.passes.is_empty() {
        format!("{} preset", schedule_cfg.preset)
    } else {
        format!("{} explicit passes", schedule_cfg.passes.len())
    };

    print::align_keys(&["Targets", "Source", "Schedule", "Report"]);
    print::aligned_line("Targets", total.to_string().color(colors::ACCENT));
    print::aligned_line("Source", args.input.display().to_string());
    print::aligned_line("Schedule", schedule);
    if let Some(path) = &args.output {
        print::aligned_line("Report", path.display().to_string());
    }
}

fn check_ends(resolution: &Resolution, total_time: Duration, cfg: &Config) {
    if cfg.quiet > 0 {
        mprint!();
    }

    print_passes(resolution, cfg);

    if resolution.is_clean() {
        print::header("every target is live", cfg.quiet);
    } else {
        print::header("unresolved targets", cfg.quiet);
        print_unresolved(&resolution.unresolved, cfg);
    }

    print_summary(resolution, total_time, cfg);
}

fn print_passes(resolution: &Resolution, cfg: &Config) {
    if cfg.quiet > 0 || resolution.passes.is_empty() {
        return;
    }

    print::header("passes", cfg.quiet);
    for summary in &resolution.passes {
        let resolved: ColoredString = summary.resolved().to_string().color(colors::LIVE);
        let failed: ColoredString = summary.failed.to_string().color(colors::BAD_STATUS);
        print::print_status(format!(
            "pass {} ({}): {resolved} live, {failed} failing",
            summary.pass, summary.policy
        ));
    }
}

fn print_unresolved(unresolved: &[Failure], cfg: &Config) {
    if cfg.quiet > 1 {
        return;
    }

    for (idx, failure) in unresolved.iter().enumerate() {
        print::tree_head(idx, failure.target.id());
        print::as_tree_one_level(failure_details(failure));
        if idx + 1 != unresolved.len() {
            mprint!();
        }
    }
}

fn failure_details(failure: &Failure) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    if failure.target.id() != failure.target.url().as_str() {
        details.push(("URL".to_string(), failure.target.url().as_str().normal()));
    }
    details.push(("Reason".to_string(), reason_value(&failure.reason)));

    if let Some(serde_json::Value::Object(fields)) = failure.target.metadata() {
        for (key, value) in fields {
            let value: String = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            details.push((key.clone(), value.dimmed()));
        }
    }

    details
}

fn reason_value(reason: &Unreachable) -> ColoredString {
    let color = match reason {
        Unreachable::BadStatus(_) => colors::BAD_STATUS,
        Unreachable::TransportFailure(_) => colors::TRANSPORT,
        Unreachable::Unprobed => colors::UNPROBED,
    };
    reason.to_string().color(color)
}

fn print_summary(resolution: &Resolution, total_time: Duration, cfg: &Config) {
    let live: ColoredString = format!("{} live", resolution.resolved).bold().green();
    let unresolved: ColoredString = match resolution.unresolved.len() {
        0 => "none unresolved".bold().green(),
        n => format!("{n} unresolved").bold().red(),
    };
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: ColoredString = format!(
        "Check complete: {live}, {unresolved} in {total_time} ({})",
        termination_text(resolution.termination)
    )
    .color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
        }
        _ => print::print_status(output.to_string()),
    }
}

fn termination_text(termination: Termination) -> String {
    match termination {
        Termination::AllResolved => termination.to_string(),
        other => other.to_string().italic().to_string(),
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
