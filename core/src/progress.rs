//! Progress observations emitted while passes run.
//!
//! Observations are informational only. Nothing a sink does can influence
//! which targets are retried or how a pass ends.

use tracing::{debug, info};

use reachr_common::outcome::ProbeOutcome;
use reachr_common::policy::PassPolicy;
use reachr_common::target::Target;

use crate::executor::PassSummary;

/// One probed target within one pass.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent<'a> {
    pub pass: usize,
    pub target: &'a Target,
    pub outcome: &'a ProbeOutcome,
}

/// Receiver for progress observations.
///
/// Probes inside a chunk run concurrently, so implementations must tolerate
/// interleaved calls to [`ProgressSink::observe`].
pub trait ProgressSink: Send + Sync {
    fn pass_started(&self, _pass: usize, _policy: &PassPolicy, _targets: usize) {}

    fn observe(&self, event: ProgressEvent<'_>);

    fn pass_finished(&self, _summary: &PassSummary) {}
}

/// Writes every observation to `tracing`.
///
/// Live targets are logged at `DEBUG`, failures at `INFO`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn pass_started(&self, pass: usize, policy: &PassPolicy, targets: usize) {
        debug!(pass, targets, "starting pass {pass} ({policy})");
    }

    fn observe(&self, event: ProgressEvent<'_>) {
        match event.outcome {
            ProbeOutcome::Live => {
                debug!(pass = event.pass, url = %event.target.url(), "live: {}", event.target);
            }
            ProbeOutcome::Unreachable(reason) => {
                info!(pass = event.pass, url = %event.target.url(), "{reason}: {}", event.target);
            }
        }
    }
}
