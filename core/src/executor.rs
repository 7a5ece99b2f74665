//! # Pass Executor
//!
//! Runs one pass: every input target is probed exactly once under a single
//! [`PassPolicy`], and the targets that did not come back live are returned
//! with their last outcome.
//!
//! ## Modes
//! * **Chunked** (`concurrency > 1`): targets are split into consecutive
//!   chunks of `concurrency`. A chunk is probed concurrently and must finish
//!   completely before the next one starts, which caps in-flight requests.
//! * **Sequential** (`concurrency == 1`): targets are probed in input order,
//!   `delay` apart, to stay under origin rate limits.

use futures_util::future::join_all;
use serde::Serialize;
use tokio::time::{sleep, timeout};

use reachr_common::outcome::{ProbeOutcome, Unreachable};
use reachr_common::policy::PassPolicy;
use reachr_common::target::Target;

use crate::prober::{Prober, Retrying};
use crate::progress::{ProgressEvent, ProgressSink};

/// A target that failed, with the outcome of its most recent probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub target: Target,
    pub reason: Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassResult {
    pub pass: usize,
    pub policy: PassPolicy,
    pub attempted: usize,
    /// Failed targets, in input order.
    pub failed: Vec<Failure>,
}

impl PassResult {
    pub fn resolved(&self) -> usize {
        self.attempted - self.failed.len()
    }

    pub fn summary(&self) -> PassSummary {
        PassSummary {
            pass: self.pass,
            policy: self.policy.clone(),
            attempted: self.attempted,
            failed: self.failed.len(),
        }
    }
}

/// Counts-only view of a finished pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub pass: usize,
    pub policy: PassPolicy,
    pub attempted: usize,
    pub failed: usize,
}

impl PassSummary {
    pub fn resolved(&self) -> usize {
        self.attempted - self.failed
    }

    /// Nothing improved during this pass.
    pub fn is_stagnant(&self) -> bool {
        self.attempted > 0 && self.failed == self.attempted
    }
}

pub struct PassExecutor<'a, P: ?Sized> {
    prober: &'a P,
    sink: &'a dyn ProgressSink,
}

impl<'a, P: Prober + ?Sized> PassExecutor<'a, P> {
    pub fn new(prober: &'a P, sink: &'a dyn ProgressSink) -> Self {
        Self { prober, sink }
    }

    /// Probes every target once under `policy`.
    ///
    /// Individual failures never abort the pass.
    pub async fn run_pass(&self, pass: usize, targets: Vec<Target>, policy: &PassPolicy) -> PassResult {
        self.sink.pass_started(pass, policy, targets.len());

        let outcomes: Vec<ProbeOutcome> = if policy.is_sequential() {
            self.run_sequential(pass, &targets, policy).await
        } else {
            self.run_chunked(pass, &targets, policy).await
        };

        let attempted: usize = targets.len();
        let failed: Vec<Failure> = targets
            .into_iter()
            .zip(outcomes)
            .filter_map(|(target, outcome)| {
                outcome
                    .into_unreachable()
                    .map(|reason| Failure { target, reason })
            })
            .collect();

        let result = PassResult {
            pass,
            policy: policy.clone(),
            attempted,
            failed,
        };
        self.sink.pass_finished(&result.summary());
        result
    }

    async fn run_sequential(&self, pass: usize, targets: &[Target], policy: &PassPolicy) -> Vec<ProbeOutcome> {
        let mut outcomes: Vec<ProbeOutcome> = Vec::with_capacity(targets.len());
        for (idx, target) in targets.iter().enumerate() {
            if idx > 0 && !policy.delay.is_zero() {
                sleep(policy.delay).await;
            }
            outcomes.push(self.probe_one(pass, target, policy).await);
        }
        outcomes
    }

    async fn run_chunked(&self, pass: usize, targets: &[Target], policy: &PassPolicy) -> Vec<ProbeOutcome> {
        let mut outcomes: Vec<ProbeOutcome> = Vec::with_capacity(targets.len());
        for chunk in targets.chunks(policy.concurrency.get()) {
            let probes = chunk
                .iter()
                .map(|target| self.probe_one(pass, target, policy));
            // join_all keeps results aligned with the chunk's order.
            outcomes.extend(join_all(probes).await);
        }
        outcomes
    }

    async fn probe_one(&self, pass: usize, target: &Target, policy: &PassPolicy) -> ProbeOutcome {
        let attempt = async {
            match policy.retry {
                Some(retry) => Retrying::new(self.prober, retry).probe(target).await,
                None => self.prober.probe(target).await,
            }
        };

        let outcome: ProbeOutcome = match policy.timeout {
            Some(limit) => timeout(limit, attempt).await.unwrap_or_else(|_| {
                ProbeOutcome::transport(format!("probe timed out after {}ms", limit.as_millis()))
            }),
            None => attempt.await,
        };

        self.sink.observe(ProgressEvent {
            pass,
            target,
            outcome: &outcome,
        });
        outcome
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
