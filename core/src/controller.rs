//! # Convergence Controller
//!
//! Drives repeated passes over a shrinking set of failing targets.
//!
//! ## Lifecycle
//! 1. Every target starts out remaining.
//! 2. Before each pass the [`PassSchedule`] is asked for the next policy.
//! 3. The pass returns the targets that still fail. They, and only they,
//!    feed the next pass, so a target that succeeds once is never probed again.
//!
//! ## Termination
//! The loop ends when nothing remains, when the schedule has no policy for
//! the next pass, or when a sequential pass (the most patient mode) fails to
//! resolve a single target. The pass limit in [`ConvergenceOptions`] also
//! caps schedules that never end and never slow down.

use std::fmt;
use std::num::NonZeroUsize;

use tracing::{info, warn};

use reachr_common::outcome::Unreachable;
use reachr_common::policy::PassPolicy;
use reachr_common::schedule::PassSchedule;
use reachr_common::target::Target;

use crate::executor::{Failure, PassExecutor, PassResult, PassSummary};
use crate::prober::Prober;
use crate::progress::ProgressSink;

pub const DEFAULT_PASS_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergenceOptions {
    /// Consecutive zero-improvement sequential passes before giving up.
    pub stagnation_streak: NonZeroUsize,
    /// Passes past this index are treated as missing from the schedule.
    pub pass_limit: usize,
}

impl Default for ConvergenceOptions {
    fn default() -> Self {
        Self {
            stagnation_streak: NonZeroUsize::MIN,
            pass_limit: DEFAULT_PASS_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The input was empty; no pass ran.
    NoTargets,
    AllResolved,
    ScheduleExhausted,
    /// A sequential pass made no progress.
    Stagnated,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoTargets => "no targets",
            Self::AllResolved => "all targets resolved",
            Self::ScheduleExhausted => "schedule exhausted",
            Self::Stagnated => "no progress at maximum patience",
        };
        f.write_str(text)
    }
}

/// Final classification of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub total: usize,
    /// Targets confirmed live across all passes.
    pub resolved: usize,
    /// Targets still failing, in input order, with their last outcome.
    pub unresolved: Vec<Failure>,
    pub passes: Vec<PassSummary>,
    pub termination: Termination,
}

impl Resolution {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Remaining {
    Unprobed(Vec<Target>),
    Failing(Vec<Failure>),
}

impl Remaining {
    fn len(&self) -> usize {
        match self {
            Self::Unprobed(targets) => targets.len(),
            Self::Failing(failures) => failures.len(),
        }
    }
}

/// Controller state at a pass boundary.
///
/// Never mutated in place: [`ConvergenceState::advance`] consumes a state and
/// yields the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvergenceState {
    total: usize,
    resolved: usize,
    remaining: Remaining,
    stagnant_streak: usize,
    passes: Vec<PassSummary>,
}

pub enum Step {
    Continue(ConvergenceState),
    Done(Resolution),
}

impl ConvergenceState {
    pub fn new(targets: Vec<Target>) -> Self {
        Self {
            total: targets.len(),
            resolved: 0,
            remaining: Remaining::Unprobed(targets),
            stagnant_streak: 0,
            passes: Vec::new(),
        }
    }

    /// 1-based index of the pass about to run.
    pub fn next_pass(&self) -> usize {
        self.passes.len() + 1
    }

    pub fn resolved(&self) -> usize {
        self.resolved
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Input for the next pass.
    pub fn targets(&self) -> Vec<Target> {
        match &self.remaining {
            Remaining::Unprobed(targets) => targets.clone(),
            Remaining::Failing(failures) => failures.iter().map(|f| f.target.clone()).collect(),
        }
    }

    /// Folds a finished pass into the state.
    pub fn advance(self, result: PassResult, options: &ConvergenceOptions) -> Step {
        let summary: PassSummary = result.summary();
        debug_assert_eq!(summary.attempted, self.remaining());

        let stagnant_streak: usize = if !summary.is_stagnant() {
            0
        } else if summary.policy.is_sequential() {
            self.stagnant_streak + 1
        } else {
            self.stagnant_streak
        };

        let mut passes: Vec<PassSummary> = self.passes;
        passes.push(summary);

        let next = Self {
            total: self.total,
            resolved: self.resolved + result.resolved(),
            remaining: Remaining::Failing(result.failed),
            stagnant_streak,
            passes,
        };
        debug_assert_eq!(next.resolved + next.remaining(), next.total);

        if next.remaining() == 0 {
            Step::Done(next.finish(Termination::AllResolved))
        } else if next.stagnant_streak >= options.stagnation_streak.get() {
            Step::Done(next.finish(Termination::Stagnated))
        } else {
            Step::Continue(next)
        }
    }

    pub fn finish(self, termination: Termination) -> Resolution {
        let unresolved: Vec<Failure> = match self.remaining {
            Remaining::Unprobed(targets) => targets
                .into_iter()
                .map(|target| Failure {
                    target,
                    reason: Unreachable::Unprobed,
                })
                .collect(),
            Remaining::Failing(failures) => failures,
        };

        Resolution {
            total: self.total,
            resolved: self.resolved,
            unresolved,
            passes: self.passes,
            termination,
        }
    }
}

pub struct ConvergenceController<'a, P: ?Sized> {
    executor: PassExecutor<'a, P>,
    options: ConvergenceOptions,
}

impl<'a, P: Prober + ?Sized> ConvergenceController<'a, P> {
    pub fn new(prober: &'a P, sink: &'a dyn ProgressSink) -> Self {
        Self {
            executor: PassExecutor::new(prober, sink),
            options: ConvergenceOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConvergenceOptions) -> Self {
        self.options = options;
        self
    }

    /// Classifies `targets` into resolved and unresolved.
    ///
    /// Always terminates and never fails: unreachable targets are part of the
    /// returned [`Resolution`], not an error.
    pub async fn resolve<S>(&self, targets: Vec<Target>, schedule: &S) -> Resolution
    where
        S: PassSchedule + ?Sized,
    {
        let mut state = ConvergenceState::new(targets);
        if state.remaining() == 0 {
            return state.finish(Termination::NoTargets);
        }

        loop {
            let pass: usize = state.next_pass();
            let Some(policy) = self.policy_for(schedule, pass) else {
                return report(state.finish(Termination::ScheduleExhausted));
            };

            let result: PassResult = self.executor.run_pass(pass, state.targets(), &policy).await;
            info!(
                pass,
                resolved = result.resolved(),
                failing = result.failed.len(),
                "pass {pass} ({policy}): {} resolved, {} still failing",
                result.resolved(),
                result.failed.len()
            );

            state = match state.advance(result, &self.options) {
                Step::Continue(next) => next,
                Step::Done(resolution) => return report(resolution),
            };
        }
    }

    fn policy_for<S>(&self, schedule: &S, pass: usize) -> Option<PassPolicy>
    where
        S: PassSchedule + ?Sized,
    {
        let policy: PassPolicy = schedule.policy_for(pass)?;
        if pass > self.options.pass_limit {
            warn!(
                limit = self.options.pass_limit,
                "pass limit reached, treating schedule as exhausted"
            );
            return None;
        }
        Some(policy)
    }
}

fn report(resolution: Resolution) -> Resolution {
    info!(
        passes = resolution.passes.len(),
        resolved = resolution.resolved,
        unresolved = resolution.unresolved.len(),
        "finished: {}",
        resolution.termination
    );
    resolution
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
