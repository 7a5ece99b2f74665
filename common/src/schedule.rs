//! # Pass Schedules
//!
//! A schedule maps a 1-based pass index to the [`PassPolicy`] for that pass,
//! or to `None` once it is exhausted. The convergence loop asks the schedule
//! before every pass, so swapping fast/slow strategies is a matter of
//! configuration rather than control flow.
//!
//! Provided implementations:
//! * [`FixedSchedule`]: a finite list of policies.
//! * [`TaperingSchedule`]: shrinking concurrent passes, then sequential ones.
//! * Any `Fn(usize) -> Option<PassPolicy>` closure.

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::policy::{InlineRetry, PassPolicy};

/// Narrowest width a fast pass may use. A width of one would be sequential,
/// and the controller treats sequential passes as the patient ones.
pub const MIN_FAST_WIDTH: usize = 2;

pub trait PassSchedule: Send + Sync {
    /// Policy for pass `pass` (1-based), or `None` when no such pass exists.
    fn policy_for(&self, pass: usize) -> Option<PassPolicy>;
}

impl<F> PassSchedule for F
where
    F: Fn(usize) -> Option<PassPolicy> + Send + Sync,
{
    fn policy_for(&self, pass: usize) -> Option<PassPolicy> {
        self(pass)
    }
}

/// A finite, explicit sequence of pass policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSchedule {
    passes: Vec<PassPolicy>,
}

impl FixedSchedule {
    pub fn new(passes: Vec<PassPolicy>) -> Self {
        Self { passes }
    }

}

impl PassSchedule for FixedSchedule {
    fn policy_for(&self, pass: usize) -> Option<PassPolicy> {
        pass.checked_sub(1)
            .and_then(|idx| self.passes.get(idx))
            .cloned()
    }
}

/// Concurrent passes whose width halves every pass until `slow_after`,
/// followed by sequential passes `slow_delay` apart.
///
/// Fast passes never narrow below [`MIN_FAST_WIDTH`], so the first
/// sequential pass is always the delayed one.
///
/// Without `max_passes` the schedule never ends on its own. Its tail is
/// always sequential, so the stagnation guard still bounds the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaperingSchedule {
    pub initial_width: NonZeroUsize,
    pub slow_after: usize,
    pub slow_delay: Duration,
    pub max_passes: Option<usize>,
    pub retry: Option<InlineRetry>,
    pub timeout: Option<Duration>,
}

impl TaperingSchedule {
    pub fn new(initial_width: usize, slow_after: usize, slow_delay: Duration) -> Self {
        Self {
            initial_width: NonZeroUsize::new(initial_width).unwrap_or(NonZeroUsize::MIN),
            slow_after,
            slow_delay,
            max_passes: None,
            retry: None,
            timeout: None,
        }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = Some(max_passes);
        self
    }

    pub fn with_retry(mut self, retry: InlineRetry) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn width_for(&self, pass: usize) -> usize {
        let shift: u32 = u32::try_from(pass.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_width
            .get()
            .checked_shr(shift)
            .unwrap_or(0)
            .max(MIN_FAST_WIDTH)
    }
}

impl PassSchedule for TaperingSchedule {
    fn policy_for(&self, pass: usize) -> Option<PassPolicy> {
        if pass == 0 || self.max_passes.is_some_and(|max| pass > max) {
            return None;
        }

        let mut policy: PassPolicy = if pass <= self.slow_after {
            PassPolicy::concurrent(self.width_for(pass))
        } else {
            PassPolicy::sequential(self.slow_delay)
        };

        if let Some(retry) = self.retry {
            policy = policy.with_retry(retry);
        }
        if let Some(timeout) = self.timeout {
            policy = policy.with_timeout(timeout);
        }
        Some(policy)
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
