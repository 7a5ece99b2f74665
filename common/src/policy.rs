//! # Pass Policy
//!
//! How a single pass over the remaining targets is executed.
//!
//! A width of 1 is the patience-maximizing "sequential" mode: targets are
//! probed one by one with a delay in between. Any wider policy probes in
//! bounded concurrent chunks and ignores the delay.

use std::fmt;
use std::num::{NonZeroU32, NonZeroUsize};
use std::time::Duration;

/// Attempts made against one target inside a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineRetry {
    pub attempts: NonZeroU32,
    pub delay: Duration,
}

impl InlineRetry {
    /// A zero attempt count is treated as a single attempt.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: NonZeroU32::new(attempts).unwrap_or(NonZeroU32::MIN),
            delay,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassPolicy {
    /// Targets probed in parallel, also the chunk size.
    pub concurrency: NonZeroUsize,
    /// Pause between consecutive probes in sequential mode.
    pub delay: Duration,
    pub retry: Option<InlineRetry>,
    /// Upper bound for one target's probing, retries included.
    pub timeout: Option<Duration>,
}

impl PassPolicy {
    /// Chunked concurrent probing. A width of 0 is clamped to 1.
    pub fn concurrent(width: usize) -> Self {
        Self {
            concurrency: NonZeroUsize::new(width).unwrap_or(NonZeroUsize::MIN),
            delay: Duration::ZERO,
            retry: None,
            timeout: None,
        }
    }

    /// One target at a time, `delay` apart.
    pub fn sequential(delay: Duration) -> Self {
        Self {
            concurrency: NonZeroUsize::MIN,
            delay,
            retry: None,
            timeout: None,
        }
    }

    pub fn with_retry(mut self, retry: InlineRetry) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn is_sequential(&self) -> bool {
        self.concurrency.get() == 1
    }

    /// Number of chunks needed to cover `targets` targets.
    pub fn chunk_count(&self, targets: usize) -> usize {
        targets.div_ceil(self.concurrency.get())
    }
}

impl fmt::Display for PassPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sequential() {
            write!(f, "sequential, {}ms apart", self.delay.as_millis())?;
        } else {
            write!(f, "concurrent x{}", self.concurrency)?;
        }
        if let Some(retry) = self.retry {
            write!(f, ", {} attempts", retry.attempts)?;
        }
        Ok(())
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
