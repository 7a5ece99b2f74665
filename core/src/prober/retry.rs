use async_trait::async_trait;
use tracing::debug;

use reachr_common::outcome::ProbeOutcome;
use reachr_common::policy::InlineRetry;
use reachr_common::target::Target;

use super::Prober;

/// Probes up to `attempts` times with a fixed pause, stopping at the first
/// live answer. When every attempt fails, the last failure is returned.
pub struct Retrying<'a, P: ?Sized> {
    inner: &'a P,
    retry: InlineRetry,
}

impl<'a, P: Prober + ?Sized> Retrying<'a, P> {
    pub fn new(inner: &'a P, retry: InlineRetry) -> Self {
        Self { inner, retry }
    }
}

#[async_trait]
impl<P: Prober + ?Sized> Prober for Retrying<'_, P> {
    async fn probe(&self, target: &Target) -> ProbeOutcome {
        let attempts: u32 = self.retry.attempts.get();
        let mut attempt: u32 = 1;

        loop {
            let outcome: ProbeOutcome = self.inner.probe(target).await;
            if outcome.is_live() || attempt >= attempts {
                return outcome;
            }

            debug!(id = target.id(), attempt, attempts, %outcome, "attempt failed");
            tokio::time::sleep(self.retry.delay).await;
            attempt += 1;
        }
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
