//! Test doubles shared by the engine's unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use reachr_common::outcome::ProbeOutcome;
use reachr_common::policy::PassPolicy;
use reachr_common::target::Target;

use crate::executor::PassSummary;
use crate::prober::Prober;
use crate::progress::{ProgressEvent, ProgressSink};

/// Target identified by `id`, pointing at `http://{id}.test/`.
pub(crate) fn target(id: &str) -> Target {
    Target::new(id, &format!("http://{id}.test/")).unwrap()
}

pub(crate) fn targets(ids: &[&str]) -> Vec<Target> {
    ids.iter().map(|id| target(id)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mark {
    Start,
    End,
}

/// Replays a per-target script of outcomes.
///
/// The n-th probe of a target returns the n-th scripted outcome, repeating the
/// last one once the script runs out. Unscripted targets are always live.
pub(crate) struct ScriptedProber {
    scripts: HashMap<String, Vec<ProbeOutcome>>,
    latency: Duration,
    calls: Mutex<HashMap<String, usize>>,
    journal: Mutex<Vec<(Mark, String, Instant)>>,
}

impl ScriptedProber {
    pub(crate) fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            latency: Duration::ZERO,
            calls: Mutex::new(HashMap::new()),
            journal: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn script(mut self, id: &str, outcomes: Vec<ProbeOutcome>) -> Self {
        self.scripts.insert(id.to_string(), outcomes);
        self
    }

    pub(crate) fn always(self, id: &str, outcome: ProbeOutcome) -> Self {
        self.script(id, vec![outcome])
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub(crate) fn calls_for(&self, id: &str) -> usize {
        self.calls.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Start/end marks in the order they happened.
    pub(crate) fn journal(&self) -> Vec<(Mark, String, Instant)> {
        self.journal.lock().unwrap().clone()
    }

    fn record(&self, mark: Mark, id: &str) {
        self.journal
            .lock()
            .unwrap()
            .push((mark, id.to_string(), Instant::now()));
    }
}

/// Answers 429 `misses` times for each of `ids`, then live.
pub(crate) fn rate_limited(ids: &[&str], misses: usize) -> ScriptedProber {
    ids.iter().fold(ScriptedProber::new(), |scripted, id| {
        let mut outcomes = vec![ProbeOutcome::bad_status(429); misses];
        outcomes.push(ProbeOutcome::Live);
        scripted.script(id, outcomes)
    })
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, target: &Target) -> ProbeOutcome {
        let id: &str = target.id();
        let nth: usize = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(id.to_string()).or_insert(0);
            *count += 1;
            *count - 1
        };

        self.record(Mark::Start, id);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.record(Mark::End, id);

        match self.scripts.get(id) {
            Some(script) if !script.is_empty() => script[nth.min(script.len() - 1)].clone(),
            _ => ProbeOutcome::Live,
        }
    }
}

/// Keeps every progress callback for later assertions.
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) started: Mutex<Vec<(usize, usize)>>,
    pub(crate) events: Mutex<Vec<(usize, String, ProbeOutcome)>>,
    pub(crate) finished: Mutex<Vec<PassSummary>>,
}

impl ProgressSink for RecordingSink {
    fn pass_started(&self, pass: usize, _policy: &PassPolicy, targets: usize) {
        self.started.lock().unwrap().push((pass, targets));
    }

    fn observe(&self, event: ProgressEvent<'_>) {
        self.events.lock().unwrap().push((
            event.pass,
            event.target.id().to_string(),
            event.outcome.clone(),
        ));
    }

    fn pass_finished(&self, summary: &PassSummary) {
        self.finished.lock().unwrap().push(summary.clone());
    }
}
