//! # Configuration
//!
//! * [`Config`]: how results are presented.
//! * [`ProbeConfig`]: how a single HTTP probe behaves.
//! * [`ScheduleConfig`]: which passes run, loaded from TOML and/or flags.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::policy::{InlineRetry, PassPolicy};
use crate::schedule::{FixedSchedule, MIN_FAST_WIDTH, PassSchedule, TaperingSchedule};

pub const DEFAULT_WIDTH: usize = 25;
pub const DEFAULT_SLOW_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_FIXED_FAST_PASSES: usize = 2;
pub const DEFAULT_TAPERING_FAST_PASSES: usize = 3;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid schedule file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

pub struct Config {
    /// Skips the start-up banner.
    pub no_banner: bool,
    /// 0 prints everything, 1 hides decorations, 2 prints only the summary.
    pub quiet: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Transport-level timeout for one request.
    pub timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
    /// Re-probe with GET when an origin rejects HEAD (405/501).
    pub head_fallback: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("reachr/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
            head_fallback: true,
        }
    }
}

/// Named schedules covering the usual fast-then-patient strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// A fixed number of full-width passes, then one sequential pass.
    Fixed,
    /// Halving concurrent passes, then sequential passes until stagnation.
    #[default]
    Tapering,
    /// Like `Tapering`, with inline retries on every pass.
    Retrying,
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "tapering" => Ok(Self::Tapering),
            "retrying" => Ok(Self::Retrying),
            other => Err(format!(
                "unknown preset '{other}', expected fixed, tapering or retrying"
            )),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fixed => "fixed",
            Self::Tapering => "tapering",
            Self::Retrying => "retrying",
        };
        f.write_str(name)
    }
}

/// One explicitly configured pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PassConfig {
    #[serde(default = "one")]
    pub width: usize,
    #[serde(default)]
    pub delay_ms: u64,
    pub retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

fn one() -> usize {
    1
}

/// Schedule settings as written in a TOML file.
///
/// ```toml
/// preset = "tapering"
/// width = 32
/// slow_after = 2
/// delay_ms = 1000
/// ```
///
/// An explicit list replaces the preset entirely. `width`, `delay_ms` and
/// `slow_after` are then rejected; `retries` and `timeout_secs` become
/// defaults for passes that do not set their own.
///
/// ```toml
/// retries = 2
///
/// [[passes]]
/// width = 10
///
/// [[passes]]
/// delay_ms = 1000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    pub preset: Preset,
    pub width: Option<usize>,
    pub delay_ms: Option<u64>,
    pub slow_after: Option<usize>,
    pub max_passes: Option<usize>,
    pub retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub passes: Vec<PassConfig>,
}

impl ScheduleConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw: String = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        raw.parse()
    }

    /// Validates the settings and builds the schedule they describe.
    pub fn build(&self) -> Result<Box<dyn PassSchedule>, ConfigError> {
        let width: usize = positive("width", self.width.unwrap_or(DEFAULT_WIDTH))?;
        let delay: Duration = self.delay_ms.map_or(DEFAULT_SLOW_DELAY, Duration::from_millis);
        let timeout: Option<Duration> = self.timeout_secs.map(Duration::from_secs);
        if let Some(max) = self.max_passes {
            positive("max_passes", max)?;
        }

        let retry: Option<InlineRetry> = match (self.preset, self.retries) {
            (_, Some(attempts)) => Some(self.inline_retry(attempts)?),
            (Preset::Retrying, None) => Some(self.inline_retry(DEFAULT_RETRY_ATTEMPTS)?),
            _ => None,
        };

        if !self.passes.is_empty() {
            self.reject_preset_shape()?;
            return self.build_explicit(retry, timeout);
        }

        let schedule: Box<dyn PassSchedule> = match self.preset {
            Preset::Fixed => {
                let fast: usize = self.slow_after.unwrap_or(DEFAULT_FIXED_FAST_PASSES);
                let fast_width: usize = width.max(MIN_FAST_WIDTH);
                let mut passes: Vec<PassPolicy> = vec![PassPolicy::concurrent(fast_width); fast];
                passes.push(PassPolicy::sequential(delay));
                if let Some(max) = self.max_passes {
                    passes.truncate(max);
                }
                let passes = passes
                    .into_iter()
                    .map(|policy| decorate(policy, retry, timeout))
                    .collect();
                Box::new(FixedSchedule::new(passes))
            }
            Preset::Tapering | Preset::Retrying => {
                let fast: usize = self.slow_after.unwrap_or(DEFAULT_TAPERING_FAST_PASSES);
                let mut schedule = TaperingSchedule::new(width, fast, delay);
                schedule.max_passes = self.max_passes;
                schedule.retry = retry;
                schedule.timeout = timeout;
                Box::new(schedule)
            }
        };
        Ok(schedule)
    }

    /// Preset knobs have no meaning once passes are listed explicitly.
    fn reject_preset_shape(&self) -> Result<(), ConfigError> {
        let shaped = [
            ("width", self.width.is_some()),
            ("delay_ms", self.delay_ms.is_some()),
            ("slow_after", self.slow_after.is_some()),
        ];
        match shaped.into_iter().find(|(_, set)| *set) {
            Some((field, _)) => Err(ConfigError::InvalidValue {
                field,
                reason: "cannot be combined with explicit [[passes]]".to_string(),
            }),
            None => Ok(()),
        }
    }

    fn build_explicit(
        &self,
        default_retry: Option<InlineRetry>,
        default_timeout: Option<Duration>,
    ) -> Result<Box<dyn PassSchedule>, ConfigError> {
        let mut passes: Vec<PassPolicy> = Vec::with_capacity(self.passes.len());
        for pass in &self.passes {
            let width: usize = positive("passes.width", pass.width)?;
            let policy: PassPolicy = if width == 1 {
                PassPolicy::sequential(Duration::from_millis(pass.delay_ms))
            } else {
                PassPolicy::concurrent(width)
            };

            let retry: Option<InlineRetry> = match pass.retries {
                Some(attempts) => {
                    positive("passes.retries", attempts as usize)?;
                    let delay = pass
                        .retry_delay_ms
                        .map_or(DEFAULT_RETRY_DELAY, Duration::from_millis);
                    Some(InlineRetry::new(attempts, delay))
                }
                None => default_retry,
            };
            let timeout = pass.timeout_secs.map(Duration::from_secs).or(default_timeout);
            passes.push(decorate(policy, retry, timeout));
        }

        if let Some(max) = self.max_passes {
            passes.truncate(max);
        }
        Ok(Box::new(FixedSchedule::new(passes)))
    }

    fn inline_retry(&self, attempts: u32) -> Result<InlineRetry, ConfigError> {
        positive("retries", attempts as usize)?;
        let delay = self
            .retry_delay_ms
            .map_or(DEFAULT_RETRY_DELAY, Duration::from_millis);
        Ok(InlineRetry::new(attempts, delay))
    }
}

impl FromStr for ScheduleConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

fn decorate(
    mut policy: PassPolicy,
    retry: Option<InlineRetry>,
    timeout: Option<Duration>,
) -> PassPolicy {
    policy.retry = retry;
    policy.timeout = timeout;
    policy
}

fn positive(field: &'static str, value: usize) -> Result<usize, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
