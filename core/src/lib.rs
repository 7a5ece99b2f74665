//! # Reachr Core
//!
//! The link-liveness engine.
//!
//! * **[`prober`]**: one reachability check for one target.
//! * **[`executor`]**: one pass over a set of targets under a [`PassPolicy`].
//! * **[`controller`]**: repeated passes until everything resolves, the
//!   schedule runs out, or patience stops paying off.
//! * **[`progress`]**: where per-target observations go.
//!
//! [`PassPolicy`]: reachr_common::policy::PassPolicy

pub mod controller;
pub mod executor;
pub mod prober;
pub mod progress;

#[cfg(test)]
pub(crate) mod testing;
