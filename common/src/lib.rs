//! # Reachr Common
//!
//! Shared models for the link-liveness engine and its adapters.
//!
//! * **[`target`]**: what gets probed.
//! * **[`outcome`]**: how one probe ended.
//! * **[`policy`]**: how one pass is run.
//! * **[`schedule`]**: which policy applies to which pass.
//! * **[`config`]**: user-facing settings and the schedule loader.

pub mod config;
pub mod outcome;
pub mod policy;
pub mod schedule;
pub mod target;
