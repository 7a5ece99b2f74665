//! The **abstraction** for a single reachability check.
//!
//! A [`Prober`] answers one question about one target: is it live right now?
//! It never fails in the `Result` sense. Network trouble is itself an answer,
//! classified as [`Unreachable::TransportFailure`].
//!
//! Retrying is not a prober concern. The [`retry::Retrying`] wrapper adds
//! inline attempts on top of any prober when a pass policy asks for them.
//!
//! [`Unreachable::TransportFailure`]: reachr_common::outcome::Unreachable::TransportFailure

use async_trait::async_trait;
use reachr_common::outcome::ProbeOutcome;
use reachr_common::target::Target;

pub mod http;
pub mod retry;

pub use http::HttpProber;
pub use retry::Retrying;

#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &Target) -> ProbeOutcome;
}
