//! An **HTTP** prober.
//!
//! Issues `HEAD` requests through a shared client, following redirects.
//! Any 2xx or 3xx answer counts as live. Origins that refuse `HEAD` get a
//! single `GET` whose body is never read.

use std::error::Error as _;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, redirect};
use tracing::debug;

use reachr_common::config::ProbeConfig;
use reachr_common::outcome::{ProbeOutcome, Unreachable};
use reachr_common::target::Target;

use super::Prober;

const HEAD_REJECTED: [u16; 2] = [405, 501];

pub struct HttpProber {
    client: Client,
    head_fallback: bool,
}

impl HttpProber {
    pub fn new(cfg: &ProbeConfig) -> anyhow::Result<Self> {
        let client: Client = Client::builder()
            .timeout(cfg.timeout)
            .connect_timeout(cfg.timeout)
            .redirect(redirect::Policy::limited(cfg.max_redirects))
            .user_agent(cfg.user_agent.clone())
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            head_fallback: cfg.head_fallback,
        })
    }

    async fn send(&self, method: Method, target: &Target) -> ProbeOutcome {
        match self
            .client
            .request(method, target.url().clone())
            .send()
            .await
        {
            Ok(response) => classify_status(response.status()),
            Err(err) => ProbeOutcome::transport(describe_error(&err)),
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &Target) -> ProbeOutcome {
        let outcome: ProbeOutcome = self.send(Method::HEAD, target).await;

        match outcome {
            ProbeOutcome::Unreachable(Unreachable::BadStatus(code))
                if self.head_fallback && HEAD_REJECTED.contains(&code) =>
            {
                debug!(id = target.id(), code, "HEAD rejected, retrying with GET");
                self.send(Method::GET, target).await
            }
            other => other,
        }
    }
}

/// 2xx and 3xx are live, everything else is a bad status.
pub fn classify_status(status: StatusCode) -> ProbeOutcome {
    if status.is_success() || status.is_redirection() {
        ProbeOutcome::Live
    } else {
        ProbeOutcome::bad_status(status.as_u16())
    }
}

/// Flattens a transport error and its causes into one line, prefixed by kind.
fn describe_error(err: &reqwest::Error) -> String {
    let kind: &str = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else if err.is_redirect() {
        "redirect"
    } else {
        "request"
    };

    let mut message: String = format!("{kind}: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_str: String = cause.to_string();
        if !message.contains(&cause_str) {
            message.push_str(": ");
            message.push_str(&cause_str);
        }
        source = cause.source();
    }
    message
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
