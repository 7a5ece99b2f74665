use std::time::Duration;

use reachr_common::config::{ProbeConfig, ScheduleConfig};
use reachr_common::outcome::Unreachable;
use reachr_common::policy::{InlineRetry, PassPolicy};
use reachr_common::schedule::FixedSchedule;
use reachr_common::target::Target;
use reachr_core::controller::{ConvergenceController, Termination};
use reachr_core::prober::HttpProber;
use reachr_core::progress::TracingSink;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prober() -> HttpProber {
    HttpProber::new(&ProbeConfig::default()).unwrap()
}

fn targets(server: &MockServer, routes: &[&str]) -> Vec<Target> {
    routes
        .iter()
        .map(|route| Target::new(route.trim_start_matches('/'), &format!("{}{route}", server.uri())).unwrap())
        .collect()
}

/// Answers `status` for the first `times` requests, then 200.
async fn flaky(server: &MockServer, route: &str, status: u16, times: u64) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .up_to_n_times(times)
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

async fn healthy(server: &MockServer, route: &str, expected_probes: u64) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200))
        .expect(expected_probes)
        .mount(server)
        .await;
}

#[tokio::test]
async fn rate_limited_link_recovers_on_the_slow_pass() {
    let server = MockServer::start().await;
    healthy(&server, "/a", 1).await;
    healthy(&server, "/b", 1).await;
    flaky(&server, "/limited", 429, 1).await;

    let prober = prober();
    let sink = TracingSink;
    let schedule = FixedSchedule::new(vec![
        PassPolicy::concurrent(8),
        PassPolicy::sequential(Duration::from_millis(20)),
    ]);

    let resolution = ConvergenceController::new(&prober, &sink)
        .resolve(targets(&server, &["/a", "/limited", "/b"]), &schedule)
        .await;

    assert_eq!(resolution.termination, Termination::AllResolved);
    assert_eq!(resolution.resolved, 3);
    assert_eq!(resolution.passes.len(), 2);
    assert_eq!(resolution.passes[1].attempted, 1);
}

#[tokio::test]
async fn dead_link_is_reported_after_the_patient_pass() {
    let server = MockServer::start().await;
    healthy(&server, "/home", 1).await;
    Mock::given(method("HEAD"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let prober = prober();
    let sink = TracingSink;
    let schedule = FixedSchedule::new(vec![
        PassPolicy::concurrent(8),
        PassPolicy::sequential(Duration::from_millis(10)),
        PassPolicy::sequential(Duration::from_millis(10)),
    ]);

    let resolution = ConvergenceController::new(&prober, &sink)
        .resolve(targets(&server, &["/home", "/gone"]), &schedule)
        .await;

    assert_eq!(resolution.termination, Termination::Stagnated);
    assert_eq!(resolution.resolved, 1);
    assert_eq!(resolution.unresolved.len(), 1);
    assert_eq!(resolution.unresolved[0].target.id(), "gone");
    assert_eq!(resolution.unresolved[0].reason, Unreachable::BadStatus(404));
}

#[tokio::test]
async fn inline_retry_absorbs_transient_errors() {
    let server = MockServer::start().await;
    flaky(&server, "/wobbly", 503, 2).await;

    let prober = prober();
    let sink = TracingSink;
    let schedule = FixedSchedule::new(vec![
        PassPolicy::concurrent(4).with_retry(InlineRetry::new(3, Duration::from_millis(10))),
    ]);

    let resolution = ConvergenceController::new(&prober, &sink)
        .resolve(targets(&server, &["/wobbly"]), &schedule)
        .await;

    assert!(resolution.is_clean());
    assert_eq!(resolution.passes.len(), 1);
}

#[tokio::test]
async fn pass_timeout_caps_slow_origins() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let prober = prober();
    let sink = TracingSink;
    let schedule = FixedSchedule::new(vec![
        PassPolicy::concurrent(2).with_timeout(Duration::from_millis(100)),
    ]);

    let resolution = ConvergenceController::new(&prober, &sink)
        .resolve(targets(&server, &["/slow"]), &schedule)
        .await;

    assert_eq!(resolution.termination, Termination::ScheduleExhausted);
    assert_eq!(
        resolution.unresolved[0].reason,
        Unreachable::TransportFailure("probe timed out after 100ms".into())
    );
}

#[tokio::test]
async fn schedule_from_toml_drives_a_full_run() {
    let server = MockServer::start().await;
    healthy(&server, "/one", 1).await;
    flaky(&server, "/two", 500, 2).await;

    let schedule = r#"
        [[passes]]
        width = 4

        [[passes]]
        width = 2

        [[passes]]
        delay_ms = 10
    "#
    .parse::<ScheduleConfig>()
    .unwrap()
    .build()
    .unwrap();

    let prober = prober();
    let sink = TracingSink;
    let resolution = ConvergenceController::new(&prober, &sink)
        .resolve(targets(&server, &["/one", "/two"]), schedule.as_ref())
        .await;

    assert_eq!(resolution.termination, Termination::AllResolved);
    let failing: Vec<usize> = resolution.passes.iter().map(|p| p.failed).collect();
    assert_eq!(failing, vec![1, 1, 0]);
}
