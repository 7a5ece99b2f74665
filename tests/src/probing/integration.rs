use std::time::Duration;

use reachr_common::config::ProbeConfig;
use reachr_common::outcome::{ProbeOutcome, Unreachable};
use reachr_common::target::Target;
use reachr_core::prober::{HttpProber, Prober};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prober() -> HttpProber {
    let cfg = ProbeConfig {
        timeout: Duration::from_secs(5),
        ..Default::default()
    };
    HttpProber::new(&cfg).unwrap()
}

fn target(server: &MockServer, route: &str) -> Target {
    Target::from_url(&format!("{}{route}", server.uri())).unwrap()
}

async fn head(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn transport_message(outcome: ProbeOutcome) -> String {
    match outcome {
        ProbeOutcome::Unreachable(Unreachable::TransportFailure(message)) => message,
        other => panic!("expected a transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn success_statuses_are_live() {
    let server = MockServer::start().await;
    head(&server, "/ok", 200).await;
    head(&server, "/empty", 204).await;

    let prober = prober();
    assert_eq!(prober.probe(&target(&server, "/ok")).await, ProbeOutcome::Live);
    assert_eq!(prober.probe(&target(&server, "/empty")).await, ProbeOutcome::Live);
}

#[tokio::test]
async fn error_statuses_carry_their_code() {
    let server = MockServer::start().await;
    head(&server, "/gone", 404).await;
    head(&server, "/busy", 429).await;
    head(&server, "/broken", 500).await;

    let prober = prober();
    assert_eq!(
        prober.probe(&target(&server, "/gone")).await,
        ProbeOutcome::bad_status(404)
    );
    assert_eq!(
        prober.probe(&target(&server, "/busy")).await,
        ProbeOutcome::bad_status(429)
    );
    assert_eq!(
        prober.probe(&target(&server, "/broken")).await,
        ProbeOutcome::bad_status(500)
    );
}

#[tokio::test]
async fn redirects_are_followed_to_the_final_answer() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/moved"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", format!("{}/here", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/moved-away"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", format!("{}/nowhere", server.uri())),
        )
        .mount(&server)
        .await;
    head(&server, "/here", 200).await;
    head(&server, "/nowhere", 404).await;

    let prober = prober();
    assert_eq!(prober.probe(&target(&server, "/moved")).await, ProbeOutcome::Live);
    assert_eq!(
        prober.probe(&target(&server, "/moved-away")).await,
        ProbeOutcome::bad_status(404)
    );
}

#[tokio::test]
async fn redirect_cycle_is_a_transport_failure() {
    let server = MockServer::start().await;
    for (from, to) in [("/ping", "/pong"), ("/pong", "/ping")] {
        Mock::given(method("HEAD"))
            .and(path(from))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("{}{to}", server.uri())),
            )
            .mount(&server)
            .await;
    }

    let message = transport_message(prober().probe(&target(&server, "/ping")).await);
    assert!(message.starts_with("redirect"), "{message}");
}

#[tokio::test]
async fn rejected_head_falls_back_to_get() {
    let server = MockServer::start().await;
    head(&server, "/no-head", 405).await;
    Mock::given(method("GET"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(
        prober().probe(&target(&server, "/no-head")).await,
        ProbeOutcome::Live
    );
}

#[tokio::test]
async fn fallback_can_be_disabled() {
    let server = MockServer::start().await;
    head(&server, "/no-head", 501).await;
    Mock::given(method("GET"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cfg = ProbeConfig {
        head_fallback: false,
        ..Default::default()
    };
    let prober = HttpProber::new(&cfg).unwrap();

    assert_eq!(
        prober.probe(&target(&server, "/no-head")).await,
        ProbeOutcome::bad_status(501)
    );
}

#[tokio::test]
async fn slow_origin_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let cfg = ProbeConfig {
        timeout: Duration::from_millis(200),
        ..Default::default()
    };
    let prober = HttpProber::new(&cfg).unwrap();

    let message = transport_message(prober.probe(&target(&server, "/slow")).await);
    assert!(message.starts_with("timeout"), "{message}");
}

#[tokio::test]
async fn user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/ua"))
        .and(wiremock::matchers::header("user-agent", "reachr-tests"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let cfg = ProbeConfig {
        user_agent: "reachr-tests".to_string(),
        ..Default::default()
    };
    let prober = HttpProber::new(&cfg).unwrap();

    assert_eq!(prober.probe(&target(&server, "/ua")).await, ProbeOutcome::Live);
}
