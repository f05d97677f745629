//! End-to-end login flow against a mock backend.
//!
//! Covers the state machine rules: the step advances only on business
//! success, every failure class keeps the user where they are, and a
//! successful verification persists the session.

mod common;

use affiliate_api::{LoginFlow, LoginStep, NoticeKind, OtpOutcome, PhoneOutcome, SessionStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{envelope, envelope_with_result, login_result, test_client, test_client_with_store};

const MOBILE: &str = "9999999999";

async fn mount_send_otp_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "mobile": MOBILE })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(200, true, "OTP sent")))
        .mount(server)
        .await;
}

#[tokio::test]
async fn phone_business_success_moves_to_otp_step() {
    let server = MockServer::start().await;
    mount_send_otp_success(&server).await;

    let mut flow = LoginFlow::new(test_client(&server));
    assert_eq!(flow.step(), LoginStep::Phone);

    match flow.submit_phone(MOBILE).await {
        PhoneOutcome::CodeSent(notice) => {
            assert_eq!(notice.title, "OTP sent");
            assert_eq!(notice.kind, NoticeKind::Info);
        }
        other => panic!("expected CodeSent, got {other:?}"),
    }
    assert_eq!(flow.step(), LoginStep::Otp);
    assert_eq!(flow.mobile(), MOBILE);
}

#[tokio::test]
async fn phone_business_rejection_stays_on_phone_step() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(400, false, "Unknown number")),
        )
        .mount(&server)
        .await;

    let mut flow = LoginFlow::new(test_client(&server));
    match flow.submit_phone(MOBILE).await {
        PhoneOutcome::Denied(notice) => {
            assert_eq!(notice.detail.as_deref(), Some("Unknown number"));
            assert_eq!(notice.kind, NoticeKind::Error);
        }
        other => panic!("expected Denied, got {other:?}"),
    }
    assert_eq!(flow.step(), LoginStep::Phone);
}

#[tokio::test]
async fn phone_transport_failure_stays_on_phone_step() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut flow = LoginFlow::new(test_client(&server));
    assert!(matches!(
        flow.submit_phone(MOBILE).await,
        PhoneOutcome::Denied(_)
    ));
    assert_eq!(flow.step(), LoginStep::Phone);
}

#[tokio::test]
async fn phone_validation_blocks_dispatch() {
    let server = MockServer::start().await;

    let mut flow = LoginFlow::new(test_client(&server));
    match flow.submit_phone("12ab").await {
        PhoneOutcome::Denied(notice) => assert_eq!(notice.kind, NoticeKind::Validation),
        other => panic!("expected Denied, got {other:?}"),
    }
    assert_eq!(flow.step(), LoginStep::Phone);
    assert!(
        server.received_requests().await.unwrap().is_empty(),
        "validation failures must not reach the wire"
    );
}

#[tokio::test]
async fn otp_business_success_persists_session() {
    let server = MockServer::start().await;
    mount_send_otp_success(&server).await;
    Mock::given(method("POST"))
        .and(path("/login/verify-otp"))
        .and(body_json(json!({ "mobile": MOBILE, "otp": "123456" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope_with_result(
            200,
            true,
            "Welcome back",
            login_result("tok-123"),
        )))
        .mount(&server)
        .await;

    let store = SessionStore::in_memory();
    let mut flow = LoginFlow::new(test_client_with_store(&server, store.clone()));
    flow.submit_phone(MOBILE).await;

    match flow.submit_otp("123456").await {
        OtpOutcome::Authenticated { session, notice } => {
            assert_eq!(session.access_token, "tok-123");
            assert_eq!(notice.title, "Welcome back");
        }
        other => panic!("expected Authenticated, got {other:?}"),
    }

    let persisted = store.get().await.expect("session should be persisted");
    assert_eq!(persisted.access_token, "tok-123");
    assert_eq!(persisted.refresh_token, "ref-456");
    assert_eq!(persisted.user["name"], "Asha");
}

#[tokio::test]
async fn otp_business_rejection_keeps_step_and_writes_nothing() {
    let server = MockServer::start().await;
    mount_send_otp_success(&server).await;
    Mock::given(method("POST"))
        .and(path("/login/verify-otp"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(200, false, "Invalid code")),
        )
        .mount(&server)
        .await;

    let store = SessionStore::in_memory();
    let mut flow = LoginFlow::new(test_client_with_store(&server, store.clone()));
    flow.submit_phone(MOBILE).await;

    match flow.submit_otp("123456").await {
        OtpOutcome::Denied(notice) => {
            assert_eq!(notice.detail.as_deref(), Some("Invalid code"));
        }
        other => panic!("expected Denied, got {other:?}"),
    }
    assert_eq!(flow.step(), LoginStep::Otp);
    assert!(store.get().await.is_none(), "no session may be written");
}

#[tokio::test]
async fn otp_validation_blocks_dispatch() {
    let server = MockServer::start().await;
    mount_send_otp_success(&server).await;

    let mut flow = LoginFlow::new(test_client(&server));
    flow.submit_phone(MOBILE).await;

    match flow.submit_otp("12345").await {
        OtpOutcome::Denied(notice) => assert_eq!(notice.kind, NoticeKind::Validation),
        other => panic!("expected Denied, got {other:?}"),
    }
    // Only the send-otp call reached the server.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn go_back_resets_to_phone_and_is_noop_there() {
    let server = MockServer::start().await;
    mount_send_otp_success(&server).await;

    let mut flow = LoginFlow::new(test_client(&server));

    // No-op from the initial step.
    flow.go_back();
    assert_eq!(flow.step(), LoginStep::Phone);

    flow.submit_phone(MOBILE).await;
    assert_eq!(flow.step(), LoginStep::Otp);

    flow.go_back();
    assert_eq!(flow.step(), LoginStep::Phone);
}

#[tokio::test]
async fn persisted_token_is_sent_on_the_next_request() {
    let server = MockServer::start().await;
    mount_send_otp_success(&server).await;
    Mock::given(method("POST"))
        .and(path("/login/verify-otp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope_with_result(
            200,
            true,
            "Welcome back",
            login_result("tok-round-trip"),
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/dashboard/{MOBILE}/invoices")))
        .and(header("authorization", "Bearer tok-round-trip"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut flow = LoginFlow::new(client.clone());
    flow.submit_phone(MOBILE).await;
    flow.submit_otp("123456").await;

    client
        .invoices(MOBILE)
        .await
        .expect("authenticated listing should succeed");
}
