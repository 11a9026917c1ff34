#![cfg(test)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use hmac::{Hmac, Mac};
use mockall::mock;
use sha2::Sha256;
use ticket_relay::{
    base::{
        config::{Config, ConfigInner},
        signature::SIGNATURE_HEADER,
        types::RelayError,
    },
    interaction::ticket_event::RelayAck,
    runtime::Runtime,
    server,
    service::chat::{ChatClient, GenericChatClient},
};
use tower::ServiceExt;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn send_notification(&self, text: &str) -> Result<(), RelayError>;
    }
}

// Chat client whose delivery sleeps for `delay` before reporting a timeout.

struct SlowChat {
    delay: Duration,
}

#[async_trait]
impl GenericChatClient for SlowChat {
    async fn send_notification(&self, _text: &str) -> Result<(), RelayError> {
        tokio::time::sleep(self.delay).await;

        Err(RelayError::UpstreamTimeout)
    }
}

// Helpers.

const TEST_SECRET: &str = "test_secret";

/// A valid ticket-update payload, shaped like what the helpdesk platform sends.
fn ticket_payload() -> String {
    serde_json::json!({
        "ticket": {
            "id": 42,
            "subject": "Login broken",
            "status": "open",
            "priority": "high",
            "requester": { "email": "a@b.com", "name": "Ada" },
        }
    })
    .to_string()
}

/// Computes the hex digest the helpdesk platform would send for `body`.
fn sign(body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(TEST_SECRET.as_bytes()).unwrap();
    mac.update(body.as_bytes());

    hex::encode(mac.finalize().into_bytes())
}

fn test_config(base_url: &str) -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            chat_channel_id: "chan-1".to_string(),
            chat_webhook_base_url: base_url.to_string(),
            helpdesk_signing_secret: TEST_SECRET.to_string(),
            delivery_timeout_seconds: 1,
            delivery_max_attempts: 3,
            delivery_base_delay_ms: 0,
            ..Default::default()
        }),
    }
}

/// Builds the full router around a mocked chat client.
fn test_router(chat: MockChat) -> Router {
    let config = test_config("https://chat.invalid/v1/webhooks");
    let runtime = Runtime {
        config,
        chat: ChatClient::new(Arc::new(chat)),
    };

    server::create_router(runtime)
}

/// A correctly signed webhook request for `body`.
fn signed_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhooks/helpdesk")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, sign(&body))
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read response body");

    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

// Tests.

#[tokio::test]
async fn test_valid_webhook_is_relayed() {
    let mut chat = MockChat::new();

    // The rendered notification carries every ticket field.
    chat.expect_send_notification()
        .withf(|text| {
            text.contains("Ticket #42 Updated!")
                && text.contains("Subject: Login broken")
                && text.contains("Status: Open")
                && text.contains("Priority: High")
                && text.contains("Requester: a@b.com")
        })
        .times(1)
        .returning(|_| Ok(()));

    let app = test_router(chat);

    let response = app.oneshot(signed_request(ticket_payload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let ack: RelayAck = serde_json::from_value(response_json(response).await).unwrap();
    assert_eq!(ack.status, "delivered");
    assert_eq!(ack.ticket_id, 42);
}

#[tokio::test]
async fn test_missing_signature_is_unauthorized() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().times(0);

    let app = test_router(chat);

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/helpdesk")
        .header("content-type", "application/json")
        .body(Body::from(ticket_payload()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(response).await;
    assert_eq!(body["error"], "missing signature header");
}

#[tokio::test]
async fn test_wrong_signature_is_forbidden() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().times(0);

    let app = test_router(chat);

    let body = ticket_payload();
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/helpdesk")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, "deadbeef")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = response_json(response).await;
    assert_eq!(body["error"], "signature mismatch");
}

#[tokio::test]
async fn test_tampered_body_is_forbidden() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().times(0);

    let app = test_router(chat);

    // Sign the original payload, then deliver an altered one.
    let original = ticket_payload();
    let tampered = original.replace("Login broken", "All good, ignore this");

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/helpdesk")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, sign(&original))
        .body(Body::from(tampered))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_structurally_invalid_payload_is_bad_request() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().times(0);

    let app = test_router(chat);

    let response = app.oneshot(signed_request(r#"{"ticket":{}}"#.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    let detail = body["error"].as_str().unwrap();
    assert!(detail.contains("invalid payload"), "unexpected error: {detail}");
    assert!(detail.contains("missing field"), "unexpected error: {detail}");
}

#[tokio::test]
async fn test_unknown_status_is_bad_request() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().times(0);

    let app = test_router(chat);

    let payload = serde_json::json!({
        "ticket": {
            "id": 7,
            "subject": "s",
            "status": "reopened",
            "requester": { "email": "a@b.com" },
        }
    })
    .to_string();

    let response = app.oneshot(signed_request(payload)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("unknown variant"), "unexpected error: {body}");
}

#[tokio::test]
async fn test_delivery_timeout_maps_to_gateway_timeout() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().times(1).returning(|_| Err(RelayError::UpstreamTimeout));

    let app = test_router(chat);

    let response = app.oneshot(signed_request(ticket_payload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

    let body = response_json(response).await;
    assert_eq!(body["error"], "chat delivery timed out");
}

#[tokio::test]
async fn test_delivery_failure_maps_to_bad_gateway() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().times(1).returning(|_| Err(RelayError::UpstreamError("HTTP 500".to_string())));

    let app = test_router(chat);

    let response = app.oneshot(signed_request(ticket_payload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("chat delivery failed"), "unexpected error: {body}");
}

#[tokio::test(start_paused = true)]
async fn test_worst_case_delivery_is_answered_with_gateway_timeout() {
    // A delivery schedule that runs past half a minute must still be answered
    // by the handler's own status mapping, not cut off by the server timeout.
    let config = Config {
        inner: Arc::new(ConfigInner {
            chat_channel_id: "chan-1".to_string(),
            chat_webhook_base_url: "https://chat.invalid/v1/webhooks".to_string(),
            helpdesk_signing_secret: TEST_SECRET.to_string(),
            delivery_timeout_seconds: 12,
            delivery_max_attempts: 3,
            delivery_base_delay_ms: 1000,
            ..Default::default()
        }),
    };

    let runtime = Runtime {
        config,
        chat: ChatClient::new(Arc::new(SlowChat { delay: Duration::from_secs(31) })),
    };

    let app = server::create_router(runtime);

    let response = app.oneshot(signed_request(ticket_payload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

    let body = response_json(response).await;
    assert_eq!(body["error"], "chat delivery timed out");
}

#[tokio::test]
async fn test_health_check() {
    let chat = MockChat::new();
    let app = test_router(chat);

    let request = Request::builder().method("GET").uri("/health").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_responses_carry_a_request_id() {
    let mut chat = MockChat::new();
    chat.expect_send_notification().times(0);

    let app = test_router(chat);

    // Even rejected requests get a request id for correlation.
    let request = Request::builder()
        .method("POST")
        .uri("/webhooks/helpdesk")
        .header("content-type", "application/json")
        .body(Body::from(ticket_payload()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    let request_id = response.headers().get("x-request-id").expect("x-request-id header should be present");
    assert!(!request_id.to_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_full_relay_through_the_wire() {
    let chat_server = MockServer::start().await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/chan-1"))
        .and(matchers::body_json(serde_json::json!({
            "channel": "chan-1",
            "event": "message",
            "data": { "text": "Ticket #42 Updated!\nSubject: Login broken\nStatus: Open\nPriority: High\nRequester: a@b.com" },
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&chat_server)
        .await;

    let runtime = Runtime::new(test_config(&chat_server.uri())).unwrap();
    let app = server::create_router(runtime);

    let response = app.oneshot(signed_request(ticket_payload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let ack: RelayAck = serde_json::from_value(response_json(response).await).unwrap();
    assert_eq!(ack.status, "delivered");
    assert_eq!(ack.ticket_id, 42);
}

#[tokio::test]
async fn test_unavailable_chat_platform_maps_to_bad_gateway_on_the_wire() {
    let chat_server = MockServer::start().await;

    Mock::given(matchers::method("POST")).and(matchers::path("/chan-1")).respond_with(ResponseTemplate::new(503)).expect(3).mount(&chat_server).await;

    let runtime = Runtime::new(test_config(&chat_server.uri())).unwrap();
    let app = server::create_router(runtime);

    let response = app.oneshot(signed_request(ticket_payload())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("HTTP 503"), "unexpected error: {body}");
}
