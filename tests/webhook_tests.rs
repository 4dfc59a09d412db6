//! Webhook endpoint integration tests
//!
//! Drive the full application router with `tower::ServiceExt::oneshot`.
//! The Send API is replaced by a wiremock server where replies are involved.

use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use messenger_webhook::messenger::{EventHandler, Message, MessengerConfig, Postback};
use messenger_webhook::server;
use pretty_assertions::assert_eq;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test handler that records calls in order
#[derive(Default)]
struct RecordingHandler {
    calls: Mutex<Vec<String>>,
}

impl RecordingHandler {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl EventHandler for RecordingHandler {
    async fn on_message(&self, sender_id: &str, message: &Message) -> anyhow::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("message:{sender_id}:{}", message.text));
        Ok(())
    }

    async fn on_postback(&self, sender_id: &str, postback: &Postback) -> anyhow::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("postback:{sender_id}:{}", postback.payload));
        Ok(())
    }
}

fn test_config() -> Arc<MessengerConfig> {
    Arc::new(MessengerConfig::new("tok", "verify123"))
}

fn recording_app() -> (Router, Arc<RecordingHandler>) {
    let handler = Arc::new(RecordingHandler::default());
    (server::app(test_config(), handler.clone()), handler)
}

async fn send(app: Router, method: Method, uri: &str, body: Body) -> (StatusCode, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .expect("request"),
        )
        .await
        .expect("response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, String::from_utf8(bytes.to_vec()).expect("utf-8 body"))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    send(app, Method::GET, uri, Body::empty()).await
}

async fn post(app: Router, body: &str) -> (StatusCode, String) {
    send(app, Method::POST, "/webhook", Body::from(body.to_string())).await
}

// ============================================================================
// Verification handshake
// ============================================================================

#[tokio::test]
async fn test_verification_echoes_challenge() {
    let (app, _) = recording_app();
    let (status, body) = get(
        app,
        "/webhook?hub.mode=subscribe&hub.verify_token=verify123&hub.challenge=xyz",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "xyz");
}

#[tokio::test]
async fn test_verification_wrong_token_forbidden() {
    let (app, _) = recording_app();
    let (status, _) = get(
        app,
        "/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=xyz",
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_verification_wrong_mode_forbidden() {
    let (app, _) = recording_app();
    let (status, body) = get(
        app,
        "/webhook?hub.mode=unsubscribe&hub.verify_token=verify123&hub.challenge=xyz",
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "Forbidden");
}

#[tokio::test]
async fn test_verification_repeated_key_uses_first_value() {
    let (app, _) = recording_app();
    let (status, body) = get(
        app,
        "/webhook?hub.mode=subscribe&hub.verify_token=verify123&hub.challenge=xyz&hub.challenge=abc",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "xyz");
}

#[tokio::test]
async fn test_verification_missing_params_forbidden() {
    let (app, _) = recording_app();
    let (status, _) = get(app, "/webhook").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Event delivery
// ============================================================================

#[tokio::test]
async fn test_non_page_object_not_found() {
    let (app, handler) = recording_app();
    let (status, _) = post(
        app,
        r#"{"object":"user","entry":[{"messaging":[{"sender":{"id":"U1"},"message":{"text":"hi"}}]}]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(handler.calls().is_empty());
}

#[tokio::test]
async fn test_missing_object_not_found() {
    for body in [r#"{"entry":[]}"#, "{}"] {
        let (app, handler) = recording_app();
        let (status, _) = post(app, body).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "body: {body}");
        assert!(handler.calls().is_empty());
    }
}

#[tokio::test]
async fn test_wrongly_typed_body_is_ignored() {
    let (app, handler) = recording_app();
    let (status, body) = post(app, r#"{"object":"page","entry":"nope"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert!(handler.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_ignored() {
    let (app, handler) = recording_app();
    let (status, body) = post(app, "{not json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert!(handler.calls().is_empty());
}

#[tokio::test]
async fn test_page_events_dispatched_in_order() {
    let (app, handler) = recording_app();
    let (status, body) = post(
        app,
        r#"{
            "object": "page",
            "entry": [
                {"id": "P1", "time": 1458692752478, "messaging": [
                    {"sender": {"id": "U1"}, "recipient": {"id": "P1"}, "message": {"text": "first"}},
                    {"sender": {"id": "U2"}, "recipient": {"id": "P1"}, "postback": {"title": "Start", "payload": "START"}}
                ]},
                {"id": "P1", "time": 1458692752479, "messaging": [
                    {"sender": {"id": "U3"}, "recipient": {"id": "P1"}, "message": {"text": "second"}},
                    {"sender": {"id": "U4"}, "recipient": {"id": "P1"}, "delivery": {"watermark": 1}}
                ]}
            ]
        }"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(
        handler.calls(),
        vec![
            "message:U1:first".to_string(),
            "postback:U2:START".to_string(),
            "message:U3:second".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_other_methods_rejected() {
    for method in [Method::PUT, Method::DELETE, Method::PATCH, Method::OPTIONS] {
        let (app, handler) = recording_app();
        let (status, body) = send(app, method, "/webhook", Body::empty()).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "No way");
        assert!(handler.calls().is_empty());
    }
}

#[tokio::test]
async fn test_head_with_valid_handshake_rejected() {
    let (app, _) = recording_app();
    // HEAD responses carry no body, only the status is observable
    let (status, _) = send(
        app,
        Method::HEAD,
        "/webhook?hub.mode=subscribe&hub.verify_token=verify123&hub.challenge=xyz",
        Body::empty(),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_health_route_mounted() {
    let (app, _) = recording_app();
    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"status\":\"healthy\""));
}

// ============================================================================
// End to end with the echo handler
// ============================================================================

async fn echo_app_for(server: &MockServer) -> Router {
    let url = Url::parse(&format!("{}/v2.6/me/messages", server.uri())).unwrap();
    let config = Arc::new(MessengerConfig::new("tok", "verify123").with_send_api_url(url));
    server::echo_app(config).expect("echo app")
}

const HI_CALLBACK: &str =
    r#"{"object":"page","entry":[{"messaging":[{"sender":{"id":"U1"},"message":{"text":"hi"}}]}]}"#;

#[tokio::test]
async fn test_message_is_echoed_through_send_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2.6/me/messages"))
        .and(query_param("access_token", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "recipient_id": "U1",
            "message_id": "mid.1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, _) = post(echo_app_for(&server).await, HI_CALLBACK).await;
    assert_eq!(status, StatusCode::OK);

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);

    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains(r#""id":"U1""#));

    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["message"]["text"], r#"Hello! You said "hi" to me."#);
}

#[tokio::test]
async fn test_replayed_callback_sends_twice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "recipient_id": "U1",
            "message_id": "mid.1"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let app = echo_app_for(&server).await;
    let (first, _) = post(app.clone(), HI_CALLBACK).await;
    let (second, _) = post(app, HI_CALLBACK).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
}

#[tokio::test]
async fn test_send_failure_not_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = post(echo_app_for(&server).await, HI_CALLBACK).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}
