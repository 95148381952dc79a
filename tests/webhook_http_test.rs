//! HTTP tests for the `/webhook` endpoint
//!
//! Drives the axum router directly with `tower::ServiceExt::oneshot`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use streamrelay::error::DeliveryError;
use streamrelay::streamrelay::commands::SubscriptionCommandHandler;
use streamrelay::streamrelay::dispatcher::NotificationDispatcher;
use streamrelay::streamrelay::kv::{KeyValueStore, MemoryKeyValueStore};
use streamrelay::streamrelay::net::server::router;
use streamrelay::streamrelay::net::webhook::WebhookState;
use streamrelay::streamrelay::sender::MessageSender;
use streamrelay::streamrelay::store::SubscriberStore;
use streamrelay::streamrelay::types::Recipient;

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(String, Recipient)>>,
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, text: &str, to: &Recipient) -> Result<(), DeliveryError> {
        if to.handle() == "offline" {
            return Err(DeliveryError::Unreachable(to.handle().to_string()));
        }
        self.sent.lock().unwrap().push((text.to_string(), to.clone()));
        Ok(())
    }
}

struct TestApp {
    router: Router,
    store: Arc<SubscriberStore>,
    kv: Arc<MemoryKeyValueStore>,
    sender: Arc<RecordingSender>,
}

impl TestApp {
    fn new() -> Self {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let store = Arc::new(SubscriberStore::new(kv.clone()));
        let sender = Arc::new(RecordingSender::default());
        let dispatcher = Arc::new(NotificationDispatcher::new(
            store.clone(),
            sender.clone(),
            Duration::from_secs(1),
        ));
        Self {
            router: router(WebhookState { dispatcher }),
            store,
            kv,
            sender,
        }
    }

    async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.expect("oneshot request failed")
    }

    async fn get(&self, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().method(Method::GET).uri(uri).body(Body::empty()).unwrap();
        body_text(self.oneshot(req).await).await
    }

    async fn post(&self, body: &str) -> (StatusCode, String) {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/webhook")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        body_text(self.oneshot(req).await).await
    }

    fn sent(&self) -> Vec<(String, Recipient)> {
        self.sender.sent.lock().unwrap().clone()
    }
}

async fn body_text(response: Response<Body>) -> (StatusCode, String) {
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_challenge_is_echoed() {
    let app = TestApp::new();
    let (status, body) = app
        .get("/webhook?hub.mode=subscribe&hub.topic=x&hub.challenge=abc123&hub.lease_seconds=864000")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "abc123");
}

#[tokio::test]
async fn test_challenge_is_percent_decoded() {
    let app = TestApp::new();
    let (_, body) = app.get("/webhook?hub.challenge=a%20b%2Bc").await;
    assert_eq!(body, "a b+c");
}

#[tokio::test]
async fn test_missing_or_repeated_challenge() {
    let app = TestApp::new();

    for uri in ["/webhook", "/webhook?hub.mode=subscribe", "/webhook?hub.challenge=a&hub.challenge=b"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::OK, "{uri} should still answer 200");
        assert_eq!(body, "no challenge", "{uri}");
    }
}

// ============================================================================
// Events
// ============================================================================

#[tokio::test]
async fn test_live_event_fans_out() {
    let app = TestApp::new();
    app.kv
        .set("stream:foo", vec!["a".to_string(), "b;=;g1".to_string()])
        .unwrap();

    let (status, body) = app
        .post(r#"{"data":[{"type":"live","user_name":"Foo","title":"X"}]}"#)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "it worked");

    let mut sent = app.sent();
    sent.sort_by(|a, b| a.1.handle().cmp(b.1.handle()));
    let text = "https://twitch.tv/Foo Foo is now live with X!".to_string();
    assert_eq!(
        sent,
        vec![
            (text.clone(), Recipient::Individual("a".into())),
            (text, Recipient::Group("b;=;g1".into())),
        ]
    );
}

#[tokio::test]
async fn test_live_event_without_subscribers() {
    let app = TestApp::new();
    let (_, body) = app
        .post(r#"{"data":[{"type":"live","user_name":"nobody","title":"X"}]}"#)
        .await;
    assert_eq!(body, "it worked");
    assert!(app.sent().is_empty());
}

#[tokio::test]
async fn test_failed_delivery_does_not_block_others() {
    let app = TestApp::new();
    app.kv
        .set("stream:foo", vec!["offline".to_string(), "a".to_string()])
        .unwrap();

    let (_, body) = app
        .post(r#"{"data":[{"type":"live","user_name":"foo","title":"X"}]}"#)
        .await;
    assert_eq!(body, "it worked");
    assert_eq!(app.sent().len(), 1);
    assert_eq!(app.sent()[0].1, Recipient::Individual("a".into()));
}

#[tokio::test]
async fn test_parse_failures_have_distinct_bodies() {
    let app = TestApp::new();
    app.kv.set("stream:foo", vec!["a".to_string()]).unwrap();

    let cases = [
        ("not json", "first string decode fail"),
        (r#"["data"]"#, "first string decode fail"),
        (r#"{"nodata":[]}"#, "second string decode fail"),
        (r#"{"data":[{"type":"vodcast"}]}"#, "not live"),
        (r#"{"data":[]}"#, "not live"),
        (r#"{"data":[{"type":"live","user_name":"foo"}]}"#, "no user name or title"),
    ];

    for (payload, expected) in cases {
        let (status, body) = app.post(payload).await;
        assert_eq!(status, StatusCode::OK, "{payload}");
        assert_eq!(body, expected, "{payload}");
    }
    assert!(app.sent().is_empty());
}

// ============================================================================
// Subscribe, then notify
// ============================================================================

#[tokio::test]
async fn test_subscribe_then_event() {
    let app = TestApp::new();
    let handler = SubscriptionCommandHandler::new(app.store.clone(), "/twitch", true);
    let caller = Recipient::Group("chat;=;42".into());

    let params: Vec<String> = "/twitch,subscribe,SomeStreamer".split(',').map(str::to_string).collect();
    handler.handle(&params, &caller).unwrap();

    let (_, body) = app
        .post(r#"{"data":[{"type":"live","user_name":"SomeStreamer","title":"speedruns"}]}"#)
        .await;
    assert_eq!(body, "it worked");
    assert_eq!(
        app.sent(),
        vec![(
            "https://twitch.tv/SomeStreamer SomeStreamer is now live with speedruns!".to_string(),
            caller
        )]
    );
}

#[tokio::test]
async fn test_unknown_path() {
    let app = TestApp::new();
    let (status, _) = app.get("/other").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
