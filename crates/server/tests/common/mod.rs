//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected: the marketplace account and the chat
//! transport are mocks, while the router, webhook auth and dispatcher are
//! the real ones.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tower::ServiceExt;

use lotsweep_core::interaction::UserId;
use lotsweep_core::testing::{MockChatTransport, MockMarketplace, RecordingSleeper};
use lotsweep_core::{
    create_authenticator, load_config_from_str, Authenticator, HidePipeline,
    InMemoryConversationStore, InteractionController, SECRET_TOKEN_HEADER,
};
use lotsweep_server::dispatcher::create_dispatcher;
use lotsweep_server::state::AppState;

/// Re-export fixtures for test convenience
pub use lotsweep_core::testing::fixtures;

/// Telegram user allowed to operate the bot in tests.
pub const OPERATOR: i64 = 42;
/// Chat the operator talks from.
pub const CHAT: i64 = 100;
/// Webhook secret used when the fixture runs with secret token auth.
pub const SECRET: &str = "s3cret";

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_menu() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post_update(TestFixture::text_update(1, "/del_lots")).await;
///     assert_eq!(response.status, StatusCode::OK);
///
///     fixture.wait_for_messages(1).await;
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock marketplace account - seed lots and failures
    pub account: Arc<MockMarketplace>,
    /// Mock chat transport - inspect what the bot sent
    pub transport: Arc<MockChatTransport>,
    /// Dispatcher task
    pub dispatcher: JoinHandle<()>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture without webhook authentication.
    pub async fn new() -> Self {
        Self::with_auth("method = \"none\"").await
    }

    /// Create a test fixture that requires the `SECRET` webhook token.
    pub async fn with_secret_token() -> Self {
        Self::with_auth(&format!(
            "method = \"secret_token\"\nsecret_token = \"{}\"",
            SECRET
        ))
        .await
    }

    async fn with_auth(auth: &str) -> Self {
        let config = load_config_from_str(&format!(
            r#"
[auth]
{}

[server]
host = "127.0.0.1"
port = 8080

[marketplace]
golden_key = "test-golden-key"
seller_id = 1

[telegram]
bot_token = "1:test"
authorized_users = [{}]

[pipeline]
skip_pause_ms = 0
throttle_ms = 0
"#,
            auth, OPERATOR
        ))
        .expect("Failed to parse test config");

        // Create mocks
        let account = Arc::new(MockMarketplace::new());
        let transport = Arc::new(MockChatTransport::new());

        let pipeline = HidePipeline::new(
            account.clone(),
            Arc::new(RecordingSleeper::new()),
            &config.pipeline,
        );
        let controller = Arc::new(InteractionController::new(
            pipeline,
            transport.clone(),
            Arc::new(InMemoryConversationStore::new()),
            config.telegram.authorized_users.iter().copied().map(UserId),
        ));

        let (updates, dispatcher) = create_dispatcher(controller, 16);
        let dispatcher = tokio::spawn(dispatcher.run());

        let authenticator: Arc<dyn Authenticator> = Arc::from(
            create_authenticator(&config.auth).expect("Failed to create authenticator"),
        );
        let state = Arc::new(AppState::new(config, authenticator, updates));
        let router = lotsweep_server::api::create_router(state);

        Self {
            router,
            account,
            transport,
            dispatcher,
        }
    }

    /// Text message update from the operator.
    pub fn text_update(update_id: i64, text: &str) -> Value {
        json!({
            "update_id": update_id,
            "message": {
                "message_id": update_id,
                "chat": { "id": CHAT, "type": "private" },
                "from": { "id": OPERATOR, "is_bot": false, "first_name": "Operator" },
                "text": text
            }
        })
    }

    /// Button press update from the operator.
    pub fn callback_update(update_id: i64, data: &str) -> Value {
        json!({
            "update_id": update_id,
            "callback_query": {
                "id": format!("cb-{}", update_id),
                "from": { "id": OPERATOR, "is_bot": false, "first_name": "Operator" },
                "message": { "message_id": 900, "chat": { "id": CHAT, "type": "private" } },
                "chat_instance": "1",
                "data": data
            }
        })
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::builder().method("GET").uri(path), Body::empty())
            .await
    }

    /// POST an update to the webhook without a secret header.
    pub async fn post_update(&self, update: Value) -> TestResponse {
        self.post_update_with_secret(update, None).await
    }

    /// POST an update to the webhook, optionally with a secret header.
    pub async fn post_update_with_secret(
        &self,
        update: Value,
        secret: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/telegram/webhook")
            .header("Content-Type", "application/json");
        if let Some(secret) = secret {
            builder = builder.header(SECRET_TOKEN_HEADER, secret);
        }
        self.request(builder, Body::from(serde_json::to_vec(&update).unwrap()))
            .await
    }

    /// Send a request to the test server.
    async fn request(&self, builder: axum::http::request::Builder, body: Body) -> TestResponse {
        let request = builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into()))
        };

        TestResponse { status, body }
    }

    /// Wait until the bot has sent at least `count` messages, then return
    /// their texts.
    pub async fn wait_for_messages(&self, count: usize) -> Vec<String> {
        for _ in 0..100 {
            let sent = self.transport.sent_texts().await;
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "Expected {} messages, got {:?}",
            count,
            self.transport.sent_texts().await
        );
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
