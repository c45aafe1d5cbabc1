//! End-to-end tests: Telegram updates posted to the webhook drive the hide
//! pipeline against the mock marketplace.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture, SECRET};
use lotsweep_core::interaction::messages;
use lotsweep_core::marketplace::SubcategoryKind;

#[tokio::test]
async fn test_health_and_config() {
    let fixture = TestFixture::new().await;

    let health = fixture.get("/api/v1/health").await;
    assert_status!(health, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");

    let config = fixture.get("/api/v1/config").await;
    assert_status!(config, StatusCode::OK);
    assert_eq!(config.body["auth"]["method"], "none");
    assert_eq!(config.body["marketplace"]["golden_key_configured"], true);
    // Secrets never leave the server
    let raw = config.body.to_string();
    assert!(!raw.contains("test-golden-key"));
    assert!(!raw.contains("1:test"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture.get("/api/v1/health").await;

    let response = fixture.get("/metrics").await;

    assert_status!(response, StatusCode::OK);
    let text = response.body.as_str().unwrap_or_default().to_string();
    assert!(text.contains("lotsweep_http_requests_total"));
}

#[tokio::test]
async fn test_command_opens_menu() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_update(TestFixture::text_update(1, "/del_lots"))
        .await;
    assert_status!(response, StatusCode::OK);

    let sent = fixture.wait_for_messages(1).await;
    assert_eq!(sent[0], messages::menu().text);
}

#[tokio::test]
async fn test_category_flow_hides_matching_lot() {
    let fixture = TestFixture::new().await;
    fixture.account.add_lots(fixtures::scenario_lots()).await;

    fixture
        .post_update(TestFixture::callback_update(1, messages::CB_HIDE_IN_CATEGORY))
        .await;
    fixture.wait_for_messages(1).await;
    fixture.post_update(TestFixture::text_update(2, "5")).await;

    let sent = fixture.wait_for_messages(2).await;
    assert_eq!(sent[1], "✅ Successfully hid 1 lots.");
    assert_eq!(fixture.account.hidden_lots().await, vec![101]);
}

#[tokio::test]
async fn test_invalid_category_makes_no_marketplace_calls() {
    let fixture = TestFixture::new().await;
    fixture.account.add_lots(fixtures::scenario_lots()).await;

    fixture
        .post_update(TestFixture::callback_update(1, messages::CB_HIDE_IN_CATEGORY))
        .await;
    fixture.wait_for_messages(1).await;
    fixture.post_update(TestFixture::text_update(2, "abc")).await;

    let sent = fixture.wait_for_messages(2).await;
    assert_eq!(sent[1], messages::INVALID_CATEGORY);
    assert_eq!(fixture.account.call_count().await, 0);
}

#[tokio::test]
async fn test_hide_all_failure_is_reported() {
    let fixture = TestFixture::new().await;
    fixture
        .account
        .add_lots(vec![fixtures::lot(101, 5, SubcategoryKind::Other)])
        .await;
    fixture.account.fail_submits(101, 3).await;

    fixture
        .post_update(TestFixture::callback_update(1, messages::CB_HIDE_ALL_CONFIRM))
        .await;

    let sent = fixture.wait_for_messages(1).await;
    assert!(sent[0].contains("lots/offer?id=101"));
    assert!(!sent[0].contains("Successfully"));
    assert!(fixture.account.hidden_lots().await.is_empty());
}

#[tokio::test]
async fn test_unauthorized_user_is_ignored() {
    let fixture = TestFixture::new().await;
    fixture.account.add_lots(fixtures::scenario_lots()).await;

    let mut update = TestFixture::callback_update(1, messages::CB_HIDE_ALL_CONFIRM);
    update["callback_query"]["from"]["id"] = json!(7);
    let response = fixture.post_update(update).await;
    assert_status!(response, StatusCode::OK);

    // A later operator command is handled, so the ignored update went first
    fixture
        .post_update(TestFixture::text_update(2, "/del_lots"))
        .await;
    let sent = fixture.wait_for_messages(1).await;
    assert_eq!(sent, vec![messages::menu().text]);
    assert_eq!(fixture.account.call_count().await, 0);
}

#[tokio::test]
async fn test_unsupported_update_is_acknowledged() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_update(json!({ "update_id": 1, "edited_message": { "message_id": 1 } }))
        .await;

    assert_status!(response, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_update_is_rejected() {
    let fixture = TestFixture::new().await;

    let response = fixture.post_update(json!({ "message": "nope" })).await;

    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_secret_token_required() {
    let fixture = TestFixture::with_secret_token().await;

    let missing = fixture
        .post_update(TestFixture::text_update(1, "/del_lots"))
        .await;
    assert_status!(missing, StatusCode::UNAUTHORIZED);

    let wrong = fixture
        .post_update_with_secret(TestFixture::text_update(2, "/del_lots"), Some("nope"))
        .await;
    assert_status!(wrong, StatusCode::UNAUTHORIZED);

    let ok = fixture
        .post_update_with_secret(TestFixture::text_update(3, "/del_lots"), Some(SECRET))
        .await;
    assert_status!(ok, StatusCode::OK);

    let sent = fixture.wait_for_messages(1).await;
    assert_eq!(sent.len(), 1);
}

#[tokio::test]
async fn test_health_does_not_require_secret() {
    let fixture = TestFixture::with_secret_token().await;

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
}
