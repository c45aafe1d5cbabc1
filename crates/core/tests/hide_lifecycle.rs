//! Hide run lifecycle integration tests.
//!
//! These tests drive the hide pipeline against the mock marketplace:
//! - Pacing between lots and between retries
//! - Skipping lots whose fields stay unavailable
//! - Re-fetching before every hide attempt
//! - The operator dialog from command to report

use std::sync::Arc;
use std::time::Duration;

use lotsweep_core::config::PipelineConfig;
use lotsweep_core::interaction::{CallbackId, ChatId, Incoming, MessageId, UserId};
use lotsweep_core::lots::{LotDiagnostics, OFFER_SAVE_PATH};
use lotsweep_core::testing::{
    fixtures, MockChatTransport, MockMarketplace, RecordingDiagnostics, RecordingSleeper,
};
use lotsweep_core::{
    CategoryFilter, HidePipeline, InMemoryConversationStore, InteractionController,
};

/// Test helper to create a hide pipeline over mocks.
struct TestHarness {
    account: Arc<MockMarketplace>,
    sleeper: Arc<RecordingSleeper>,
    diagnostics: RecordingDiagnostics,
    pipeline: HidePipeline,
}

impl TestHarness {
    async fn new() -> Self {
        let account = Arc::new(MockMarketplace::new());
        account.add_lots(fixtures::scenario_lots()).await;
        let sleeper = Arc::new(RecordingSleeper::new());
        let pipeline = HidePipeline::new(
            account.clone(),
            sleeper.clone(),
            &PipelineConfig::default(),
        );
        Self {
            account,
            sleeper,
            diagnostics: RecordingDiagnostics::new(),
            pipeline,
        }
    }

    async fn run(&self, filter: CategoryFilter) -> usize {
        let diagnostics: &dyn LotDiagnostics = &self.diagnostics;
        self.pipeline
            .run(filter, diagnostics)
            .await
            .expect("run failed")
            .hidden
    }
}

fn ms(values: &[u64]) -> Vec<Duration> {
    values.iter().copied().map(Duration::from_millis).collect()
}

#[tokio::test]
async fn test_hide_all_skips_currency_and_paces_lots() {
    let harness = TestHarness::new().await;

    let hidden = harness.run(CategoryFilter::all()).await;

    assert_eq!(hidden, 2);
    assert_eq!(harness.account.hidden_lots().await, vec![101, 102]);
    // Collection fetches each lot once, then every hide re-fetches it
    assert_eq!(harness.account.fetch_calls().await, vec![101, 102, 101, 102]);
    assert_eq!(harness.sleeper.recorded(), ms(&[500, 500]));
    assert!(harness.diagnostics.recorded().is_empty());
}

#[tokio::test]
async fn test_submitted_form_is_redacted_and_marked_deleted() {
    let harness = TestHarness::new().await;

    harness.run(CategoryFilter::category(5)).await;

    let submissions = harness.account.submissions().await;
    assert_eq!(submissions.len(), 1);
    let request = &submissions[0];
    assert_eq!(request.path, OFFER_SAVE_PATH);

    let field = |name: &str| {
        request
            .fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    };
    assert_eq!(field("offer_id"), Some("101"));
    assert_eq!(field("deleted"), Some("on"));
    assert_eq!(field("location"), Some("trade"));
    assert_eq!(field("secrets"), Some(""));
    assert_eq!(field("auto_delivery"), None);
    assert_eq!(field("price"), Some("10"));
}

#[tokio::test]
async fn test_transient_fetch_failure_is_retried() {
    let harness = TestHarness::new().await;
    harness.account.fail_fetches(101, 2).await;

    let hidden = harness.run(CategoryFilter::category(5)).await;

    assert_eq!(hidden, 1);
    assert_eq!(harness.sleeper.recorded(), ms(&[2000, 2000, 500]));
    assert!(harness.diagnostics.recorded().is_empty());
}

#[tokio::test]
async fn test_unavailable_lot_is_skipped_and_reported() {
    let harness = TestHarness::new().await;
    harness.account.fail_fetches(101, 3).await;

    let hidden = harness.run(CategoryFilter::all()).await;

    assert_eq!(hidden, 1);
    assert_eq!(harness.account.hidden_lots().await, vec![102]);
    assert_eq!(
        harness.diagnostics.recorded(),
        vec![(101, "https://funpay.com/lots/offer?id=101".to_string())]
    );
    // Two retry delays, the skip pause, then the throttle after lot 102
    assert_eq!(harness.sleeper.recorded(), ms(&[2000, 2000, 1000, 500]));
}

#[tokio::test]
async fn test_hide_retry_refetches_each_attempt() {
    let harness = TestHarness::new().await;
    harness.account.fail_submits(101, 2).await;

    let hidden = harness.run(CategoryFilter::category(5)).await;

    assert_eq!(hidden, 1);
    assert_eq!(harness.account.submissions().await.len(), 3);
    assert_eq!(harness.account.fetch_calls().await, vec![101, 101, 101, 101]);
    assert_eq!(harness.sleeper.recorded(), ms(&[500, 2000, 2000]));
}

#[tokio::test]
async fn test_operator_dialog_end_to_end() {
    let account = Arc::new(MockMarketplace::new());
    account.add_lots(fixtures::scenario_lots()).await;
    account.fail_fetches(102, 3).await;
    let transport = Arc::new(MockChatTransport::new());
    let controller = InteractionController::new(
        HidePipeline::new(
            account.clone(),
            Arc::new(RecordingSleeper::new()),
            &PipelineConfig::default(),
        ),
        transport.clone(),
        Arc::new(InMemoryConversationStore::new()),
        [UserId(42)],
    );

    controller
        .handle(Incoming::Message {
            chat: ChatId(100),
            user: UserId(42),
            text: "/del_lots".to_string(),
        })
        .await
        .unwrap();
    controller
        .handle(Incoming::Callback {
            id: CallbackId("cb-1".to_string()),
            chat: ChatId(100),
            user: UserId(42),
            message: Some(MessageId(1001)),
            data: "del_lots:hide_all:confirm".to_string(),
        })
        .await
        .unwrap();

    let texts = transport.sent_texts().await;
    assert_eq!(texts.len(), 3);
    assert!(texts[1].contains("lots/offer?id=102"));
    assert_eq!(texts[2], "✅ Successfully hid 1 lots.");
    assert_eq!(account.hidden_lots().await, vec![101]);
    assert_eq!(transport.answered().await.len(), 1);
}

#[tokio::test]
async fn test_delay_after_last_fetch_failure_when_enabled() {
    let account = Arc::new(MockMarketplace::new());
    account.add_lots(fixtures::scenario_lots()).await;
    account.fail_fetches(101, 3).await;
    let sleeper = Arc::new(RecordingSleeper::new());
    let mut config = PipelineConfig::default();
    config.fetch.delay_after_last = true;
    let pipeline = HidePipeline::new(account.clone(), sleeper.clone(), &config);

    let result = pipeline
        .run(CategoryFilter::category(5), &RecordingDiagnostics::new())
        .await
        .unwrap();

    assert_eq!(result.hidden, 0);
    // Three retry delays, then the skip pause
    assert_eq!(sleeper.recorded(), ms(&[2000, 2000, 2000, 1000]));
}
