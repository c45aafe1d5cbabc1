//! Mock marketplace account for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::lots::DELETED_FIELD;
use crate::marketplace::{
    FormRequest, FormResponse, LotId, LotSummary, MarketplaceAccount, MarketplaceError, RawFields,
};

use super::fixtures;

/// Internal state for a mock account.
#[derive(Debug, Default)]
struct MockState {
    lots: Vec<LotSummary>,
    fields: HashMap<LotId, BTreeMap<String, String>>,
    /// Remaining failures before fetches of a lot succeed.
    fetch_failures: HashMap<LotId, u32>,
    /// Remaining failures before submissions for a lot succeed.
    submit_failures: HashMap<LotId, u32>,
    listing_fails: bool,
    fetch_calls: Vec<LotId>,
    submissions: Vec<FormRequest>,
    hidden: Vec<LotId>,
    calls: usize,
}

/// Mock implementation of the MarketplaceAccount trait.
///
/// Provides controllable behavior for testing:
/// - Seed profile lots with fixture field sets
/// - Fail a lot's fetches or submissions a fixed number of times
/// - Record every fetch and submission for assertions
///
/// Successful submissions replace the stored field set, so a later fetch
/// sees what was saved.
///
/// # Example
///
/// ```rust,ignore
/// let account = MockMarketplace::new();
/// account.add_lots(fixtures::scenario_lots()).await;
/// account.fail_fetches(101, 2).await;
///
/// // ... run the pipeline ...
///
/// assert_eq!(account.hidden_lots().await, vec![101]);
/// ```
#[derive(Debug, Clone)]
pub struct MockMarketplace {
    state: Arc<RwLock<MockState>>,
    base_url: String,
}

impl Default for MockMarketplace {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMarketplace {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockState::default())),
            base_url: "https://funpay.com".to_string(),
        }
    }

    /// Add lots to the profile, each with a fixture field set.
    pub async fn add_lots(&self, lots: Vec<LotSummary>) {
        let mut state = self.state.write().await;
        for lot in lots {
            state.fields.insert(lot.id, fixtures::lot_fields(lot.id));
            state.lots.push(lot);
        }
    }

    /// Set a field of a stored lot, as if edited concurrently.
    pub async fn set_field(&self, lot_id: LotId, name: &str, value: &str) {
        let mut state = self.state.write().await;
        state
            .fields
            .entry(lot_id)
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    /// Make the next `times` fetches of a lot fail.
    pub async fn fail_fetches(&self, lot_id: LotId, times: u32) {
        self.state.write().await.fetch_failures.insert(lot_id, times);
    }

    /// Make the next `times` submissions for a lot answer HTTP 500.
    pub async fn fail_submits(&self, lot_id: LotId, times: u32) {
        self.state.write().await.submit_failures.insert(lot_id, times);
    }

    pub async fn fail_listing(&self, fail: bool) {
        self.state.write().await.listing_fails = fail;
    }

    /// Lot ids of every fetch attempt, in order.
    pub async fn fetch_calls(&self) -> Vec<LotId> {
        self.state.read().await.fetch_calls.clone()
    }

    /// Every submitted form, including failed attempts.
    pub async fn submissions(&self) -> Vec<FormRequest> {
        self.state.read().await.submissions.clone()
    }

    /// Lots whose hide submission succeeded, in order, without repeats.
    pub async fn hidden_lots(&self) -> Vec<LotId> {
        self.state.read().await.hidden.clone()
    }

    /// Total number of account calls of any kind.
    pub async fn call_count(&self) -> usize {
        self.state.read().await.calls
    }
}

fn consume_failure(failures: &mut HashMap<LotId, u32>, lot_id: LotId) -> bool {
    match failures.get_mut(&lot_id) {
        Some(remaining) if *remaining > 0 => {
            *remaining -= 1;
            true
        }
        _ => false,
    }
}

#[async_trait]
impl MarketplaceAccount for MockMarketplace {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_lots(&self) -> Result<Vec<LotSummary>, MarketplaceError> {
        let mut state = self.state.write().await;
        state.calls += 1;
        if state.listing_fails {
            return Err(MarketplaceError::ConnectionFailed(
                "mock listing failure".to_string(),
            ));
        }
        Ok(state.lots.clone())
    }

    async fn fetch_lot_fields(&self, lot_id: LotId) -> Result<RawFields, MarketplaceError> {
        let mut state = self.state.write().await;
        state.calls += 1;
        state.fetch_calls.push(lot_id);

        if consume_failure(&mut state.fetch_failures, lot_id) {
            return Err(MarketplaceError::Timeout);
        }

        state
            .fields
            .get(&lot_id)
            .cloned()
            .map(RawFields::new)
            .ok_or_else(|| MarketplaceError::ParseError(format!("no edit form for lot {}", lot_id)))
    }

    async fn submit_form(&self, request: FormRequest) -> Result<FormResponse, MarketplaceError> {
        let mut state = self.state.write().await;
        state.calls += 1;
        state.submissions.push(request.clone());

        let fields: BTreeMap<String, String> = request.fields.into_iter().collect();
        let lot_id = fields
            .get("offer_id")
            .and_then(|id| id.parse::<LotId>().ok())
            .ok_or_else(|| MarketplaceError::RequestFailed {
                status: 400,
                body: "missing offer_id".to_string(),
            })?;

        if consume_failure(&mut state.submit_failures, lot_id) {
            return Err(MarketplaceError::RequestFailed {
                status: 500,
                body: "Internal Server Error".to_string(),
            });
        }

        let deleted = fields.get(DELETED_FIELD).map(String::as_str) == Some("on");
        state.fields.insert(lot_id, fields);
        if deleted && !state.hidden.contains(&lot_id) {
            state.hidden.push(lot_id);
        }

        Ok(FormResponse {
            status: 200,
            body: r#"{"done":true}"#.to_string(),
        })
    }
}
