//! Testing utilities and mock implementations.
//!
//! Mocks stand in for the marketplace account and the chat transport, so the
//! pipeline and the controller run end to end without a network. Sleeps are
//! recorded instead of awaited.
//!
//! # Example
//!
//! ```rust,ignore
//! use lotsweep_core::testing::{fixtures, MockMarketplace, RecordingSleeper};
//!
//! let account = Arc::new(MockMarketplace::new());
//! account.add_lots(fixtures::scenario_lots()).await;
//! let sleeper = Arc::new(RecordingSleeper::new());
//!
//! let pipeline = HidePipeline::new(account.clone(), sleeper.clone(), &config.pipeline);
//! ```

mod mock_chat;
mod mock_marketplace;

pub use mock_chat::MockChatTransport;
pub use mock_marketplace::MockMarketplace;

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::lots::{LotDiagnostics, Sleeper};
use crate::marketplace::LotId;

/// Sleeper that returns immediately and records requested durations.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
    }
}

/// Diagnostics sink that records `(lot_id, lot_url)` pairs.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    unavailable: Mutex<Vec<(LotId, String)>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<(LotId, String)> {
        self.unavailable
            .lock()
            .map(|u| u.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LotDiagnostics for RecordingDiagnostics {
    async fn lot_unavailable(&self, lot_id: LotId, lot_url: &str) {
        if let Ok(mut unavailable) = self.unavailable.lock() {
            unavailable.push((lot_id, lot_url.to_string()));
        }
    }
}

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeMap;

    use crate::lots::{LotRecord, SanitizedFields};
    use crate::marketplace::{
        CategoryId, LotId, LotSummary, RawFields, Subcategory, SubcategoryKind,
    };

    /// Create a profile lot.
    pub fn lot(id: LotId, category: CategoryId, kind: SubcategoryKind) -> LotSummary {
        LotSummary {
            id,
            subcategory: Subcategory::new(category, kind),
        }
    }

    /// Edit-form fields of a lot with auto-delivery secrets configured.
    pub fn lot_fields(id: LotId) -> BTreeMap<String, String> {
        [
            ("csrf_token", "mock-csrf".to_string()),
            ("offer_id", id.to_string()),
            ("node_id", "5".to_string()),
            ("fields[summary][en]", format!("Lot {}", id)),
            ("price", "10".to_string()),
            ("amount", "1".to_string()),
            ("active", "on".to_string()),
            ("auto_delivery", "on".to_string()),
            ("secrets", format!("key-{}-a\nkey-{}-b", id, id)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// A collected record for a lot with fixture fields.
    pub fn record(id: LotId, category: CategoryId) -> LotRecord {
        LotRecord {
            lot_id: id,
            subcategory: Subcategory::new(category, SubcategoryKind::Other),
            fields: SanitizedFields::redact(RawFields::new(lot_fields(id))),
        }
    }

    /// Lots 101 (cat 5), 102 (cat 7) and currency lot 103 (cat 5).
    pub fn scenario_lots() -> Vec<LotSummary> {
        vec![
            lot(101, 5, SubcategoryKind::Other),
            lot(102, 7, SubcategoryKind::Other),
            lot(103, 5, SubcategoryKind::Currency),
        ]
    }
}
