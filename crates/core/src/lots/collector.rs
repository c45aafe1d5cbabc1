//! Enumeration of eligible lots and retrying field fetch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::marketplace::{LotId, LotSummary, MarketplaceAccount};
use crate::metrics::{LOTS_SKIPPED, LOT_FETCH_ATTEMPTS};

use super::{CategoryFilter, LotRecord, PipelineError, RetryPolicy, SanitizedFields, Sleeper};

/// Receives operator-facing diagnostics while lots are collected.
#[async_trait]
pub trait LotDiagnostics: Send + Sync {
    /// Called once for every lot skipped because its fields stayed
    /// unavailable.
    async fn lot_unavailable(&self, lot_id: LotId, lot_url: &str);
}

/// Collects the redacted field sets of every eligible lot, one lot at a time.
pub struct LotCollector {
    account: Arc<dyn MarketplaceAccount>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryPolicy,
    /// Pause after a skipped lot.
    skip_pause: Duration,
    /// Pause after a fetched lot.
    throttle: Duration,
}

impl LotCollector {
    pub fn new(
        account: Arc<dyn MarketplaceAccount>,
        sleeper: Arc<dyn Sleeper>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            account,
            sleeper,
            retry: RetryPolicy::from(&config.fetch),
            skip_pause: Duration::from_millis(config.skip_pause_ms),
            throttle: Duration::from_millis(config.throttle_ms),
        }
    }

    /// Collect records for every non-currency lot accepted by `filter`, in
    /// profile order.
    ///
    /// Lots whose fields cannot be fetched are skipped and reported to
    /// `diagnostics`; only a failure to enumerate the profile is an error.
    pub async fn collect(
        &self,
        filter: CategoryFilter,
        diagnostics: &dyn LotDiagnostics,
    ) -> Result<Vec<LotRecord>, PipelineError> {
        let lots = self
            .account
            .list_lots()
            .await
            .map_err(PipelineError::ListingUnavailable)?;

        let total = lots.len();
        let eligible: Vec<LotSummary> = lots.into_iter().filter(|l| filter.accepts(l)).collect();
        info!(
            total,
            eligible = eligible.len(),
            category = ?filter.category_id(),
            "Collecting lot fields"
        );

        let mut records = Vec::with_capacity(eligible.len());
        for lot in &eligible {
            match self.fetch_record(lot).await {
                Ok(record) => {
                    info!(lot_id = lot.id, fields = record.fields.len(), "Fetched lot fields");
                    records.push(record);
                    self.sleeper.sleep(self.throttle).await;
                }
                Err(e) => {
                    error!(lot_id = lot.id, error = %e, "Skipping lot");
                    LOTS_SKIPPED.inc();
                    diagnostics
                        .lot_unavailable(lot.id, &self.account.lot_url(lot.id))
                        .await;
                    self.sleeper.sleep(self.skip_pause).await;
                }
            }
        }

        Ok(records)
    }

    /// Fetch and redact the fields of a single lot within the retry budget.
    pub async fn fetch_record(&self, lot: &LotSummary) -> Result<LotRecord, PipelineError> {
        let account = &self.account;
        let lot_id = lot.id;

        let raw = self
            .retry
            .run(self.sleeper.as_ref(), |attempt| async move {
                let result = account.fetch_lot_fields(lot_id).await;
                match &result {
                    Ok(_) => LOT_FETCH_ATTEMPTS.with_label_values(&["success"]).inc(),
                    Err(e) => {
                        LOT_FETCH_ATTEMPTS.with_label_values(&["failure"]).inc();
                        warn!(lot_id, attempt, error = %e, "Failed to fetch lot fields");
                    }
                }
                result
            })
            .await
            .map_err(|exhausted| PipelineError::FetchUnavailable {
                lot_id,
                attempts: exhausted.attempts,
                source: exhausted.last_error,
            })?;

        Ok(LotRecord {
            lot_id,
            subcategory: lot.subcategory,
            fields: SanitizedFields::redact(raw),
        })
    }
}
