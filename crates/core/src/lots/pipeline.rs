use std::sync::Arc;

use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::marketplace::MarketplaceAccount;
use crate::metrics::PIPELINE_RUNS;

use super::{
    CategoryFilter, LotCollector, LotDiagnostics, LotHider, PartialRun, PipelineError, Sleeper,
};

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationResult {
    /// Lots hidden successfully. Skipped lots are not counted.
    pub hidden: usize,
}

/// Collect, then hide, one lot at a time.
pub struct HidePipeline {
    account: Arc<dyn MarketplaceAccount>,
    collector: LotCollector,
    hider: LotHider,
}

impl HidePipeline {
    pub fn new(
        account: Arc<dyn MarketplaceAccount>,
        sleeper: Arc<dyn Sleeper>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            collector: LotCollector::new(Arc::clone(&account), Arc::clone(&sleeper), config),
            hider: LotHider::new(Arc::clone(&account), sleeper, config),
            account,
        }
    }

    /// Marketplace base URL, for building lot links.
    pub fn base_url(&self) -> &str {
        self.account.base_url()
    }

    /// Hide every lot `filter` selects.
    ///
    /// Stops at the first lot that cannot be hidden; the returned
    /// `PartialRun` still counts the lots hidden before it.
    pub async fn run(
        &self,
        filter: CategoryFilter,
        diagnostics: &dyn LotDiagnostics,
    ) -> Result<OperationResult, PartialRun> {
        let mode = match filter.category_id() {
            Some(_) => "category",
            None => "all",
        };

        let records = match self.collector.collect(filter, diagnostics).await {
            Ok(records) => records,
            Err(error) => return Err(self.failed(mode, 0, error)),
        };

        let mut hidden = 0;
        for record in records {
            if let Err(error) = self.hider.hide(record).await {
                return Err(self.failed(mode, hidden, error));
            }
            hidden += 1;
        }

        PIPELINE_RUNS.with_label_values(&[mode, "completed"]).inc();
        info!(mode, hidden, "Hide run completed");
        Ok(OperationResult { hidden })
    }

    fn failed(&self, mode: &str, hidden: usize, error: PipelineError) -> PartialRun {
        PIPELINE_RUNS.with_label_values(&[mode, "failed"]).inc();
        error!(mode, hidden, error = %error, "Hide run stopped");
        PartialRun { hidden, error }
    }
}
