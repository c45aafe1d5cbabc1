//! Retrying hide mutation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::marketplace::{FormRequest, FormResponse, LotId, MarketplaceAccount, MarketplaceError};
use crate::metrics::{LOTS_HIDDEN, LOT_HIDE_ATTEMPTS};

use super::{LotRecord, PipelineError, RetryPolicy, SanitizedFields, Sleeper};

/// Save endpoint of the lot edit form.
pub const OFFER_SAVE_PATH: &str = "lots/offerSave";

/// Longest response excerpt written to the log.
const LOG_BODY_LIMIT: usize = 512;

/// Hides lots by re-saving their edit form with `deleted=on`.
pub struct LotHider {
    account: Arc<dyn MarketplaceAccount>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryPolicy,
}

impl LotHider {
    pub fn new(
        account: Arc<dyn MarketplaceAccount>,
        sleeper: Arc<dyn Sleeper>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            account,
            sleeper,
            retry: RetryPolicy::from(&config.hide),
        }
    }

    /// Hide one lot.
    ///
    /// Every attempt re-fetches the lot and builds the mutation from that
    /// snapshot, so values edited since collection are submitted as they
    /// are now. Exhausting the budget is `MutationFailed`.
    pub async fn hide(&self, record: LotRecord) -> Result<(), PipelineError> {
        let lot_id = record.lot_id;
        let account = self.account.as_ref();

        self.retry
            .run(self.sleeper.as_ref(), |attempt| async move {
                let result = submit_hidden(account, lot_id).await;
                match &result {
                    Ok(_) => LOT_HIDE_ATTEMPTS.with_label_values(&["success"]).inc(),
                    Err(e) => {
                        LOT_HIDE_ATTEMPTS.with_label_values(&["failure"]).inc();
                        warn!(lot_id, attempt, error = %e, "Failed to hide lot");
                        if let MarketplaceError::RequestFailed { body, .. } = e {
                            debug!(lot_id, body = %excerpt(body), "Hide error response");
                        }
                    }
                }
                result
            })
            .await
            .map_err(|exhausted| PipelineError::MutationFailed {
                lot_id,
                attempts: exhausted.attempts,
                source: exhausted.last_error,
            })?;

        LOTS_HIDDEN.inc();
        info!(lot_id, "Hid lot");
        Ok(())
    }
}

async fn submit_hidden(
    account: &dyn MarketplaceAccount,
    lot_id: LotId,
) -> Result<FormResponse, MarketplaceError> {
    let submitted = SanitizedFields::redact(account.fetch_lot_fields(lot_id).await?)
        .mark_hidden()
        .for_submission();
    debug!(lot_id, fields = submitted.len(), "Submitting hide mutation");

    let request = FormRequest::post(OFFER_SAVE_PATH)
        .xhr()
        .with_fields(submitted.to_form());
    let response = account.submit_form(request).await?;
    debug!(lot_id, status = response.status, body = %excerpt(&response.body), "Hide response");

    check_save_response(&response)?;
    Ok(response)
}

/// The save endpoint answers JSON; a body that is not JSON or that carries
/// a truthy `error` member is a failed save.
fn check_save_response(response: &FormResponse) -> Result<(), MarketplaceError> {
    let body: serde_json::Value = serde_json::from_str(&response.body)
        .map_err(|e| MarketplaceError::ParseError(format!("save response is not JSON: {}", e)))?;

    let rejected = match body.get("error") {
        None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => false,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    };
    if rejected {
        let message = body
            .get("msg")
            .and_then(|m| m.as_str())
            .unwrap_or("save rejected")
            .to_string();
        return Err(MarketplaceError::Rejected(message));
    }
    Ok(())
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(LOG_BODY_LIMIT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
