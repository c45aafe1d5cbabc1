//! Error types for the lot pipeline.

use thiserror::Error;

use crate::marketplace::{LotId, MarketplaceError};

/// Errors that can occur while collecting or hiding lots.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The seller profile could not be enumerated; nothing was touched.
    #[error("Failed to list lots: {0}")]
    ListingUnavailable(#[source] MarketplaceError),

    /// Field data of a lot could not be retrieved within the retry budget.
    #[error("Lot {lot_id} unavailable after {attempts} attempts")]
    FetchUnavailable {
        lot_id: LotId,
        attempts: u32,
        #[source]
        source: MarketplaceError,
    },

    /// The hide mutation exhausted its retry budget.
    #[error("Failed to hide lot {lot_id} after {attempts} attempts")]
    MutationFailed {
        lot_id: LotId,
        attempts: u32,
        #[source]
        source: MarketplaceError,
    },

    /// Operator input is not a category id.
    #[error("Category id must contain only digits, got {input:?}")]
    InvalidInput { input: String },
}

/// A run that stopped early. Lots hidden before the failure stay counted.
#[derive(Debug, Error)]
#[error("{error} ({hidden} lots hidden before the failure)")]
pub struct PartialRun {
    pub hidden: usize,
    #[source]
    pub error: PipelineError,
}
