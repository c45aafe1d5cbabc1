//! Lot enumeration and hiding pipeline.
//!
//! `LotCollector` enumerates the seller's eligible lots and fetches their
//! redacted field sets; `LotHider` flips each one to hidden. Both use a
//! bounded fixed-delay `RetryPolicy` and an injected `Sleeper`, and process
//! lots strictly one at a time.

mod collector;
mod error;
mod fields;
mod hider;
mod pipeline;
mod record;
mod retry;

pub use collector::{LotCollector, LotDiagnostics};
pub use error::{PartialRun, PipelineError};
pub use fields::*;
pub use hider::{LotHider, OFFER_SAVE_PATH};
pub use pipeline::{HidePipeline, OperationResult};
pub use record::{CategoryFilter, LotRecord};
pub use retry::{RetryExhausted, RetryPolicy, Sleeper, TokioSleeper};
