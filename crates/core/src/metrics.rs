//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Lot collection (field fetch attempts, skipped lots)
//! - Lot hiding (mutation attempts, hidden lots)
//! - Whole pipeline runs

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

// =============================================================================
// Collection
// =============================================================================

/// Lot field fetch attempts by result.
pub static LOT_FETCH_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "lotsweep_lot_fetch_attempts_total",
            "Total lot field fetch attempts",
        ),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

/// Lots skipped because their fields could not be fetched.
pub static LOTS_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "lotsweep_lots_skipped_total",
        "Total lots skipped after exhausting fetch retries",
    )
    .unwrap()
});

// =============================================================================
// Hiding
// =============================================================================

/// Hide mutation attempts by result.
pub static LOT_HIDE_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "lotsweep_lot_hide_attempts_total",
            "Total hide mutation attempts",
        ),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

/// Lots hidden.
pub static LOTS_HIDDEN: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("lotsweep_lots_hidden_total", "Total lots hidden").unwrap()
});

// =============================================================================
// Pipeline
// =============================================================================

/// Pipeline runs by mode and result.
pub static PIPELINE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("lotsweep_pipeline_runs_total", "Total hide pipeline runs"),
        &["mode", "result"], // mode: "all", "category"; result: "completed", "failed"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(LOT_FETCH_ATTEMPTS.clone()),
        Box::new(LOTS_SKIPPED.clone()),
        Box::new(LOT_HIDE_ATTEMPTS.clone()),
        Box::new(LOTS_HIDDEN.clone()),
        Box::new(PIPELINE_RUNS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        LOTS_HIDDEN.inc();
        let names: Vec<_> = registry
            .gather()
            .iter()
            .map(|m| m.get_name().to_string())
            .collect();
        assert!(names.contains(&"lotsweep_lots_hidden_total".to_string()));
    }
}
