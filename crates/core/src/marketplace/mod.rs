//! Marketplace account abstraction.
//!
//! This module provides a `MarketplaceAccount` trait for the seller session
//! the lot pipeline works through, and an implementation that talks to the
//! marketplace website.

mod http;
mod parse;
mod types;

pub use http::HttpMarketplaceAccount;
pub use parse::{parse_lot_form, parse_profile_lots};
pub use types::*;
