//! Types for marketplace account operations.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a listing.
pub type LotId = u64;

/// Identifier of a marketplace subcategory.
pub type CategoryId = u64;

/// Errors that can occur while talking to the marketplace.
#[derive(Debug, Clone, Error)]
pub enum MarketplaceError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(String),

    /// The marketplace answered with a non-2xx status.
    #[error("Request failed with HTTP {status}")]
    RequestFailed { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The marketplace answered 2xx but reported an error in the body.
    #[error("Rejected by marketplace: {0}")]
    Rejected(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for MarketplaceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MarketplaceError::Timeout
        } else if e.is_connect() {
            MarketplaceError::ConnectionFailed(e.to_string())
        } else {
            MarketplaceError::Http(e.to_string())
        }
    }
}

/// Kind of a subcategory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubcategoryKind {
    /// In-game currency listings. Never touched by the lot pipeline.
    Currency,
    /// Every other listing type.
    Other,
}

/// Subcategory a lot is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: CategoryId,
    pub kind: SubcategoryKind,
}

impl Subcategory {
    pub fn new(id: CategoryId, kind: SubcategoryKind) -> Self {
        Self { id, kind }
    }

    pub fn is_currency(&self) -> bool {
        self.kind == SubcategoryKind::Currency
    }
}

/// A lot as listed on the seller profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotSummary {
    pub id: LotId,
    pub subcategory: Subcategory,
}

/// Editable field set of a lot exactly as the marketplace returned it.
///
/// May still carry delivery secrets. `Debug` prints field names only.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawFields(BTreeMap<String, String>);

impl RawFields {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self(fields)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Debug for RawFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawFields")
            .field(&self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// HTTP method of a form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
}

/// An authenticated form request against the marketplace.
#[derive(Debug, Clone)]
pub struct FormRequest {
    pub method: FormMethod,
    /// Path relative to the marketplace base URL, e.g. `lots/offerSave`.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub fields: Vec<(String, String)>,
}

impl FormRequest {
    /// Create a POST request with no headers or fields.
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: FormMethod::Post,
            path: path.into(),
            headers: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Add headers a browser sends for an XHR form submission.
    pub fn xhr(mut self) -> Self {
        self.headers.extend(
            [
                ("accept", "*/*"),
                (
                    "content-type",
                    "application/x-www-form-urlencoded; charset=UTF-8",
                ),
                ("x-requested-with", "XMLHttpRequest"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        self
    }

    pub fn with_fields(mut self, fields: Vec<(String, String)>) -> Self {
        self.fields = fields;
        self
    }
}

/// Response to a successful (2xx) form submission.
#[derive(Debug, Clone)]
pub struct FormResponse {
    pub status: u16,
    pub body: String,
}

/// Seller account session on the marketplace.
///
/// Implementations must return `MarketplaceError::RequestFailed` for non-2xx
/// answers to `submit_form`.
#[async_trait]
pub trait MarketplaceAccount: Send + Sync {
    /// Base URL of the marketplace, without trailing slash.
    fn base_url(&self) -> &str;

    /// Enumerate every lot of the seller profile, in profile order.
    async fn list_lots(&self) -> Result<Vec<LotSummary>, MarketplaceError>;

    /// Fetch the full editable field set of a lot.
    async fn fetch_lot_fields(&self, lot_id: LotId) -> Result<RawFields, MarketplaceError>;

    /// Submit an authenticated form request.
    async fn submit_form(&self, request: FormRequest) -> Result<FormResponse, MarketplaceError>;

    /// Public URL of a lot.
    fn lot_url(&self, lot_id: LotId) -> String {
        lot_url(self.base_url(), lot_id)
    }
}

/// Public URL of a lot: `<base>/lots/offer?id=<lot_id>`.
pub fn lot_url(base_url: &str, lot_id: LotId) -> String {
    format!("{}/lots/offer?id={}", base_url.trim_end_matches('/'), lot_id)
}
