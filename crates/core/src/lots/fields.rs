//! Lot field sets at each pipeline stage.
//!
//! `RawFields` (from the marketplace) → `SanitizedFields` (secrets redacted)
//! → `HiddenFields` (`deleted=on`) → `SubmittedFields` (`location=trade`).
//! Each stage consumes the previous one, so secret values cannot survive
//! past redaction.

use std::collections::BTreeMap;
use std::fmt;

use crate::marketplace::RawFields;

/// Automatic delivery payload; replaced with an empty value.
pub const SECRETS_FIELD: &str = "secrets";
/// Automatic delivery toggle; removed.
pub const AUTO_DELIVERY_FIELD: &str = "auto_delivery";
pub const DELETED_FIELD: &str = "deleted";
pub const LOCATION_FIELD: &str = "location";

const CHECKED: &str = "on";
const LOCATION_TRADE: &str = "trade";

fn fmt_names(
    f: &mut fmt::Formatter<'_>,
    stage: &str,
    fields: &BTreeMap<String, String>,
) -> fmt::Result {
    f.debug_tuple(stage)
        .field(&fields.keys().collect::<Vec<_>>())
        .finish()
}

/// Field set with delivery secrets redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SanitizedFields(BTreeMap<String, String>);

impl SanitizedFields {
    /// Empty `secrets` (when present) and drop `auto_delivery`.
    pub fn redact(raw: RawFields) -> Self {
        let mut fields = raw.into_inner();
        if let Some(secrets) = fields.get_mut(SECRETS_FIELD) {
            secrets.clear();
        }
        fields.remove(AUTO_DELIVERY_FIELD);
        Self(fields)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Mark the lot as deleted.
    pub fn mark_hidden(self) -> HiddenFields {
        let mut fields = self.0;
        fields.insert(DELETED_FIELD.to_string(), CHECKED.to_string());
        HiddenFields(fields)
    }
}

impl fmt::Debug for SanitizedFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_names(f, "SanitizedFields", &self.0)
    }
}

/// Field set marked `deleted=on`.
#[derive(Clone, PartialEq, Eq)]
pub struct HiddenFields(BTreeMap<String, String>);

impl HiddenFields {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay the trade location the save endpoint expects.
    pub fn for_submission(self) -> SubmittedFields {
        let mut fields = self.0;
        fields.insert(LOCATION_FIELD.to_string(), LOCATION_TRADE.to_string());
        SubmittedFields(fields)
    }
}

impl fmt::Debug for HiddenFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_names(f, "HiddenFields", &self.0)
    }
}

/// Field set ready to be posted to the save endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct SubmittedFields(BTreeMap<String, String>);

impl SubmittedFields {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Form-encoded pairs in field-name order.
    pub fn to_form(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl fmt::Debug for SubmittedFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_names(f, "SubmittedFields", &self.0)
    }
}
