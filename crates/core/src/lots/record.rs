use crate::marketplace::{CategoryId, LotId, LotSummary, Subcategory};

use super::{PipelineError, SanitizedFields};

/// A collected lot: id, origin subcategory and its redacted field set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotRecord {
    pub lot_id: LotId,
    pub subcategory: Subcategory,
    pub fields: SanitizedFields,
}

/// Which lots a run targets. Currency lots are never eligible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryFilter(Option<CategoryId>);

impl CategoryFilter {
    /// Every non-currency category.
    pub const fn all() -> Self {
        Self(None)
    }

    pub const fn category(id: CategoryId) -> Self {
        Self(Some(id))
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.0
    }

    /// Parse operator input: ASCII digits only, no sign or whitespace.
    pub fn parse(input: &str) -> Result<Self, PipelineError> {
        let invalid = || PipelineError::InvalidInput {
            input: input.to_string(),
        };
        if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        input.parse().map(Self::category).map_err(|_| invalid())
    }

    pub fn accepts(&self, lot: &LotSummary) -> bool {
        if lot.subcategory.is_currency() {
            return false;
        }
        match self.0 {
            Some(id) => lot.subcategory.id == id,
            None => true,
        }
    }
}
