//! Scraping of marketplace HTML pages.
//!
//! The marketplace has no JSON API for lot listings or lot editing, so the
//! seller profile page and the lot edit form are scanned with regexes.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::{LotSummary, MarketplaceError, RawFields, Subcategory, SubcategoryKind};

/// Either a subcategory header link (`/lots/<id>/`, `/chips/<id>/`) or an
/// offer link (`/lots/offer?id=<id>`).
static PROFILE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="[^"]*?/(?:(lots|chips)/(\d+)/|lots/offer\?id=(\d+))""#).unwrap()
});

static INPUT_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<input\b([^>]*)>").unwrap());

static TEXTAREA_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<textarea\b([^>]*)>(.*?)</textarea>").unwrap());

static SELECT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<select\b([^>]*)>(.*?)</select>").unwrap());

static OPTION_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<option\b([^>]*)>").unwrap());

static ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'))?"#).unwrap());

/// Extract lot summaries from the seller profile page, in page order.
///
/// Offers belong to the closest preceding subcategory header; offers that
/// appear before any header are ignored.
pub fn parse_profile_lots(html: &str) -> Vec<LotSummary> {
    let mut current: Option<Subcategory> = None;
    let mut lots = Vec::new();

    for caps in PROFILE_LINK.captures_iter(html) {
        if let (Some(section), Some(id)) = (caps.get(1), caps.get(2)) {
            let Ok(id) = id.as_str().parse() else {
                continue;
            };
            let kind = if section.as_str() == "chips" {
                SubcategoryKind::Currency
            } else {
                SubcategoryKind::Other
            };
            current = Some(Subcategory::new(id, kind));
        } else if let Some(offer) = caps.get(3) {
            let (Some(subcategory), Ok(id)) = (current, offer.as_str().parse()) else {
                continue;
            };
            lots.push(LotSummary { id, subcategory });
        }
    }

    lots
}

/// Extract the named form controls of the lot edit page.
///
/// Checkboxes and radios contribute only when checked, selects contribute the
/// selected option (or the first one), buttons are ignored.
pub fn parse_lot_form(html: &str) -> Result<RawFields, MarketplaceError> {
    let mut fields = BTreeMap::new();

    for caps in INPUT_TAG.captures_iter(html) {
        let attrs = attributes(&caps[1]);
        let Some(name) = attrs.get("name") else {
            continue;
        };
        let kind = attrs.get("type").map(|t| t.to_ascii_lowercase());
        match kind.as_deref() {
            Some("submit" | "button" | "reset" | "image" | "file") => continue,
            Some("checkbox" | "radio") => {
                if attrs.contains_key("checked") {
                    let value = attrs.get("value").cloned().unwrap_or_else(|| "on".into());
                    fields.insert(name.clone(), value);
                }
            }
            _ => {
                fields.insert(name.clone(), attrs.get("value").cloned().unwrap_or_default());
            }
        }
    }

    for caps in TEXTAREA_TAG.captures_iter(html) {
        let attrs = attributes(&caps[1]);
        if let Some(name) = attrs.get("name") {
            fields.insert(name.clone(), unescape_html(&caps[2]));
        }
    }

    for caps in SELECT_TAG.captures_iter(html) {
        let attrs = attributes(&caps[1]);
        let Some(name) = attrs.get("name") else {
            continue;
        };
        let options: Vec<_> = OPTION_TAG
            .captures_iter(&caps[2])
            .map(|o| attributes(&o[1]))
            .collect();
        let chosen = options
            .iter()
            .find(|o| o.contains_key("selected"))
            .or_else(|| options.first());
        if let Some(option) = chosen {
            fields.insert(
                name.clone(),
                option.get("value").cloned().unwrap_or_default(),
            );
        }
    }

    if fields.is_empty() {
        return Err(MarketplaceError::ParseError(
            "lot edit page contains no form fields".to_string(),
        ));
    }

    Ok(RawFields::new(fields))
}

/// Attribute name (lowercased) to unescaped value; valueless attributes map
/// to an empty string.
fn attributes(tag: &str) -> BTreeMap<String, String> {
    ATTRIBUTE
        .captures_iter(tag)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| unescape_html(m.as_str()))
                .unwrap_or_default();
            (caps[1].to_ascii_lowercase(), value)
        })
        .collect()
}

fn unescape_html(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}
