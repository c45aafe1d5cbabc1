//! Operator-facing texts, keyboards and callback tags.

use crate::lots::{PartialRun, PipelineError};
use crate::marketplace::{lot_url, LotId};

use super::{BotCommand, Button, InlineKeyboard, OutgoingMessage};

/// Command that opens the settings menu.
pub const COMMAND: &str = "del_lots";

pub const CB_MENU: &str = "del_lots:menu";
pub const CB_HIDE_ALL: &str = "del_lots:hide_all";
pub const CB_HIDE_ALL_CONFIRM: &str = "del_lots:hide_all:confirm";
pub const CB_HIDE_IN_CATEGORY: &str = "del_lots:hide_in_category";
pub const CB_CLEAR_STATE: &str = "del_lots:clear_state";
pub const CB_BACK: &str = "del_lots:back";

pub const INVALID_CATEGORY: &str = "Category id must contain only digits!";

pub fn commands() -> Vec<BotCommand> {
    vec![BotCommand {
        command: COMMAND.to_string(),
        description: "Hide lots".to_string(),
    }]
}

pub fn menu() -> OutgoingMessage {
    OutgoingMessage::text("Lot removal settings:").with_keyboard(
        InlineKeyboard::new()
            .row(vec![Button::new("Hide lots in all categories", CB_HIDE_ALL)])
            .row(vec![Button::new(
                "Hide lots in a specific category",
                CB_HIDE_IN_CATEGORY,
            )])
            .row(vec![Button::new("Back", CB_BACK)]),
    )
}

pub fn confirm_hide_all() -> OutgoingMessage {
    OutgoingMessage::text("Are you sure you want to hide all lots?").with_keyboard(
        InlineKeyboard::new().row(vec![
            Button::new("✅ Confirm", CB_HIDE_ALL_CONFIRM),
            Button::new("🚫 Cancel", CB_MENU),
        ]),
    )
}

pub fn category_prompt() -> OutgoingMessage {
    OutgoingMessage::text("Send me the id of the category whose lots should be hidden.")
        .with_keyboard(InlineKeyboard::new().row(vec![Button::new("🚫 Cancel", CB_CLEAR_STATE)]))
}

pub fn lot_unavailable(lot_id: LotId, url: &str) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "❌ Failed to fetch <a href=\"{}\">lot {}</a>. Skipping.",
        url, lot_id
    ))
}

pub fn report(hidden: usize) -> OutgoingMessage {
    OutgoingMessage::text(format!("✅ Successfully hid {} lots.", hidden))
}

/// Failure report for a run that stopped early.
pub fn failure(base_url: &str, partial: &PartialRun) -> OutgoingMessage {
    let reason = match &partial.error {
        PipelineError::MutationFailed {
            lot_id, attempts, ..
        } => format!(
            "❌ Failed to hide <a href=\"{}\">lot {}</a> after {} attempts. Stopped.",
            lot_url(base_url, *lot_id),
            lot_id,
            attempts
        ),
        PipelineError::ListingUnavailable(_) => {
            "❌ Failed to load the lot list of the profile.".to_string()
        }
        other => format!("❌ {}", escape_html(&other.to_string())),
    };
    OutgoingMessage::text(format!(
        "{}\nLots hidden before the failure: {}.",
        reason, partial.hidden
    ))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::MarketplaceError;

    #[test]
    fn test_menu_buttons() {
        let keyboard = menu().keyboard.unwrap();
        assert_eq!(
            keyboard.callbacks().collect::<Vec<_>>(),
            vec![CB_HIDE_ALL, CB_HIDE_IN_CATEGORY, CB_BACK]
        );
    }

    #[test]
    fn test_confirm_cancel_returns_to_menu() {
        let keyboard = confirm_hide_all().keyboard.unwrap();
        assert_eq!(
            keyboard.callbacks().collect::<Vec<_>>(),
            vec![CB_HIDE_ALL_CONFIRM, CB_MENU]
        );
    }

    #[test]
    fn test_lot_unavailable_links_lot() {
        let message = lot_unavailable(101, "https://funpay.com/lots/offer?id=101");
        assert!(message
            .text
            .contains("<a href=\"https://funpay.com/lots/offer?id=101\">lot 101</a>"));
    }

    #[test]
    fn test_failure_mentions_lot_and_progress() {
        let partial = PartialRun {
            hidden: 2,
            error: PipelineError::MutationFailed {
                lot_id: 101,
                attempts: 3,
                source: MarketplaceError::Timeout,
            },
        };
        let message = failure("https://funpay.com", &partial);
        assert!(message.text.contains("lots/offer?id=101"));
        assert!(message.text.contains("Lots hidden before the failure: 2."));
        assert!(!message.text.contains("Successfully"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&c"), "a&lt;b&gt;&amp;c");
    }
}
