//! Chat-side types shared by the controller and transports.

use serde::{Deserialize, Serialize};

/// Chat id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// User id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Message id within a chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

/// Id of a callback query, needed to answer it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackId(pub String);

/// An update delivered by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A text message; commands arrive as text starting with `/`.
    Message {
        chat: ChatId,
        user: UserId,
        text: String,
    },
    /// An inline keyboard button press.
    Callback {
        id: CallbackId,
        chat: ChatId,
        user: UserId,
        /// Message the pressed keyboard belongs to.
        message: Option<MessageId>,
        data: String,
    },
}

impl Incoming {
    pub fn chat(&self) -> ChatId {
        match self {
            Incoming::Message { chat, .. } | Incoming::Callback { chat, .. } => *chat,
        }
    }

    pub fn user(&self) -> UserId {
        match self {
            Incoming::Message { user, .. } | Incoming::Callback { user, .. } => *user,
        }
    }
}

/// Inline keyboard button that sends `callback` when pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub text: String,
    pub callback: String,
}

impl Button {
    pub fn new(text: impl Into<String>, callback: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback: callback.into(),
        }
    }
}

/// Rows of inline buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<Button>>,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }

    pub fn callbacks(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(|b| b.callback.as_str())
    }
}

/// A message to send. Text is HTML-formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// A command advertised in the chat client's command list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}
