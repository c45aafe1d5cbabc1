use async_trait::async_trait;
use thiserror::Error;

use super::{BotCommand, CallbackId, ChatId, MessageId, OutgoingMessage};

/// Errors that can occur while talking to the chat platform.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a message and return its id.
    async fn send_message(
        &self,
        chat: ChatId,
        message: OutgoingMessage,
    ) -> Result<MessageId, TransportError>;

    /// Acknowledge a button press, optionally with a short toast.
    async fn answer_callback(
        &self,
        callback: &CallbackId,
        text: Option<&str>,
    ) -> Result<(), TransportError>;

    /// Remove the inline keyboard of a sent message.
    async fn clear_keyboard(&self, chat: ChatId, message: MessageId)
        -> Result<(), TransportError>;

    /// Publish the bot's command list.
    async fn register_commands(&self, commands: &[BotCommand]) -> Result<(), TransportError>;
}
