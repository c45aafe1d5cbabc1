//! Mock chat transport for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::interaction::{
    BotCommand, CallbackId, ChatId, ChatTransport, MessageId, OutgoingMessage, TransportError,
};

#[derive(Debug, Default)]
struct MockChatState {
    sent: Vec<(ChatId, OutgoingMessage)>,
    answered: Vec<CallbackId>,
    cleared: Vec<(ChatId, MessageId)>,
    commands: Vec<BotCommand>,
    next_message_id: i64,
    fail_sends: bool,
}

/// Mock implementation of the ChatTransport trait.
///
/// Records everything the controller sends. Message ids start at 1000 and
/// increase with every sent message.
#[derive(Debug, Clone)]
pub struct MockChatTransport {
    state: Arc<RwLock<MockChatState>>,
}

impl Default for MockChatTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockChatState {
                next_message_id: 1000,
                ..Default::default()
            })),
        }
    }

    /// Make every `send_message` call fail.
    pub async fn fail_sends(&self, fail: bool) {
        self.state.write().await.fail_sends = fail;
    }

    pub async fn sent(&self) -> Vec<(ChatId, OutgoingMessage)> {
        self.state.read().await.sent.clone()
    }

    /// Texts of sent messages, in order.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .sent
            .iter()
            .map(|(_, m)| m.text.clone())
            .collect()
    }

    pub async fn answered(&self) -> Vec<CallbackId> {
        self.state.read().await.answered.clone()
    }

    pub async fn cleared(&self) -> Vec<(ChatId, MessageId)> {
        self.state.read().await.cleared.clone()
    }

    pub async fn commands(&self) -> Vec<BotCommand> {
        self.state.read().await.commands.clone()
    }
}

#[async_trait]
impl ChatTransport for MockChatTransport {
    async fn send_message(
        &self,
        chat: ChatId,
        message: OutgoingMessage,
    ) -> Result<MessageId, TransportError> {
        let mut state = self.state.write().await;
        if state.fail_sends {
            return Err(TransportError::ConnectionFailed(
                "mock send failure".to_string(),
            ));
        }
        state.next_message_id += 1;
        let id = MessageId(state.next_message_id);
        state.sent.push((chat, message));
        Ok(id)
    }

    async fn answer_callback(
        &self,
        callback: &CallbackId,
        _text: Option<&str>,
    ) -> Result<(), TransportError> {
        self.state.write().await.answered.push(callback.clone());
        Ok(())
    }

    async fn clear_keyboard(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> Result<(), TransportError> {
        self.state.write().await.cleared.push((chat, message));
        Ok(())
    }

    async fn register_commands(&self, commands: &[BotCommand]) -> Result<(), TransportError> {
        self.state.write().await.commands = commands.to_vec();
        Ok(())
    }
}
