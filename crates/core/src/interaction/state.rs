//! Per-(chat, user) conversation state.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ChatId, MessageId, UserId};

/// What the bot is waiting for from a user in a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTag {
    /// The next text message is a category id.
    AwaitingCategoryId {
        /// Prompt message whose keyboard is removed when the state clears.
        prompt: Option<MessageId>,
    },
}

/// Keyed store of pending conversation state. One slot per (chat, user).
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get(&self, chat: ChatId, user: UserId) -> Option<StateTag>;

    /// Set the slot, replacing any pending state.
    async fn set(&self, chat: ChatId, user: UserId, tag: StateTag);

    /// Clear the slot and return what was pending.
    async fn clear(&self, chat: ChatId, user: UserId) -> Option<StateTag>;
}

/// In-memory `ConversationStore`.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    slots: RwLock<HashMap<(ChatId, UserId), StateTag>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get(&self, chat: ChatId, user: UserId) -> Option<StateTag> {
        self.slots.read().await.get(&(chat, user)).copied()
    }

    async fn set(&self, chat: ChatId, user: UserId, tag: StateTag) {
        self.slots.write().await.insert((chat, user), tag);
    }

    async fn clear(&self, chat: ChatId, user: UserId) -> Option<StateTag> {
        self.slots.write().await.remove(&(chat, user))
    }
}
