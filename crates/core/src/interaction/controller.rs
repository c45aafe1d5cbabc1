//! Conversation controller driving the hide pipeline from chat updates.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::lots::{CategoryFilter, HidePipeline, LotDiagnostics, PartialRun};
use crate::marketplace::LotId;

use super::messages;
use super::{
    CallbackId, ChatId, ChatTransport, ConversationStore, Incoming, MessageId, OutgoingMessage,
    Route, Router, StateTag, TransportError, UserId,
};

/// Errors surfaced by `InteractionController::handle`.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Chat transport error: {0}")]
    Transport(#[from] TransportError),

    /// A run stopped early. The operator has already been notified.
    #[error("Hide run failed: {0}")]
    Pipeline(#[from] PartialRun),
}

/// Where a routed update came from.
#[derive(Debug, Clone)]
pub struct Context {
    pub chat: ChatId,
    pub user: UserId,
    pub callback: Option<CallbackId>,
    /// Message carrying the pressed keyboard, for callbacks.
    pub message: Option<MessageId>,
}

/// Route handler.
pub type Handler =
    for<'a> fn(&'a InteractionController, &'a Context) -> BoxFuture<'a, Result<(), BotError>>;

/// Two-state conversation: idle, or awaiting a category id.
///
/// Updates must be delivered one at a time; a run occupies the caller until
/// every selected lot has been processed.
pub struct InteractionController {
    pipeline: HidePipeline,
    transport: Arc<dyn ChatTransport>,
    states: Arc<dyn ConversationStore>,
    authorized: HashSet<UserId>,
    router: Router<Handler>,
}

impl InteractionController {
    pub fn new(
        pipeline: HidePipeline,
        transport: Arc<dyn ChatTransport>,
        states: Arc<dyn ConversationStore>,
        authorized: impl IntoIterator<Item = UserId>,
    ) -> Self {
        let router = Router::new()
            .on_command(messages::COMMAND, open_menu as Handler)
            .on_callback(messages::CB_MENU, open_menu)
            .on_callback(messages::CB_HIDE_ALL, prompt_hide_all)
            .on_callback(messages::CB_HIDE_ALL_CONFIRM, confirm_hide_all)
            .on_callback(messages::CB_HIDE_IN_CATEGORY, prompt_category)
            .on_callback(messages::CB_CLEAR_STATE, clear_state)
            .on_callback(messages::CB_BACK, back);

        Self {
            pipeline,
            transport,
            states,
            authorized: authorized.into_iter().collect(),
            router,
        }
    }

    /// Publish the command list to the chat platform.
    pub async fn register_commands(&self) -> Result<(), TransportError> {
        self.transport
            .register_commands(&messages::commands())
            .await
    }

    pub fn is_authorized(&self, user: UserId) -> bool {
        self.authorized.contains(&user)
    }

    /// Handle one update.
    pub async fn handle(&self, incoming: Incoming) -> Result<(), BotError> {
        let user = incoming.user();
        if !self.is_authorized(user) {
            warn!(
                user = user.0,
                chat = incoming.chat().0,
                "Ignoring update from unauthorized user"
            );
            return Ok(());
        }

        match incoming {
            Incoming::Message { chat, user, text } => {
                if let Some(StateTag::AwaitingCategoryId { prompt }) =
                    self.states.get(chat, user).await
                {
                    return self.receive_category(chat, user, prompt, &text).await;
                }

                let Some(route) = Route::for_text(&text) else {
                    debug!(chat = chat.0, "Ignoring plain text message");
                    return Ok(());
                };
                let context = Context {
                    chat,
                    user,
                    callback: None,
                    message: None,
                };
                self.dispatch(route, &context).await
            }
            Incoming::Callback {
                id,
                chat,
                user,
                message,
                data,
            } => {
                if let Err(e) = self.transport.answer_callback(&id, None).await {
                    warn!(callback = %id.0, error = %e, "Failed to answer callback");
                }
                let context = Context {
                    chat,
                    user,
                    callback: Some(id),
                    message,
                };
                self.dispatch(Route::Callback(data), &context).await
            }
        }
    }

    async fn dispatch(&self, route: Route, context: &Context) -> Result<(), BotError> {
        match self.router.resolve(&route) {
            Some(handler) => handler(self, context).await,
            None => {
                debug!(?route, "No handler for route");
                Ok(())
            }
        }
    }

    async fn send(&self, chat: ChatId, message: OutgoingMessage) -> Result<MessageId, BotError> {
        Ok(self.transport.send_message(chat, message).await?)
    }

    /// Remove a keyboard, logging instead of failing: the message may be
    /// gone or already edited.
    async fn drop_keyboard(&self, chat: ChatId, message: MessageId) {
        if let Err(e) = self.transport.clear_keyboard(chat, message).await {
            warn!(chat = chat.0, message = message.0, error = %e, "Failed to clear keyboard");
        }
    }

    async fn open_menu(&self, context: &Context) -> Result<(), BotError> {
        self.send(context.chat, messages::menu()).await?;
        Ok(())
    }

    async fn prompt_hide_all(&self, context: &Context) -> Result<(), BotError> {
        self.send(context.chat, messages::confirm_hide_all()).await?;
        Ok(())
    }

    async fn confirm_hide_all(&self, context: &Context) -> Result<(), BotError> {
        if let Some(message) = context.message {
            self.drop_keyboard(context.chat, message).await;
        }
        info!(chat = context.chat.0, user = context.user.0, "Hiding lots in all categories");
        self.run_pipeline(context.chat, CategoryFilter::all()).await
    }

    async fn prompt_category(&self, context: &Context) -> Result<(), BotError> {
        let prompt = self.send(context.chat, messages::category_prompt()).await?;
        let previous = self.states.get(context.chat, context.user).await;
        self.states
            .set(
                context.chat,
                context.user,
                StateTag::AwaitingCategoryId {
                    prompt: Some(prompt),
                },
            )
            .await;

        if let Some(StateTag::AwaitingCategoryId {
            prompt: Some(stale),
        }) = previous
        {
            self.drop_keyboard(context.chat, stale).await;
        }
        Ok(())
    }

    async fn clear_state(&self, context: &Context) -> Result<(), BotError> {
        let cleared = self.states.clear(context.chat, context.user).await;
        let prompt = match cleared {
            Some(StateTag::AwaitingCategoryId { prompt }) => prompt.or(context.message),
            None => context.message,
        };
        if let Some(prompt) = prompt {
            self.drop_keyboard(context.chat, prompt).await;
        }
        debug!(chat = context.chat.0, user = context.user.0, "Cleared conversation state");
        Ok(())
    }

    async fn back(&self, context: &Context) -> Result<(), BotError> {
        if let Some(message) = context.message {
            self.drop_keyboard(context.chat, message).await;
        }
        Ok(())
    }

    /// Text received while awaiting a category id. The state is cleared
    /// whether or not the input is valid.
    async fn receive_category(
        &self,
        chat: ChatId,
        user: UserId,
        prompt: Option<MessageId>,
        text: &str,
    ) -> Result<(), BotError> {
        self.states.clear(chat, user).await;
        if let Some(prompt) = prompt {
            self.drop_keyboard(chat, prompt).await;
        }

        let filter = match CategoryFilter::parse(text) {
            Ok(filter) => filter,
            Err(e) => {
                info!(chat = chat.0, error = %e, "Rejected category id");
                self.send(chat, OutgoingMessage::text(messages::INVALID_CATEGORY))
                    .await?;
                return Ok(());
            }
        };

        info!(
            chat = chat.0,
            user = user.0,
            category = ?filter.category_id(),
            "Hiding lots in category"
        );
        self.run_pipeline(chat, filter).await
    }

    async fn run_pipeline(&self, chat: ChatId, filter: CategoryFilter) -> Result<(), BotError> {
        let diagnostics = ChatDiagnostics {
            transport: self.transport.as_ref(),
            chat,
        };

        match self.pipeline.run(filter, &diagnostics).await {
            Ok(result) => {
                self.send(chat, messages::report(result.hidden)).await?;
                Ok(())
            }
            Err(partial) => {
                let report = messages::failure(self.pipeline.base_url(), &partial);
                if let Err(e) = self.transport.send_message(chat, report).await {
                    warn!(chat = chat.0, error = %e, "Failed to report hide failure");
                }
                Err(BotError::Pipeline(partial))
            }
        }
    }
}

fn open_menu<'a>(
    c: &'a InteractionController,
    ctx: &'a Context,
) -> BoxFuture<'a, Result<(), BotError>> {
    c.open_menu(ctx).boxed()
}

fn prompt_hide_all<'a>(
    c: &'a InteractionController,
    ctx: &'a Context,
) -> BoxFuture<'a, Result<(), BotError>> {
    c.prompt_hide_all(ctx).boxed()
}

fn confirm_hide_all<'a>(
    c: &'a InteractionController,
    ctx: &'a Context,
) -> BoxFuture<'a, Result<(), BotError>> {
    c.confirm_hide_all(ctx).boxed()
}

fn prompt_category<'a>(
    c: &'a InteractionController,
    ctx: &'a Context,
) -> BoxFuture<'a, Result<(), BotError>> {
    c.prompt_category(ctx).boxed()
}

fn clear_state<'a>(
    c: &'a InteractionController,
    ctx: &'a Context,
) -> BoxFuture<'a, Result<(), BotError>> {
    c.clear_state(ctx).boxed()
}

fn back<'a>(
    c: &'a InteractionController,
    ctx: &'a Context,
) -> BoxFuture<'a, Result<(), BotError>> {
    c.back(ctx).boxed()
}

/// Reports skipped lots into the operator's chat.
struct ChatDiagnostics<'a> {
    transport: &'a dyn ChatTransport,
    chat: ChatId,
}

#[async_trait]
impl LotDiagnostics for ChatDiagnostics<'_> {
    async fn lot_unavailable(&self, lot_id: LotId, lot_url: &str) {
        let message = messages::lot_unavailable(lot_id, lot_url);
        if let Err(e) = self.transport.send_message(self.chat, message).await {
            warn!(lot_id, error = %e, "Failed to report unavailable lot");
        }
    }
}
