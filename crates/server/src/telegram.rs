//! Telegram Bot API transport and webhook update types.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use lotsweep_core::config::TelegramConfig;
use lotsweep_core::interaction::{
    BotCommand, CallbackId, ChatId, ChatTransport, Incoming, InlineKeyboard, MessageId,
    OutgoingMessage, TransportError, UserId,
};

/// Request timeout for Bot API calls.
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// `ChatTransport` over the Telegram Bot API.
pub struct TelegramTransport {
    client: reqwest::Client,
    /// `<api_url>/bot<token>`
    endpoint: String,
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

impl TelegramTransport {
    pub fn new(config: &TelegramConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: Value,
    ) -> Result<T, TransportError> {
        debug!(method, "Calling Bot API");
        let response = self
            .client
            .post(format!("{}/{}", self.endpoint, method))
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.without_url().to_string()))?;

        let status = response.status();
        let parsed: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TransportError::ParseError(e.without_url().to_string()))?;

        if !parsed.ok {
            return Err(TransportError::ApiError(format!(
                "{} failed with HTTP {}: {}",
                method,
                status.as_u16(),
                parsed.description.unwrap_or_default()
            )));
        }
        parsed
            .result
            .ok_or_else(|| TransportError::ParseError(format!("{} returned no result", method)))
    }

    /// Point Telegram at the webhook, optionally with a shared secret.
    pub async fn set_webhook(
        &self,
        url: &str,
        secret: Option<&str>,
    ) -> Result<(), TransportError> {
        let mut body = json!({
            "url": url,
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(secret) = secret {
            body["secret_token"] = json!(secret);
        }
        self.call::<bool>("setWebhook", body).await.map(|_| ())
    }
}

fn reply_markup(keyboard: &InlineKeyboard) -> Value {
    let rows: Vec<Vec<Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| json!({ "text": b.text, "callback_data": b.callback }))
                .collect()
        })
        .collect();
    json!({ "inline_keyboard": rows })
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(
        &self,
        chat: ChatId,
        message: OutgoingMessage,
    ) -> Result<MessageId, TransportError> {
        let mut body = json!({
            "chat_id": chat.0,
            "text": message.text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(keyboard) = &message.keyboard {
            body["reply_markup"] = reply_markup(keyboard);
        }
        let sent: SentMessage = self.call("sendMessage", body).await?;
        Ok(MessageId(sent.message_id))
    }

    async fn answer_callback(
        &self,
        callback: &CallbackId,
        text: Option<&str>,
    ) -> Result<(), TransportError> {
        let mut body = json!({ "callback_query_id": callback.0 });
        if let Some(text) = text {
            body["text"] = json!(text);
        }
        self.call::<bool>("answerCallbackQuery", body).await.map(|_| ())
    }

    async fn clear_keyboard(
        &self,
        chat: ChatId,
        message: MessageId,
    ) -> Result<(), TransportError> {
        // Result is the edited message, or `true` for inline messages.
        self.call::<Value>(
            "editMessageReplyMarkup",
            json!({ "chat_id": chat.0, "message_id": message.0 }),
        )
        .await
        .map(|_| ())
    }

    async fn register_commands(&self, commands: &[BotCommand]) -> Result<(), TransportError> {
        self.call::<bool>("setMyCommands", json!({ "commands": commands }))
            .await
            .map(|_| ())
    }
}

// =============================================================================
// Webhook updates
// =============================================================================

/// The subset of a Telegram `Update` the bot reacts to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TgMessage>,
    #[serde(default)]
    pub callback_query: Option<TgCallbackQuery>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub chat: TgChat,
    #[serde(default)]
    pub from: Option<TgUser>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TgChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TgUser {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TgCallbackQuery {
    pub id: String,
    pub from: TgUser,
    #[serde(default)]
    pub message: Option<TgMessage>,
    #[serde(default)]
    pub data: Option<String>,
}

impl Update {
    /// Convert to a controller event. Updates without text or callback
    /// data, or without a sender, yield `None`.
    pub fn into_incoming(self) -> Option<Incoming> {
        if let Some(query) = self.callback_query {
            let (chat, message) = match &query.message {
                Some(m) => (ChatId(m.chat.id), Some(MessageId(m.message_id))),
                None => (ChatId(query.from.id), None),
            };
            return Some(Incoming::Callback {
                id: CallbackId(query.id),
                chat,
                user: UserId(query.from.id),
                message,
                data: query.data?,
            });
        }

        let message = self.message?;
        Some(Incoming::Message {
            chat: ChatId(message.chat.id),
            user: UserId(message.from?.id),
            text: message.text?,
        })
    }
}
