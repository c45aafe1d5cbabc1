use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub marketplace: MarketplaceConfig,
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Webhook authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Shared secret Telegram echoes in `X-Telegram-Bot-Api-Secret-Token`
    /// (required when method = "secret_token").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    SecretToken,
}

/// Marketplace account configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketplaceConfig {
    /// Marketplace base URL (e.g., "https://funpay.com")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Session cookie of the seller account
    pub golden_key: String,
    /// Numeric id of the seller profile whose lots are managed
    pub seller_id: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_base_url() -> String {
    "https://funpay.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
        .to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    /// Public URL of the webhook endpoint. When set, the webhook is
    /// registered with Telegram on startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Telegram user ids allowed to operate the bot.
    #[serde(default)]
    pub authorized_users: Vec<i64>,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Lot pipeline pacing and retry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Retry budget for fetching a lot's fields.
    #[serde(default)]
    pub fetch: RetryConfig,
    /// Retry budget for the hide mutation.
    #[serde(default)]
    pub hide: RetryConfig,
    /// Pause after giving up on a lot, in milliseconds.
    #[serde(default = "default_skip_pause")]
    pub skip_pause_ms: u64,
    /// Pause after each successfully fetched lot, in milliseconds.
    #[serde(default = "default_throttle")]
    pub throttle_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch: RetryConfig::default(),
            hide: RetryConfig::default(),
            skip_pause_ms: default_skip_pause(),
            throttle_ms: default_throttle(),
        }
    }
}

/// Fixed-delay retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Maximum attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay between failed attempts in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub delay_ms: u64,
    /// Also wait `delay_ms` after the final failed attempt.
    #[serde(default)]
    pub delay_after_last: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_retry_delay(),
            delay_after_last: false,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2000
}

fn default_skip_pause() -> u64 {
    1000
}

fn default_throttle() -> u64 {
    500
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub marketplace: SanitizedMarketplaceConfig,
    pub telegram: SanitizedTelegramConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    pub secret_token_configured: bool,
}

/// Sanitized marketplace config (session cookie hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMarketplaceConfig {
    pub base_url: String,
    pub seller_id: u64,
    pub golden_key_configured: bool,
    pub timeout_secs: u32,
}

/// Sanitized Telegram config (bot token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTelegramConfig {
    pub api_url: String,
    pub bot_token_configured: bool,
    pub webhook_url: Option<String>,
    pub authorized_users: usize,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::SecretToken => "secret_token".to_string(),
                },
                secret_token_configured: config
                    .auth
                    .secret_token
                    .as_ref()
                    .is_some_and(|t| !t.is_empty()),
            },
            server: config.server.clone(),
            marketplace: SanitizedMarketplaceConfig {
                base_url: config.marketplace.base_url.clone(),
                seller_id: config.marketplace.seller_id,
                golden_key_configured: !config.marketplace.golden_key.is_empty(),
                timeout_secs: config.marketplace.timeout_secs,
            },
            telegram: SanitizedTelegramConfig {
                api_url: config.telegram.api_url.clone(),
                bot_token_configured: !config.telegram.bot_token.is_empty(),
                webhook_url: config.telegram.webhook_url.clone(),
                authorized_users: config.telegram.authorized_users.len(),
            },
            pipeline: config.pipeline.clone(),
        }
    }
}
