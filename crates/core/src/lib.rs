pub mod auth;
pub mod config;
pub mod interaction;
pub mod lots;
pub mod marketplace;
pub mod metrics;
pub mod testing;

pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, Identity, NoneAuthenticator,
    SecretTokenAuthenticator, SECRET_TOKEN_HEADER,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig,
};
pub use interaction::{
    BotError, ChatTransport, ConversationStore, InMemoryConversationStore, Incoming,
    InteractionController, TransportError,
};
pub use lots::{
    CategoryFilter, HidePipeline, LotCollector, LotHider, LotRecord, OperationResult, PartialRun,
    PipelineError, RetryPolicy, Sleeper, TokioSleeper,
};
pub use marketplace::{HttpMarketplaceAccount, MarketplaceAccount, MarketplaceError};
