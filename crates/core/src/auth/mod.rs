//! Webhook authentication.
//!
//! Telegram can echo a shared secret in the `X-Telegram-Bot-Api-Secret-Token`
//! header of every webhook call; the authenticators here decide whether an
//! incoming update is accepted.

mod none;
mod secret_token;
mod traits;
mod types;

pub use none::*;
pub use secret_token::*;
pub use traits::*;
pub use types::*;

use crate::config::AuthConfig;

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    use crate::config::AuthMethod;

    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator::new())),
        AuthMethod::SecretToken => {
            let token = config
                .secret_token
                .clone()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    AuthError::ConfigurationError(
                        "secret_token must be set when using SecretToken auth method".to_string(),
                    )
                })?;
            Ok(Box::new(SecretTokenAuthenticator::new(token)))
        }
    }
}
