use super::{
    types::{AuthMethod, Config, RetryConfig},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Secrets required by the chosen methods are present
/// - Base URLs carry an http(s) scheme
/// - Retry budgets allow at least one attempt
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::SecretToken
        && config.auth.secret_token.as_deref().unwrap_or("").is_empty()
    {
        return Err(ConfigError::ValidationError(
            "auth.secret_token must be set when method = \"secret_token\"".to_string(),
        ));
    }

    if config.marketplace.golden_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "marketplace.golden_key cannot be empty".to_string(),
        ));
    }

    if config.telegram.bot_token.is_empty() {
        return Err(ConfigError::ValidationError(
            "telegram.bot_token cannot be empty".to_string(),
        ));
    }

    check_url("marketplace.base_url", &config.marketplace.base_url)?;
    check_url("telegram.api_url", &config.telegram.api_url)?;
    if let Some(url) = &config.telegram.webhook_url {
        check_url("telegram.webhook_url", url)?;
    }

    check_retry("pipeline.fetch", &config.pipeline.fetch)?;
    check_retry("pipeline.hide", &config.pipeline.hide)?;

    Ok(())
}

fn check_url(key: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{} must start with http:// or https://, got {:?}",
            key, url
        )))
    }
}

fn check_retry(key: &str, retry: &RetryConfig) -> Result<(), ConfigError> {
    if retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{}.max_attempts must be at least 1",
            key
        )));
    }
    Ok(())
}
