//! Telegram webhook secret token authentication.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Header Telegram sets on webhook calls when a secret token was registered.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Authenticator that validates the webhook secret token header.
pub struct SecretTokenAuthenticator {
    expected_token: String,
}

impl SecretTokenAuthenticator {
    pub fn new(token: String) -> Self {
        Self {
            expected_token: token,
        }
    }
}

#[async_trait]
impl Authenticator for SecretTokenAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let provided = request
            .header(SECRET_TOKEN_HEADER)
            .ok_or(AuthError::NotAuthenticated)?;

        if constant_time_eq(provided.as_bytes(), self.expected_token.as_bytes()) {
            Ok(Identity::telegram())
        } else {
            Err(AuthError::InvalidCredentials(
                "Invalid webhook secret token".to_string(),
            ))
        }
    }

    fn method_name(&self) -> &'static str {
        "secret_token"
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn make_request(headers: Vec<(&str, &str)>) -> AuthRequest {
        AuthRequest {
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
            source_ip: "149.154.167.220".parse::<IpAddr>().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_valid_token() {
        let auth = SecretTokenAuthenticator::new("hook-secret".to_string());
        let request = make_request(vec![("X-Telegram-Bot-Api-Secret-Token", "hook-secret")]);

        let identity = auth.authenticate(&request).await.unwrap();

        assert_eq!(identity, Identity::telegram());
    }

    #[tokio::test]
    async fn test_wrong_token() {
        let auth = SecretTokenAuthenticator::new("hook-secret".to_string());
        let request = make_request(vec![("X-Telegram-Bot-Api-Secret-Token", "guess")]);

        let result = auth.authenticate(&request).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn test_missing_header() {
        let auth = SecretTokenAuthenticator::new("hook-secret".to_string());

        let result = auth.authenticate(&make_request(vec![])).await;

        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
        assert!(constant_time_eq(b"", b""));
    }
}
