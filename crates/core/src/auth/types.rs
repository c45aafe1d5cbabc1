use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Request information for authentication
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

impl AuthRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Authenticated caller of the webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub caller: String,
    pub method: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            caller: "anonymous".to_string(),
            method: "none".to_string(),
        }
    }

    pub fn telegram() -> Self {
        Self {
            caller: "telegram".to_string(),
            method: "secret_token".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_identity() {
        let identity = Identity::anonymous();
        assert_eq!(identity.caller, "anonymous");
        assert_eq!(identity.method, "none");
    }

    #[test]
    fn test_header_lookup() {
        let request = AuthRequest {
            headers: HashMap::from([("x-token".to_string(), "abc".to_string())]),
            source_ip: "127.0.0.1".parse().unwrap(),
        };
        assert_eq!(request.header("x-token"), Some("abc"));
        assert_eq!(request.header("x-other"), None);
    }
}
