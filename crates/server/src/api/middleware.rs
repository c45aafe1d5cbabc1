//! Authentication and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;
use lotsweep_core::{AuthError, AuthRequest, Identity};

use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Peer address recorded by `into_make_service_with_connect_info`, or
/// localhost when the router is served without connection info.
fn source_ip(request: &Request<Body>) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Webhook authentication middleware.
///
/// Validates the Telegram secret token header with the configured
/// authenticator and stores the resulting `Identity` in the request
/// extensions. Failed checks return 401 Unauthorized.
pub async fn webhook_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let authenticator = state.authenticator();

    // Skip auth check if using NoneAuthenticator, but still insert anonymous identity
    if authenticator.method_name() == "none" {
        let mut request = request;
        request.extensions_mut().insert(Identity::anonymous());
        return Ok(next.run(request).await);
    }

    // Extract headers into HashMap for AuthRequest
    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    let source_ip = source_ip(&request);
    let auth_request = AuthRequest { headers, source_ip };

    match authenticator.authenticate(&auth_request).await {
        Ok(identity) => {
            let mut request = request;
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(AuthError::NotAuthenticated) => {
            // No secret header
            AUTH_FAILURES_TOTAL.with_label_values(&["not_authenticated"]).inc();
            tracing::warn!(ip = %source_ip, "Webhook call without secret token");
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(AuthError::InvalidCredentials(_)) => {
            // Wrong secret
            AUTH_FAILURES_TOTAL.with_label_values(&["invalid_credentials"]).inc();
            tracing::warn!(ip = %source_ip, "Webhook call with invalid secret token");
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(e) => {
            AUTH_FAILURES_TOTAL.with_label_values(&["internal_error"]).inc();
            tracing::error!("Webhook authentication failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::Request,
        middleware,
        routing::post,
        Extension, Router,
    };
    use http_body_util::BodyExt;
    use lotsweep_core::{
        create_authenticator, load_config_from_str, AuthMethod, Authenticator, Config,
        SECRET_TOKEN_HEADER,
    };
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use crate::dispatcher::UpdateQueue;

    async fn caller_handler(Extension(identity): Extension<Identity>) -> String {
        identity.caller
    }

    fn create_test_config(method: AuthMethod) -> Config {
        let auth = match method {
            AuthMethod::None => "method = \"none\"".to_string(),
            AuthMethod::SecretToken => {
                "method = \"secret_token\"\nsecret_token = \"s3cret\"".to_string()
            }
        };
        load_config_from_str(&format!(
            r#"
[auth]
{}

[marketplace]
golden_key = "gk"
seller_id = 1

[telegram]
bot_token = "1:x"
"#,
            auth
        ))
        .unwrap()
    }

    fn create_test_app(method: AuthMethod) -> Router {
        let config = create_test_config(method);
        let authenticator: Arc<dyn Authenticator> =
            Arc::from(create_authenticator(&config.auth).unwrap());
        let (tx, _rx) = mpsc::channel(1);
        let state = Arc::new(AppState::new(config, authenticator, UpdateQueue::new(tx)));

        Router::new()
            .route("/hook", post(caller_handler))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                webhook_auth_middleware,
            ))
            .with_state(state)
    }

    fn hook_request(secret: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/hook");
        if let Some(secret) = secret {
            builder = builder.header(SECRET_TOKEN_HEADER, secret);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_source_ip_from_connect_info() {
        let peer: SocketAddr = "203.0.113.7:45000".parse().unwrap();
        let mut request = hook_request(None);
        request.extensions_mut().insert(ConnectInfo(peer));

        assert_eq!(source_ip(&request), peer.ip());
        assert_eq!(
            source_ip(&hook_request(None)),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
    }

    #[tokio::test]
    async fn test_none_auth_allows_all() {
        let app = create_test_app(AuthMethod::None);

        let response = app.oneshot(hook_request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), "anonymous");
    }

    #[tokio::test]
    async fn test_secret_token_valid() {
        let app = create_test_app(AuthMethod::SecretToken);

        let response = app.oneshot(hook_request(Some("s3cret"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), "telegram");
    }

    #[tokio::test]
    async fn test_secret_token_invalid() {
        let app = create_test_app(AuthMethod::SecretToken);

        let response = app.oneshot(hook_request(Some("wrong"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_secret_token_missing() {
        let app = create_test_app(AuthMethod::SecretToken);

        let response = app.oneshot(hook_request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
