//! Marketplace account backed by the marketplace website.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::MarketplaceConfig;

use super::parse::{parse_lot_form, parse_profile_lots};
use super::{
    FormMethod, FormRequest, FormResponse, LotId, LotSummary, MarketplaceAccount,
    MarketplaceError, RawFields,
};

/// Seller session authenticated by the `golden_key` cookie.
///
/// Session cookies handed out by the marketplace (and tied to the form CSRF
/// token) are kept in the cookie jar between requests.
pub struct HttpMarketplaceAccount {
    client: Client,
    config: MarketplaceConfig,
}

impl HttpMarketplaceAccount {
    pub fn new(config: MarketplaceConfig) -> Result<Self, MarketplaceError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| MarketplaceError::Configuration(format!("base_url: {}", e)))?;

        let jar = Jar::default();
        jar.add_cookie_str(&format!("golden_key={}", config.golden_key), &base);
        jar.add_cookie_str("cookie_prefs=1", &base);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(config.user_agent.clone())
            .cookie_provider(Arc::new(jar))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url(),
            path.trim_start_matches('/')
        )
    }

    /// GET a page and return its body, failing on non-2xx.
    async fn get_page(&self, path: &str) -> Result<String, MarketplaceError> {
        let url = self.url(path);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(MarketplaceError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, MarketplaceError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| MarketplaceError::Configuration(format!("header {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| MarketplaceError::Configuration(format!("header {}: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl MarketplaceAccount for HttpMarketplaceAccount {
    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    async fn list_lots(&self) -> Result<Vec<LotSummary>, MarketplaceError> {
        let html = self
            .get_page(&format!("users/{}/", self.config.seller_id))
            .await?;
        let lots = parse_profile_lots(&html);
        debug!(
            seller_id = self.config.seller_id,
            count = lots.len(),
            "Parsed seller profile lots"
        );
        Ok(lots)
    }

    async fn fetch_lot_fields(&self, lot_id: LotId) -> Result<RawFields, MarketplaceError> {
        let html = self
            .get_page(&format!("lots/offerEdit?offer={}", lot_id))
            .await?;
        parse_lot_form(&html)
    }

    async fn submit_form(&self, request: FormRequest) -> Result<FormResponse, MarketplaceError> {
        let url = self.url(&request.path);

        let mut builder = match request.method {
            FormMethod::Get => self.client.get(&url).query(&request.fields),
            FormMethod::Post => self.client.post(&url).form(&request.fields),
        };
        // `headers` replaces what `.form()` set, so the caller's
        // content-type is the only one sent
        builder = builder.headers(header_map(&request.headers)?);

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(MarketplaceError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        Ok(FormResponse {
            status: status.as_u16(),
            body,
        })
    }
}
