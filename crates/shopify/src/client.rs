//! Catalog client trait and the Shopify Admin REST implementation.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use stockpilot_core::ShopifyConfig;

use crate::records::{OrderRecord, ProductRecord};

/// Remote catalog fetch failure.
///
/// No retry, timeout, or backoff policy lives here; whatever the transport
/// reports is surfaced as-is.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("shopify is not configured: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("shopify API error ({0}): {1}")]
    Api(u16, String),
    #[error("response decode error: {0}")]
    Decode(String),
}

/// Bounded page fetches against the remote catalog.
///
/// Implementations return at most `limit` records per call; pagination
/// beyond one page is deliberately not part of this contract.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch_products(&self, limit: usize) -> Result<Vec<ProductRecord>, CatalogError>;

    async fn fetch_orders(
        &self,
        limit: usize,
        status: &str,
    ) -> Result<Vec<OrderRecord>, CatalogError>;
}

/// Shopify Admin REST API client.
pub struct RestCatalogClient {
    config: ShopifyConfig,
    http: reqwest::Client,
}

impl RestCatalogClient {
    pub fn new(config: ShopifyConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Credentials are checked per call so a misconfigured process fails at
    /// the first sync attempt instead of at startup.
    fn base_url(&self) -> Result<(String, &str), CatalogError> {
        let domain = self
            .config
            .shop_domain
            .as_deref()
            .ok_or_else(|| CatalogError::Config("SHOPIFY_SHOP_DOMAIN is not set".to_string()))?;
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or_else(|| CatalogError::Config("SHOPIFY_ACCESS_TOKEN is not set".to_string()))?;
        Ok((
            format!("https://{domain}/admin/api/{}", self.config.api_version),
            token,
        ))
    }

    async fn get_json(&self, url: &str, token: &str) -> Result<String, CatalogError> {
        let resp = self
            .http
            .get(url)
            .header("X-Shopify-Access-Token", token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(CatalogError::Api(status.as_u16(), body));
        }
        Ok(body)
    }
}

#[async_trait]
impl CatalogClient for RestCatalogClient {
    async fn fetch_products(&self, limit: usize) -> Result<Vec<ProductRecord>, CatalogError> {
        let (base, token) = self.base_url()?;
        let url = format!("{base}/products.json?limit={limit}");
        let body = self.get_json(&url, token).await?;
        let records = decode_products(&body)?;
        tracing::debug!(count = records.len(), "fetched product page");
        Ok(records)
    }

    async fn fetch_orders(
        &self,
        limit: usize,
        status: &str,
    ) -> Result<Vec<OrderRecord>, CatalogError> {
        let (base, token) = self.base_url()?;
        let url = format!("{base}/orders.json?limit={limit}&status={status}");
        let body = self.get_json(&url, token).await?;
        let records = decode_orders(&body)?;
        tracing::debug!(count = records.len(), "fetched order page");
        Ok(records)
    }
}

#[derive(Deserialize)]
struct ProductsEnvelope {
    #[serde(default)]
    products: Vec<ProductRecord>,
}

#[derive(Deserialize)]
struct OrdersEnvelope {
    #[serde(default)]
    orders: Vec<OrderRecord>,
}

fn decode_products(body: &str) -> Result<Vec<ProductRecord>, CatalogError> {
    serde_json::from_str::<ProductsEnvelope>(body)
        .map(|e| e.products)
        .map_err(|e| CatalogError::Decode(e.to_string()))
}

fn decode_orders(body: &str) -> Result<Vec<OrderRecord>, CatalogError> {
    serde_json::from_str::<OrdersEnvelope>(body)
        .map(|e| e.orders)
        .map_err(|e| CatalogError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_products_unwraps_envelope() {
        let body = r#"{"products": [{"id": 1, "title": "Lip Gloss"}, {"id": 2}]}"#;
        let records = decode_products(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title.as_deref(), Some("Lip Gloss"));
    }

    #[test]
    fn decode_products_defaults_missing_list() {
        let records = decode_products("{}").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn decode_orders_rejects_malformed_body() {
        let err = decode_orders("not json").unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[tokio::test]
    async fn missing_credentials_fail_the_operation() {
        let client = RestCatalogClient::new(ShopifyConfig {
            shop_domain: None,
            access_token: None,
            api_version: "2025-01".to_string(),
        });

        let err = client.fetch_products(100).await.unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }
}
