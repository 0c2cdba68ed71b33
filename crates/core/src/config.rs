//! Process configuration.
//!
//! Built once from the environment in `main` and threaded into
//! constructors; nothing in the service layers reads the environment.
//! Credentials stay optional so that a missing credential fails the first
//! operation that needs it rather than process startup.

use std::env;

pub const DEFAULT_SHOPIFY_API_VERSION: &str = "2025-01";
pub const DEFAULT_AI_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_SYNC_PAGE_LIMIT: usize = 100;
pub const DEFAULT_AUTHOR: &str = "stockpilot";

/// Shopify Admin API connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopifyConfig {
    pub shop_domain: Option<String>,
    pub access_token: Option<String>,
    pub api_version: String,
}

impl ShopifyConfig {
    pub fn from_env() -> Self {
        Self {
            shop_domain: env::var("SHOPIFY_SHOP_DOMAIN").ok(),
            access_token: env::var("SHOPIFY_ACCESS_TOKEN").ok(),
            api_version: env::var("SHOPIFY_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_SHOPIFY_API_VERSION.to_string()),
        }
    }
}

/// Chat-completion endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl AiConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("AI_API_KEY").ok(),
            model: env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
            base_url: env::var("AI_BASE_URL").unwrap_or_else(|_| DEFAULT_AI_BASE_URL.to_string()),
        }
    }
}

/// Top-level process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub shopify: ShopifyConfig,
    pub ai: AiConfig,
    pub database_url: Option<String>,
    pub sync_page_limit: usize,
    /// Label stamped into audit metadata and the dashboard payload.
    pub author: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            shopify: ShopifyConfig::from_env(),
            ai: AiConfig::from_env(),
            database_url: env::var("DATABASE_URL").ok(),
            sync_page_limit: env::var("SYNC_PAGE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SYNC_PAGE_LIMIT),
            author: env::var("APP_AUTHOR").unwrap_or_else(|_| DEFAULT_AUTHOR.to_string()),
        }
    }
}
