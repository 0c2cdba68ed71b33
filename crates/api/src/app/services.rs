//! Service wiring: store, outbound clients, and the domain services the
//! handlers call.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use stockpilot_ai::{OpenAiChatClient, StockAnalyst};
use stockpilot_core::AppConfig;
use stockpilot_insights::InsightsService;
use stockpilot_shopify::RestCatalogClient;
use stockpilot_store::PgStore;
use stockpilot_sync::SyncService;

/// Everything the HTTP handlers need, wired once at startup.
pub struct AppServices {
    pub sync: SyncService<RestCatalogClient, Arc<PgStore>>,
    pub insights: InsightsService<Arc<PgStore>>,
    pub analyst: StockAnalyst<Arc<PgStore>, OpenAiChatClient>,
    pub author: String,
}

/// Connect the store, apply migrations, and wire the services.
///
/// Missing external credentials (Shopify token, AI key) do not fail here;
/// they surface on the first operation that needs them. Only the local
/// store is required at startup.
pub async fn build_services(config: AppConfig) -> anyhow::Result<AppServices> {
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL is not set")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to the database")?;
    PgStore::migrate(&pool)
        .await
        .context("failed to apply migrations")?;
    let store = Arc::new(PgStore::new(pool));

    let catalog = RestCatalogClient::new(config.shopify.clone());
    let completion = OpenAiChatClient::new(config.ai.clone());

    Ok(AppServices {
        sync: SyncService::new(catalog, store.clone(), config.sync_page_limit),
        insights: InsightsService::new(store.clone()),
        analyst: StockAnalyst::new(store, completion, config.author.clone()),
        author: config.author,
    })
}
