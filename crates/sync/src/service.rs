//! Page reconciliation of remote records into the local store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use stockpilot_core::{OrderItemUpsert, OrderUpsert, ProductUpsert};
use stockpilot_shopify::{CatalogClient, CatalogError, LineItemRecord, OrderRecord, ProductRecord};
use stockpilot_store::{CommerceStore, StoreError};

/// Order status filter passed to the remote catalog.
const ORDER_STATUS_FILTER: &str = "any";

/// Reconciliation failure.
///
/// A failed call commits nothing: a remote or validation failure happens
/// before the store is touched, and a store failure rolls the batch back.
/// Prior successful calls are unaffected.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote fetch failed: {0}")]
    Remote(#[from] CatalogError),
    #[error("invalid remote record: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SyncError {
    fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Pull-based reconciliation over a catalog client / store pair.
///
/// One page of up to `page_limit` records per call; the remote source is
/// authoritative and records are only ever created or updated, never
/// deleted.
pub struct SyncService<C, S> {
    client: C,
    store: S,
    page_limit: usize,
}

impl<C, S> SyncService<C, S>
where
    C: CatalogClient,
    S: CommerceStore,
{
    pub fn new(client: C, store: S, page_limit: usize) -> Self {
        Self {
            client,
            store,
            page_limit,
        }
    }

    /// Reconcile one page of remote products.
    ///
    /// Returns the number of records fetched in this page, not the number
    /// that actually changed.
    pub async fn sync_products(&self) -> Result<usize, SyncError> {
        let records = self.client.fetch_products(self.page_limit).await?;
        let fetched = records.len();

        let batch = records
            .into_iter()
            .map(map_product)
            .collect::<Result<Vec<_>, _>>()?;
        self.store.apply_product_batch(batch).await?;

        tracing::info!(fetched, "product page reconciled");
        Ok(fetched)
    }

    /// Reconcile one page of remote orders together with their line items.
    pub async fn sync_orders(&self) -> Result<usize, SyncError> {
        let records = self
            .client
            .fetch_orders(self.page_limit, ORDER_STATUS_FILTER)
            .await?;
        let fetched = records.len();

        let batch = records
            .into_iter()
            .map(map_order)
            .collect::<Result<Vec<_>, _>>()?;
        self.store.apply_order_batch(batch).await?;

        tracing::info!(fetched, "order page reconciled");
        Ok(fetched)
    }
}

fn map_product(record: ProductRecord) -> Result<ProductUpsert, SyncError> {
    let shopify_id = record
        .id
        .ok_or_else(|| SyncError::validation("product record is missing id"))?;

    // Inventory comes from the first variant when present.
    let total_inventory = record
        .variants
        .first()
        .and_then(|v| v.inventory_quantity)
        .unwrap_or(0);

    Ok(ProductUpsert {
        shopify_id,
        title: record.title.unwrap_or_default(),
        body_html: record.body_html.unwrap_or_default(),
        handle: record.handle,
        status: record.status.unwrap_or_else(|| "active".to_string()),
        total_inventory,
        image: record.image.and_then(|i| i.src),
    })
}

fn map_order(record: OrderRecord) -> Result<OrderUpsert, SyncError> {
    let shopify_id = record
        .id
        .ok_or_else(|| SyncError::validation("order record is missing id"))?;

    let ordered_at = record
        .created_at
        .as_deref()
        .map(|raw| parse_timestamp(raw, shopify_id))
        .transpose()?;

    let total_price = record.total_price.unwrap_or(Decimal::ZERO);
    if total_price < Decimal::ZERO {
        return Err(SyncError::validation(format!(
            "order {shopify_id}: negative total_price {total_price}"
        )));
    }

    let items = record
        .line_items
        .into_iter()
        .map(|item| map_line_item(item, shopify_id))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OrderUpsert {
        shopify_id,
        name: record.name.unwrap_or_default(),
        financial_status: record.financial_status,
        fulfillment_status: record.fulfillment_status,
        total_price,
        currency: record.currency.unwrap_or_else(|| "AUD".to_string()),
        ordered_at,
        items,
    })
}

fn map_line_item(record: LineItemRecord, order_id: i64) -> Result<OrderItemUpsert, SyncError> {
    // The composite upsert key needs the remote line-item id; without it
    // the row cannot be addressed on a later sync.
    let shopify_line_item_id = record
        .id
        .ok_or_else(|| SyncError::validation(format!("order {order_id}: line item is missing id")))?;

    let quantity = record.quantity.unwrap_or(0);
    if quantity < 0 {
        return Err(SyncError::validation(format!(
            "order {order_id}: line item {shopify_line_item_id} has negative quantity {quantity}"
        )));
    }

    let price = record.price.unwrap_or(Decimal::ZERO);
    if price < Decimal::ZERO {
        return Err(SyncError::validation(format!(
            "order {order_id}: line item {shopify_line_item_id} has negative price {price}"
        )));
    }

    Ok(OrderItemUpsert {
        shopify_line_item_id,
        shopify_product_id: record.product_id,
        quantity,
        price,
        // Never trusted from upstream.
        total_price: Decimal::from(quantity) * price,
    })
}

fn parse_timestamp(raw: &str, order_id: i64) -> Result<DateTime<Utc>, SyncError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| SyncError::validation(format!("order {order_id}: bad created_at {raw:?}: {e}")))
}
