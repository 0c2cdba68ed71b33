//! Store contract and shared read-model rows.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use stockpilot_core::{NewAuditedQuery, Order, OrderUpsert, Product, ProductUpsert};

/// Store failure.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
}

/// Per-product sales totals, grouped over order items with a resolved
/// product reference (items pointing at no local product are excluded).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSellerRow {
    pub product_id: i64,
    pub title: String,
    pub total_quantity_sold: i64,
    pub total_revenue: Decimal,
}

/// Order sum and count for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DaySales {
    pub total: Decimal,
    pub count: i64,
}

/// Local store contract.
///
/// ## Atomicity
///
/// The two `apply_*_batch` operations are all-or-nothing per call: either
/// every upsert in the batch is committed or none are. Concurrent batches
/// must not observe each other's partial writes.
///
/// ## Determinism
///
/// Every ranked read applies a deterministic secondary key (`id` ascending,
/// or `id` descending for recent orders), so an unchanged data set yields
/// the same row order on every call.
#[async_trait]
pub trait CommerceStore: Send + Sync {
    /// Upsert a page of products keyed by `shopify_id`.
    ///
    /// Only the synced columns are written; merchant-curated fields
    /// (`expiry_date`, `is_on_sale`, `discount_percent`) are preserved on
    /// existing rows and defaulted on insert.
    async fn apply_product_batch(&self, batch: Vec<ProductUpsert>) -> Result<(), StoreError>;

    /// Upsert a page of orders (keyed by `shopify_id`) and their line items
    /// (keyed by `(order, shopify_line_item_id)`), resolving each item's
    /// remote product reference to a local row inside the same transaction.
    async fn apply_order_batch(&self, batch: Vec<OrderUpsert>) -> Result<(), StoreError>;

    /// Append one audit record; returns its assigned id.
    async fn record_query(&self, query: NewAuditedQuery) -> Result<i64, StoreError>;

    async fn product_count(&self) -> Result<i64, StoreError>;

    async fn order_count(&self) -> Result<i64, StoreError>;

    /// All-time sum of order totals.
    async fn revenue_total(&self) -> Result<Decimal, StoreError>;

    /// Sum and count of orders whose `ordered_at` falls on `date`
    /// (UTC calendar date). Orders without a timestamp never match.
    async fn sales_on(&self, date: NaiveDate) -> Result<DaySales, StoreError>;

    /// Top products by summed item quantity, descending; ties by product id
    /// ascending. Products never sold do not appear.
    async fn best_sellers(&self, limit: i64) -> Result<Vec<BestSellerRow>, StoreError>;

    /// Products with inventory strictly below `threshold`, ascending by
    /// inventory.
    async fn low_stock(&self, threshold: i64, limit: i64) -> Result<Vec<Product>, StoreError>;

    /// Products whose expiry date is set and within `[from, to]` inclusive,
    /// ascending by expiry date.
    async fn near_expiry(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Product>, StoreError>;

    /// Products flagged on sale, descending by discount percentage.
    async fn on_sale(&self, limit: i64) -> Result<Vec<Product>, StoreError>;

    /// Orders by `ordered_at` descending; orders without a timestamp sort
    /// last.
    async fn recent_orders(&self, limit: i64) -> Result<Vec<Order>, StoreError>;
}

#[async_trait]
impl<T> CommerceStore for Arc<T>
where
    T: CommerceStore + ?Sized,
{
    async fn apply_product_batch(&self, batch: Vec<ProductUpsert>) -> Result<(), StoreError> {
        (**self).apply_product_batch(batch).await
    }

    async fn apply_order_batch(&self, batch: Vec<OrderUpsert>) -> Result<(), StoreError> {
        (**self).apply_order_batch(batch).await
    }

    async fn record_query(&self, query: NewAuditedQuery) -> Result<i64, StoreError> {
        (**self).record_query(query).await
    }

    async fn product_count(&self) -> Result<i64, StoreError> {
        (**self).product_count().await
    }

    async fn order_count(&self) -> Result<i64, StoreError> {
        (**self).order_count().await
    }

    async fn revenue_total(&self) -> Result<Decimal, StoreError> {
        (**self).revenue_total().await
    }

    async fn sales_on(&self, date: NaiveDate) -> Result<DaySales, StoreError> {
        (**self).sales_on(date).await
    }

    async fn best_sellers(&self, limit: i64) -> Result<Vec<BestSellerRow>, StoreError> {
        (**self).best_sellers(limit).await
    }

    async fn low_stock(&self, threshold: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        (**self).low_stock(threshold, limit).await
    }

    async fn near_expiry(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Product>, StoreError> {
        (**self).near_expiry(from, to, limit).await
    }

    async fn on_sale(&self, limit: i64) -> Result<Vec<Product>, StoreError> {
        (**self).on_sale(limit).await
    }

    async fn recent_orders(&self, limit: i64) -> Result<Vec<Order>, StoreError> {
        (**self).recent_orders(limit).await
    }
}
