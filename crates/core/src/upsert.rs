//! Upsert inputs produced by reconciliation.
//!
//! These are the already-validated, already-defaulted shapes a store
//! applies as one atomic batch. Anything optional here is genuinely
//! optional in the local schema; defaulting of absent remote fields happens
//! before these are constructed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Upsert for one product, keyed by `shopify_id`.
///
/// Deliberately omits the merchant-curated fields (`expiry_date`,
/// `is_on_sale`, `discount_percent`): applying a batch must preserve those
/// on existing rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpsert {
    pub shopify_id: i64,
    pub title: String,
    pub body_html: String,
    pub handle: Option<String>,
    pub status: String,
    pub total_inventory: i64,
    pub image: Option<String>,
}

/// Upsert for one order and its line items, keyed by `shopify_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderUpsert {
    pub shopify_id: i64,
    pub name: String,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub total_price: Decimal,
    pub currency: String,
    pub ordered_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItemUpsert>,
}

/// Upsert for one line item, keyed by `(order, shopify_line_item_id)`.
///
/// `shopify_product_id` is resolved to a local product row inside the
/// store's batch transaction; no matching row leaves the reference unset.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemUpsert {
    pub shopify_line_item_id: i64,
    pub shopify_product_id: Option<i64>,
    pub quantity: i64,
    pub price: Decimal,
    pub total_price: Decimal,
}
