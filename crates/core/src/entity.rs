//! Persisted entity types.
//!
//! All rows carry a local auto-assigned `id`; synced entities additionally
//! carry the stable Shopify identifier they are keyed by. Monetary values
//! use `Decimal` so two-decimal amounts survive arithmetic exactly.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A mirrored catalog product.
///
/// One local row per remote product (`shopify_id` unique). Rows are only
/// ever created or updated by reconciliation; a product that disappears
/// upstream keeps its local row.
///
/// `expiry_date`, `is_on_sale`, and `discount_percent` are merchant-curated
/// local fields: reconciliation preserves them on update, and they take
/// their defaults when a product is first inserted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub shopify_id: i64,
    pub title: String,
    pub body_html: String,
    pub handle: Option<String>,
    pub status: String,
    pub total_inventory: i64,
    pub image: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub is_on_sale: bool,
    pub discount_percent: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A mirrored order header.
///
/// One local row per remote order (`shopify_id` unique). Owns its
/// [`OrderItem`] rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub shopify_id: i64,
    pub name: String,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub total_price: Decimal,
    pub currency: String,
    /// When the order was placed upstream; unset when the remote record
    /// omitted its creation timestamp.
    pub ordered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item belonging to an [`Order`].
///
/// Identity is the composite `(order_id, shopify_line_item_id)`.
/// `product_id` is a weak reference resolved at reconciliation time; it
/// stays unset when the referenced product is not mirrored locally.
/// `total_price` is always recomputed as `quantity × price`, never trusted
/// from upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub shopify_line_item_id: i64,
    pub product_id: Option<i64>,
    pub quantity: i64,
    pub price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Closed, versioned metadata snapshot attached to an [`AuditedQuery`].
///
/// Captures the totals that grounded the answer at the time of the query.
/// Bump [`AuditMeta::CURRENT_VERSION`] when the shape changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditMeta {
    pub schema_version: u32,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub generated_by: String,
}

impl AuditMeta {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(
        total_products: i64,
        total_orders: i64,
        total_revenue: Decimal,
        generated_by: impl Into<String>,
    ) -> Self {
        Self {
            schema_version: Self::CURRENT_VERSION,
            total_products,
            total_orders,
            total_revenue,
            generated_by: generated_by.into(),
        }
    }
}

/// An immutable record of one analyst invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditedQuery {
    pub id: i64,
    pub query_type: String,
    pub question: String,
    pub answer: Option<String>,
    pub meta: AuditMeta,
    pub created_at: DateTime<Utc>,
}

/// Input for appending an [`AuditedQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditedQuery {
    pub query_type: String,
    pub question: String,
    pub answer: Option<String>,
    pub meta: AuditMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_meta_serializes_with_version_and_totals() {
        let meta = AuditMeta::new(3, 7, "120.50".parse().unwrap(), "stockpilot");
        let value = serde_json::to_value(&meta).unwrap();

        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["total_products"], 3);
        assert_eq!(value["total_orders"], 7);
        assert_eq!(value["total_revenue"], "120.50");
        assert_eq!(value["generated_by"], "stockpilot");
    }

    #[test]
    fn audit_meta_round_trips() {
        let meta = AuditMeta::new(1, 2, "0.00".parse().unwrap(), "test");
        let json = serde_json::to_string(&meta).unwrap();
        let back: AuditMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
