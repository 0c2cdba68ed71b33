//! Remote record shapes.
//!
//! Every field is optional and unknown keys are ignored: the remote payload
//! is under no obligation to be complete, and absent keys are defaulted (or
//! rejected) downstream, not here. Money fields arrive either as JSON
//! strings (`"9.50"`, Shopify's usual encoding) or as bare numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// One remote product, as returned by `GET /products.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductRecord {
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub variants: Vec<VariantRecord>,
    #[serde(default)]
    pub image: Option<ImageRecord>,
}

/// One product variant; only the inventory count is of interest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariantRecord {
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageRecord {
    #[serde(default)]
    pub src: Option<String>,
}

/// One remote order, as returned by `GET /orders.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderRecord {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub financial_status: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    #[serde(default, deserialize_with = "money")]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    /// RFC 3339 creation timestamp; parsed (and validated) by the sync
    /// layer so a malformed value aborts the batch rather than the fetch.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItemRecord>,
}

/// One line item nested in an [`OrderRecord`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineItemRecord {
    pub id: Option<i64>,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "money")]
    pub price: Option<Decimal>,
}

/// Accepts a decimal encoded as a JSON string or number; `null`/absent
/// stays `None`.
fn money<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(serde_json::Value::Number(n)) => n
            .to_string()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a money value, got {other}"
        ))),
    }
}
