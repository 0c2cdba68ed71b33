//! PostgreSQL-backed store implementation.
//!
//! ## Thread safety
//!
//! Uses the SQLx connection pool, which is `Send + Sync`; the store can be
//! shared across handlers behind an `Arc`.
//!
//! ## Atomicity
//!
//! Each `apply_*_batch` call runs inside one transaction: either every
//! upsert in the fetched page commits or none do, so a rejected write never
//! leaves a partially-applied page behind. Row-level upserts use
//! `INSERT ... ON CONFLICT ... DO UPDATE` keyed by the remote identifiers,
//! so concurrent batches for the same entity cannot interleave partial
//! updates.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use stockpilot_core::{NewAuditedQuery, Order, OrderUpsert, Product, ProductUpsert};

use crate::store::{BestSellerRow, CommerceStore, DaySales, StoreError};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// PostgreSQL [`CommerceStore`].
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::migrate!()
            .run(pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("id")?,
        shopify_id: row.try_get("shopify_id")?,
        title: row.try_get("title")?,
        body_html: row.try_get("body_html")?,
        handle: row.try_get("handle")?,
        status: row.try_get("status")?,
        total_inventory: row.try_get("total_inventory")?,
        image: row.try_get("image")?,
        expiry_date: row.try_get("expiry_date")?,
        is_on_sale: row.try_get("is_on_sale")?,
        discount_percent: row.try_get("discount_percent")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn order_from_row(row: &PgRow) -> Result<Order, sqlx::Error> {
    Ok(Order {
        id: row.try_get("id")?,
        shopify_id: row.try_get("shopify_id")?,
        name: row.try_get("name")?,
        financial_status: row.try_get("financial_status")?,
        fulfillment_status: row.try_get("fulfillment_status")?,
        total_price: row.try_get("total_price")?,
        currency: row.try_get("currency")?,
        ordered_at: row.try_get("ordered_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CommerceStore for PgStore {
    async fn apply_product_batch(&self, batch: Vec<ProductUpsert>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for upsert in &batch {
            // Merchant-curated columns (expiry_date, is_on_sale,
            // discount_percent) are deliberately absent from the update set.
            sqlx::query(
                r#"
                INSERT INTO products (shopify_id, title, body_html, handle, status, total_inventory, image)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (shopify_id) DO UPDATE SET
                    title = EXCLUDED.title,
                    body_html = EXCLUDED.body_html,
                    handle = EXCLUDED.handle,
                    status = EXCLUDED.status,
                    total_inventory = EXCLUDED.total_inventory,
                    image = EXCLUDED.image,
                    updated_at = NOW()
                "#,
            )
            .bind(upsert.shopify_id)
            .bind(&upsert.title)
            .bind(&upsert.body_html)
            .bind(&upsert.handle)
            .bind(&upsert.status)
            .bind(upsert.total_inventory)
            .bind(&upsert.image)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(count = batch.len(), "product batch committed");
        Ok(())
    }

    async fn apply_order_batch(&self, batch: Vec<OrderUpsert>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for upsert in &batch {
            let row = sqlx::query(
                r#"
                INSERT INTO orders (shopify_id, name, financial_status, fulfillment_status, total_price, currency, ordered_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (shopify_id) DO UPDATE SET
                    name = EXCLUDED.name,
                    financial_status = EXCLUDED.financial_status,
                    fulfillment_status = EXCLUDED.fulfillment_status,
                    total_price = EXCLUDED.total_price,
                    currency = EXCLUDED.currency,
                    ordered_at = EXCLUDED.ordered_at,
                    updated_at = NOW()
                RETURNING id
                "#,
            )
            .bind(upsert.shopify_id)
            .bind(&upsert.name)
            .bind(&upsert.financial_status)
            .bind(&upsert.fulfillment_status)
            .bind(upsert.total_price)
            .bind(&upsert.currency)
            .bind(upsert.ordered_at)
            .fetch_one(&mut *tx)
            .await?;
            let order_id: i64 = row.try_get("id")?;

            for item in &upsert.items {
                // Resolve the weak product reference inside the same
                // transaction; no local row leaves it NULL.
                let product_id: Option<i64> = match item.shopify_product_id {
                    Some(shopify_product_id) => {
                        sqlx::query("SELECT id FROM products WHERE shopify_id = $1")
                            .bind(shopify_product_id)
                            .fetch_optional(&mut *tx)
                            .await?
                            .map(|r| r.try_get("id"))
                            .transpose()?
                    }
                    None => None,
                };

                sqlx::query(
                    r#"
                    INSERT INTO order_items (order_id, shopify_line_item_id, product_id, quantity, price, total_price)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT (order_id, shopify_line_item_id) DO UPDATE SET
                        product_id = EXCLUDED.product_id,
                        quantity = EXCLUDED.quantity,
                        price = EXCLUDED.price,
                        total_price = EXCLUDED.total_price,
                        updated_at = NOW()
                    "#,
                )
                .bind(order_id)
                .bind(item.shopify_line_item_id)
                .bind(product_id)
                .bind(item.quantity)
                .bind(item.price)
                .bind(item.total_price)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        tracing::debug!(count = batch.len(), "order batch committed");
        Ok(())
    }

    async fn record_query(&self, query: NewAuditedQuery) -> Result<i64, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO ai_queries (query_type, question, answer, meta)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&query.query_type)
        .bind(&query.question)
        .bind(&query.answer)
        .bind(sqlx::types::Json(&query.meta))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }

    async fn product_count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn order_count(&self) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("count")?)
    }

    async fn revenue_total(&self) -> Result<Decimal, StoreError> {
        let row = sqlx::query("SELECT COALESCE(SUM(total_price), 0) AS total FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }

    async fn sales_on(&self, date: NaiveDate) -> Result<DaySales, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(total_price), 0) AS total, COUNT(*) AS count
            FROM orders
            WHERE ordered_at IS NOT NULL
              AND (ordered_at AT TIME ZONE 'UTC')::date = $1
            "#,
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await?;
        Ok(DaySales {
            total: row.try_get("total")?,
            count: row.try_get("count")?,
        })
    }

    async fn best_sellers(&self, limit: i64) -> Result<Vec<BestSellerRow>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                p.id AS product_id,
                p.title,
                SUM(oi.quantity)::BIGINT AS total_quantity_sold,
                SUM(oi.total_price) AS total_revenue
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            GROUP BY p.id, p.title
            ORDER BY total_quantity_sold DESC, p.id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(BestSellerRow {
                    product_id: row.try_get("product_id")?,
                    title: row.try_get("title")?,
                    total_quantity_sold: row.try_get("total_quantity_sold")?,
                    total_revenue: row.try_get("total_revenue")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::from)
    }

    async fn low_stock(&self, threshold: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM products
            WHERE total_inventory < $1
            ORDER BY total_inventory ASC, id ASC
            LIMIT $2
            "#,
        )
        .bind(threshold)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::from)
    }

    async fn near_expiry(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM products
            WHERE expiry_date IS NOT NULL
              AND expiry_date >= $1
              AND expiry_date <= $2
            ORDER BY expiry_date ASC, id ASC
            LIMIT $3
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::from)
    }

    async fn on_sale(&self, limit: i64) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM products
            WHERE is_on_sale
            ORDER BY discount_percent DESC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(product_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::from)
    }

    async fn recent_orders(&self, limit: i64) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM orders
            ORDER BY ordered_at DESC NULLS LAST, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::from)
    }
}
