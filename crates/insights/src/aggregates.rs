//! On-demand aggregation over the local store.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use stockpilot_core::{Order, Product};
use stockpilot_store::{BestSellerRow, CommerceStore, StoreError};

/// Inventory strictly below this count raises a low-stock alert.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Near-expiry looks this many days ahead, inclusive.
pub const EXPIRY_WINDOW_DAYS: i64 = 30;

const DASHBOARD_BEST_SELLERS: i64 = 5;
const DASHBOARD_LIST_LIMIT: i64 = 10;
const RECENT_TRANSACTIONS: i64 = 10;
const CONTEXT_BEST_SELLERS: i64 = 10;
const CONTEXT_LIST_LIMIT: i64 = 20;

/// All-time counts and revenue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
}

/// Orders placed on the current UTC calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TodayMetrics {
    pub sales_total: Decimal,
    pub orders_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockAlert {
    pub id: i64,
    pub title: String,
    pub total_inventory: i64,
    pub status: String,
}

impl From<Product> for LowStockAlert {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            title: p.title,
            total_inventory: p.total_inventory,
            status: p.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearExpiryAlert {
    pub id: i64,
    pub title: String,
    pub expiry_date: Option<NaiveDate>,
    pub total_inventory: i64,
}

impl From<Product> for NearExpiryAlert {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            title: p.title,
            expiry_date: p.expiry_date,
            total_inventory: p.total_inventory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnSaleItem {
    pub id: i64,
    pub title: String,
    pub discount_percent: Decimal,
    pub total_inventory: i64,
}

impl From<Product> for OnSaleItem {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            title: p.title,
            discount_percent: p.discount_percent,
            total_inventory: p.total_inventory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub name: String,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub total_price: Decimal,
    pub currency: String,
    pub ordered_at: Option<chrono::DateTime<Utc>>,
}

impl From<Order> for TransactionRow {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            name: o.name,
            financial_status: o.financial_status,
            fulfillment_status: o.fulfillment_status,
            total_price: o.total_price,
            currency: o.currency,
            ordered_at: o.ordered_at,
        }
    }
}

/// Everything the dashboard renders, in one payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub today_sales_total: Decimal,
    pub today_orders_count: i64,
    pub best_sellers: Vec<BestSellerRow>,
    pub low_stock_alerts: Vec<LowStockAlert>,
    pub near_expiry_alerts: Vec<NearExpiryAlert>,
    pub on_sale_items: Vec<OnSaleItem>,
    pub recent_transactions: Vec<TransactionRow>,
}

/// The aggregates that ground an analyst answer (wider lists than the
/// dashboard; full product rows because the context renders sale/expiry
/// detail).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalystSnapshot {
    pub totals: Totals,
    pub best_sellers: Vec<BestSellerRow>,
    pub low_stock: Vec<Product>,
    pub near_expiry: Vec<Product>,
    pub on_sale: Vec<Product>,
}

/// Read-side aggregation service.
///
/// Every call recomputes from the store; ordering determinism comes from
/// the store contract's tie-break rules.
pub struct InsightsService<S> {
    store: S,
}

impl<S: CommerceStore> InsightsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn totals(&self) -> Result<Totals, StoreError> {
        Ok(Totals {
            total_products: self.store.product_count().await?,
            total_orders: self.store.order_count().await?,
            total_revenue: self.store.revenue_total().await?,
        })
    }

    pub async fn today(&self) -> Result<TodayMetrics, StoreError> {
        let sales = self.store.sales_on(Utc::now().date_naive()).await?;
        Ok(TodayMetrics {
            sales_total: sales.total,
            orders_count: sales.count,
        })
    }

    pub async fn dashboard(&self) -> Result<Dashboard, StoreError> {
        let totals = self.totals().await?;
        let today = self.today().await?;
        let (from, to) = expiry_window();

        Ok(Dashboard {
            total_products: totals.total_products,
            total_orders: totals.total_orders,
            total_revenue: totals.total_revenue,
            today_sales_total: today.sales_total,
            today_orders_count: today.orders_count,
            best_sellers: self.store.best_sellers(DASHBOARD_BEST_SELLERS).await?,
            low_stock_alerts: self
                .store
                .low_stock(LOW_STOCK_THRESHOLD, DASHBOARD_LIST_LIMIT)
                .await?
                .into_iter()
                .map(LowStockAlert::from)
                .collect(),
            near_expiry_alerts: self
                .store
                .near_expiry(from, to, DASHBOARD_LIST_LIMIT)
                .await?
                .into_iter()
                .map(NearExpiryAlert::from)
                .collect(),
            on_sale_items: self
                .store
                .on_sale(DASHBOARD_LIST_LIMIT)
                .await?
                .into_iter()
                .map(OnSaleItem::from)
                .collect(),
            recent_transactions: self
                .store
                .recent_orders(RECENT_TRANSACTIONS)
                .await?
                .into_iter()
                .map(TransactionRow::from)
                .collect(),
        })
    }

    pub async fn analyst_snapshot(&self) -> Result<AnalystSnapshot, StoreError> {
        let (from, to) = expiry_window();
        Ok(AnalystSnapshot {
            totals: self.totals().await?,
            best_sellers: self.store.best_sellers(CONTEXT_BEST_SELLERS).await?,
            low_stock: self
                .store
                .low_stock(LOW_STOCK_THRESHOLD, CONTEXT_LIST_LIMIT)
                .await?,
            near_expiry: self.store.near_expiry(from, to, CONTEXT_LIST_LIMIT).await?,
            on_sale: self.store.on_sale(CONTEXT_LIST_LIMIT).await?,
        })
    }
}

fn expiry_window() -> (NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();
    (today, today + Duration::days(EXPIRY_WINDOW_DAYS))
}
