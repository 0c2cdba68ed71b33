//! In-memory store for tests/dev.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use stockpilot_core::{
    AuditedQuery, NewAuditedQuery, Order, OrderItem, OrderUpsert, Product, ProductUpsert,
};

use crate::store::{BestSellerRow, CommerceStore, DaySales, StoreError};

#[derive(Debug, Default)]
struct State {
    /// Rows keyed by local id; the `*_ids` maps index the remote keys.
    products: BTreeMap<i64, Product>,
    product_ids: HashMap<i64, i64>,
    orders: BTreeMap<i64, Order>,
    order_ids: HashMap<i64, i64>,
    items: BTreeMap<i64, OrderItem>,
    item_ids: HashMap<(i64, i64), i64>,
    queries: Vec<AuditedQuery>,
    next_product_id: i64,
    next_order_id: i64,
    next_item_id: i64,
    next_query_id: i64,
}

/// In-memory [`CommerceStore`].
///
/// Batch atomicity comes from holding the write lock for the whole batch;
/// nothing inside a batch can fail once it has been validated upstream.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    // ---- test/dev helpers -------------------------------------------------
    //
    // Merchant-curated product fields (`expiry_date`, `is_on_sale`,
    // `discount_percent`) have no sync path, so tests seed rows directly.

    /// Insert a row as-is, assigning a local id when `id` is 0.
    pub fn seed_product(&self, mut product: Product) -> i64 {
        let mut state = self.state.write().unwrap();
        if product.id == 0 {
            state.next_product_id += 1;
            product.id = state.next_product_id;
        }
        state.product_ids.insert(product.shopify_id, product.id);
        let id = product.id;
        state.products.insert(id, product);
        id
    }

    pub fn seed_order(&self, mut order: Order) -> i64 {
        let mut state = self.state.write().unwrap();
        if order.id == 0 {
            state.next_order_id += 1;
            order.id = state.next_order_id;
        }
        state.order_ids.insert(order.shopify_id, order.id);
        let id = order.id;
        state.orders.insert(id, order);
        id
    }

    pub fn seed_order_item(&self, mut item: OrderItem) -> i64 {
        let mut state = self.state.write().unwrap();
        if item.id == 0 {
            state.next_item_id += 1;
            item.id = state.next_item_id;
        }
        state
            .item_ids
            .insert((item.order_id, item.shopify_line_item_id), item.id);
        let id = item.id;
        state.items.insert(id, item);
        id
    }

    pub fn product_by_shopify_id(&self, shopify_id: i64) -> Option<Product> {
        let state = self.state.read().unwrap();
        let id = state.product_ids.get(&shopify_id)?;
        state.products.get(id).cloned()
    }

    pub fn order_by_shopify_id(&self, shopify_id: i64) -> Option<Order> {
        let state = self.state.read().unwrap();
        let id = state.order_ids.get(&shopify_id)?;
        state.orders.get(id).cloned()
    }

    pub fn items_for_order(&self, order_id: i64) -> Vec<OrderItem> {
        let state = self.state.read().unwrap();
        state
            .items
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    pub fn audited_queries(&self) -> Vec<AuditedQuery> {
        self.state.read().unwrap().queries.clone()
    }
}

#[async_trait]
impl CommerceStore for InMemoryStore {
    async fn apply_product_batch(&self, batch: Vec<ProductUpsert>) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        let now = Utc::now();

        for upsert in batch {
            match state.product_ids.get(&upsert.shopify_id).copied() {
                Some(id) => {
                    let row = state.products.get_mut(&id).expect("indexed row exists");
                    row.title = upsert.title;
                    row.body_html = upsert.body_html;
                    row.handle = upsert.handle;
                    row.status = upsert.status;
                    row.total_inventory = upsert.total_inventory;
                    row.image = upsert.image;
                    row.updated_at = now;
                }
                None => {
                    state.next_product_id += 1;
                    let id = state.next_product_id;
                    state.product_ids.insert(upsert.shopify_id, id);
                    state.products.insert(
                        id,
                        Product {
                            id,
                            shopify_id: upsert.shopify_id,
                            title: upsert.title,
                            body_html: upsert.body_html,
                            handle: upsert.handle,
                            status: upsert.status,
                            total_inventory: upsert.total_inventory,
                            image: upsert.image,
                            expiry_date: None,
                            is_on_sale: false,
                            discount_percent: Decimal::ZERO,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
            }
        }
        Ok(())
    }

    async fn apply_order_batch(&self, batch: Vec<OrderUpsert>) -> Result<(), StoreError> {
        let mut state = self.state.write().unwrap();
        let now = Utc::now();

        for upsert in batch {
            let order_id = match state.order_ids.get(&upsert.shopify_id).copied() {
                Some(id) => {
                    let row = state.orders.get_mut(&id).expect("indexed row exists");
                    row.name = upsert.name;
                    row.financial_status = upsert.financial_status;
                    row.fulfillment_status = upsert.fulfillment_status;
                    row.total_price = upsert.total_price;
                    row.currency = upsert.currency;
                    row.ordered_at = upsert.ordered_at;
                    row.updated_at = now;
                    id
                }
                None => {
                    state.next_order_id += 1;
                    let id = state.next_order_id;
                    state.order_ids.insert(upsert.shopify_id, id);
                    state.orders.insert(
                        id,
                        Order {
                            id,
                            shopify_id: upsert.shopify_id,
                            name: upsert.name,
                            financial_status: upsert.financial_status,
                            fulfillment_status: upsert.fulfillment_status,
                            total_price: upsert.total_price,
                            currency: upsert.currency,
                            ordered_at: upsert.ordered_at,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                    id
                }
            };

            for item in upsert.items {
                // Weak reference: unresolved product ids stay unset.
                let product_id = item
                    .shopify_product_id
                    .and_then(|sid| state.product_ids.get(&sid).copied());

                match state
                    .item_ids
                    .get(&(order_id, item.shopify_line_item_id))
                    .copied()
                {
                    Some(id) => {
                        let row = state.items.get_mut(&id).expect("indexed row exists");
                        row.product_id = product_id;
                        row.quantity = item.quantity;
                        row.price = item.price;
                        row.total_price = item.total_price;
                        row.updated_at = now;
                    }
                    None => {
                        state.next_item_id += 1;
                        let id = state.next_item_id;
                        state
                            .item_ids
                            .insert((order_id, item.shopify_line_item_id), id);
                        state.items.insert(
                            id,
                            OrderItem {
                                id,
                                order_id,
                                shopify_line_item_id: item.shopify_line_item_id,
                                product_id,
                                quantity: item.quantity,
                                price: item.price,
                                total_price: item.total_price,
                                created_at: now,
                                updated_at: now,
                            },
                        );
                    }
                }
            }
        }
        Ok(())
    }

    async fn record_query(&self, query: NewAuditedQuery) -> Result<i64, StoreError> {
        let mut state = self.state.write().unwrap();
        state.next_query_id += 1;
        let id = state.next_query_id;
        state.queries.push(AuditedQuery {
            id,
            query_type: query.query_type,
            question: query.question,
            answer: query.answer,
            meta: query.meta,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn product_count(&self) -> Result<i64, StoreError> {
        Ok(self.state.read().unwrap().products.len() as i64)
    }

    async fn order_count(&self) -> Result<i64, StoreError> {
        Ok(self.state.read().unwrap().orders.len() as i64)
    }

    async fn revenue_total(&self) -> Result<Decimal, StoreError> {
        let state = self.state.read().unwrap();
        Ok(state
            .orders
            .values()
            .fold(Decimal::ZERO, |acc, o| acc + o.total_price))
    }

    async fn sales_on(&self, date: NaiveDate) -> Result<DaySales, StoreError> {
        let state = self.state.read().unwrap();
        let mut total = Decimal::ZERO;
        let mut count = 0;
        for order in state.orders.values() {
            if order.ordered_at.map(|t| t.date_naive()) == Some(date) {
                total += order.total_price;
                count += 1;
            }
        }
        Ok(DaySales { total, count })
    }

    async fn best_sellers(&self, limit: i64) -> Result<Vec<BestSellerRow>, StoreError> {
        let state = self.state.read().unwrap();

        let mut by_product: HashMap<i64, (i64, Decimal)> = HashMap::new();
        for item in state.items.values() {
            let Some(product_id) = item.product_id else {
                continue;
            };
            if !state.products.contains_key(&product_id) {
                continue;
            }
            let entry = by_product.entry(product_id).or_insert((0, Decimal::ZERO));
            entry.0 += item.quantity;
            entry.1 += item.total_price;
        }

        let mut rows: Vec<BestSellerRow> = by_product
            .into_iter()
            .map(|(product_id, (quantity, revenue))| BestSellerRow {
                product_id,
                title: state.products[&product_id].title.clone(),
                total_quantity_sold: quantity,
                total_revenue: revenue,
            })
            .collect();

        rows.sort_by(|a, b| {
            b.total_quantity_sold
                .cmp(&a.total_quantity_sold)
                .then(a.product_id.cmp(&b.product_id))
        });
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn low_stock(&self, threshold: i64, limit: i64) -> Result<Vec<Product>, StoreError> {
        let state = self.state.read().unwrap();
        let mut rows: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.total_inventory < threshold)
            .cloned()
            .collect();
        rows.sort_by_key(|p| (p.total_inventory, p.id));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn near_expiry(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Product>, StoreError> {
        let state = self.state.read().unwrap();
        let mut rows: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.expiry_date.is_some_and(|d| d >= from && d <= to))
            .cloned()
            .collect();
        rows.sort_by_key(|p| (p.expiry_date, p.id));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn on_sale(&self, limit: i64) -> Result<Vec<Product>, StoreError> {
        let state = self.state.read().unwrap();
        let mut rows: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.is_on_sale)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.discount_percent
                .cmp(&a.discount_percent)
                .then(a.id.cmp(&b.id))
        });
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn recent_orders(&self, limit: i64) -> Result<Vec<Order>, StoreError> {
        let state = self.state.read().unwrap();
        let mut rows: Vec<Order> = state.orders.values().cloned().collect();
        rows.sort_by(|a, b| match (&a.ordered_at, &b.ordered_at) {
            (Some(x), Some(y)) => y.cmp(x).then(b.id.cmp(&a.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => b.id.cmp(&a.id),
        });
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn product_upsert(shopify_id: i64, title: &str, inventory: i64) -> ProductUpsert {
        ProductUpsert {
            shopify_id,
            title: title.to_string(),
            body_html: String::new(),
            handle: None,
            status: "active".to_string(),
            total_inventory: inventory,
            image: None,
        }
    }

    #[tokio::test]
    async fn product_upsert_inserts_then_overwrites() {
        let store = InMemoryStore::new();

        store
            .apply_product_batch(vec![product_upsert(1, "Lip Gloss", 3)])
            .await
            .unwrap();
        store
            .apply_product_batch(vec![product_upsert(1, "Lip Gloss XL", 7)])
            .await
            .unwrap();

        assert_eq!(store.product_count().await.unwrap(), 1);
        let row = store.product_by_shopify_id(1).unwrap();
        assert_eq!(row.title, "Lip Gloss XL");
        assert_eq!(row.total_inventory, 7);
    }

    #[tokio::test]
    async fn duplicate_shopify_ids_in_one_batch_keep_one_row() {
        let store = InMemoryStore::new();

        store
            .apply_product_batch(vec![
                product_upsert(1, "first", 1),
                product_upsert(1, "second", 2),
            ])
            .await
            .unwrap();

        assert_eq!(store.product_count().await.unwrap(), 1);
        assert_eq!(store.product_by_shopify_id(1).unwrap().title, "second");
    }

    #[tokio::test]
    async fn product_upsert_preserves_merchant_fields() {
        let store = InMemoryStore::new();
        store.seed_product(Product {
            shopify_id: 1,
            title: "Serum".to_string(),
            is_on_sale: true,
            discount_percent: dec("15.00"),
            expiry_date: Some(NaiveDate::from_ymd_opt(2026, 12, 1).unwrap()),
            ..Default::default()
        });

        store
            .apply_product_batch(vec![product_upsert(1, "Serum v2", 4)])
            .await
            .unwrap();

        let row = store.product_by_shopify_id(1).unwrap();
        assert_eq!(row.title, "Serum v2");
        assert!(row.is_on_sale);
        assert_eq!(row.discount_percent, dec("15.00"));
        assert_eq!(
            row.expiry_date,
            Some(NaiveDate::from_ymd_opt(2026, 12, 1).unwrap())
        );
    }

    #[tokio::test]
    async fn order_items_resolve_known_products_and_tolerate_unknown() {
        let store = InMemoryStore::new();
        store
            .apply_product_batch(vec![product_upsert(1, "Lip Gloss", 3)])
            .await
            .unwrap();

        store
            .apply_order_batch(vec![OrderUpsert {
                shopify_id: 100,
                name: "#1001".to_string(),
                financial_status: Some("paid".to_string()),
                fulfillment_status: None,
                total_price: dec("19.00"),
                currency: "AUD".to_string(),
                ordered_at: None,
                items: vec![
                    stockpilot_core::OrderItemUpsert {
                        shopify_line_item_id: 9,
                        shopify_product_id: Some(1),
                        quantity: 2,
                        price: dec("9.50"),
                        total_price: dec("19.00"),
                    },
                    stockpilot_core::OrderItemUpsert {
                        shopify_line_item_id: 10,
                        shopify_product_id: Some(999),
                        quantity: 1,
                        price: dec("5.00"),
                        total_price: dec("5.00"),
                    },
                ],
            }])
            .await
            .unwrap();

        let order = store.order_by_shopify_id(100).unwrap();
        let mut items = store.items_for_order(order.id);
        items.sort_by_key(|i| i.shopify_line_item_id);

        let product = store.product_by_shopify_id(1).unwrap();
        assert_eq!(items[0].product_id, Some(product.id));
        assert_eq!(items[0].total_price, dec("19.00"));
        assert_eq!(items[1].product_id, None);
    }

    #[tokio::test]
    async fn order_item_composite_key_overwrites() {
        let store = InMemoryStore::new();
        let item = |qty: i64| stockpilot_core::OrderItemUpsert {
            shopify_line_item_id: 9,
            shopify_product_id: None,
            quantity: qty,
            price: dec("1.00"),
            total_price: Decimal::from(qty),
        };
        let order = |items| OrderUpsert {
            shopify_id: 100,
            name: String::new(),
            financial_status: None,
            fulfillment_status: None,
            total_price: Decimal::ZERO,
            currency: "AUD".to_string(),
            ordered_at: None,
            items,
        };

        store.apply_order_batch(vec![order(vec![item(2)])]).await.unwrap();
        store.apply_order_batch(vec![order(vec![item(5)])]).await.unwrap();

        let local = store.order_by_shopify_id(100).unwrap();
        let items = store.items_for_order(local.id);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[tokio::test]
    async fn best_sellers_rank_by_quantity_with_id_tiebreak() {
        let store = InMemoryStore::new();
        let a = store.seed_product(Product {
            shopify_id: 1,
            title: "A".to_string(),
            ..Default::default()
        });
        let b = store.seed_product(Product {
            shopify_id: 2,
            title: "B".to_string(),
            ..Default::default()
        });
        let c = store.seed_product(Product {
            shopify_id: 3,
            title: "C".to_string(),
            ..Default::default()
        });
        let order_id = store.seed_order(Order {
            shopify_id: 100,
            ..Default::default()
        });
        for (line, product_id, qty) in [(1, a, 5), (2, b, 5), (3, c, 3)] {
            store.seed_order_item(OrderItem {
                order_id,
                shopify_line_item_id: line,
                product_id: Some(product_id),
                quantity: qty,
                total_price: Decimal::from(qty),
                ..Default::default()
            });
        }

        let first = store.best_sellers(10).await.unwrap();
        assert_eq!(
            first.iter().map(|r| r.product_id).collect::<Vec<_>>(),
            vec![a, b, c]
        );

        // Tied rows keep the same relative order on repeated calls.
        let second = store.best_sellers(10).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn best_sellers_exclude_unresolved_items() {
        let store = InMemoryStore::new();
        let order_id = store.seed_order(Order {
            shopify_id: 100,
            ..Default::default()
        });
        store.seed_order_item(OrderItem {
            order_id,
            shopify_line_item_id: 1,
            product_id: None,
            quantity: 4,
            ..Default::default()
        });

        assert!(store.best_sellers(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn low_stock_threshold_is_strict() {
        let store = InMemoryStore::new();
        for (sid, inv) in [(1, 10), (2, 9), (3, 0)] {
            store.seed_product(Product {
                shopify_id: sid,
                title: format!("p{sid}"),
                total_inventory: inv,
                ..Default::default()
            });
        }

        let rows = store.low_stock(10, 10).await.unwrap();
        let inventories: Vec<i64> = rows.iter().map(|p| p.total_inventory).collect();
        assert_eq!(inventories, vec![0, 9]);
    }

    #[tokio::test]
    async fn near_expiry_window_is_inclusive() {
        let store = InMemoryStore::new();
        let today = Utc::now().date_naive();
        let cases = [
            (1, Some(today)),
            (2, Some(today + Duration::days(30))),
            (3, Some(today + Duration::days(31))),
            (4, None),
        ];
        for (sid, expiry) in cases {
            store.seed_product(Product {
                shopify_id: sid,
                expiry_date: expiry,
                ..Default::default()
            });
        }

        let rows = store
            .near_expiry(today, today + Duration::days(30), 10)
            .await
            .unwrap();
        let ids: Vec<i64> = rows.iter().map(|p| p.shopify_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn on_sale_ranks_by_discount_descending() {
        let store = InMemoryStore::new();
        for (sid, discount) in [(1, "5.00"), (2, "25.50"), (3, "10.00")] {
            store.seed_product(Product {
                shopify_id: sid,
                is_on_sale: true,
                discount_percent: dec(discount),
                ..Default::default()
            });
        }
        store.seed_product(Product {
            shopify_id: 4,
            is_on_sale: false,
            discount_percent: dec("90.00"),
            ..Default::default()
        });

        let rows = store.on_sale(10).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|p| p.shopify_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn recent_orders_sort_undated_last() {
        let store = InMemoryStore::new();
        let t0 = Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2026, 8, 2, 10, 0, 0).unwrap();
        store.seed_order(Order {
            shopify_id: 1,
            ordered_at: Some(t0),
            ..Default::default()
        });
        store.seed_order(Order {
            shopify_id: 2,
            ordered_at: None,
            ..Default::default()
        });
        store.seed_order(Order {
            shopify_id: 3,
            ordered_at: Some(t1),
            ..Default::default()
        });

        let rows = store.recent_orders(10).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|o| o.shopify_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn sales_on_filters_by_calendar_date() {
        let store = InMemoryStore::new();
        let on_day = Utc.with_ymd_and_hms(2026, 8, 5, 23, 59, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2026, 8, 4, 0, 1, 0).unwrap();
        store.seed_order(Order {
            shopify_id: 1,
            total_price: dec("10.00"),
            ordered_at: Some(on_day),
            ..Default::default()
        });
        store.seed_order(Order {
            shopify_id: 2,
            total_price: dec("7.50"),
            ordered_at: Some(before),
            ..Default::default()
        });
        store.seed_order(Order {
            shopify_id: 3,
            total_price: dec("3.00"),
            ordered_at: None,
            ..Default::default()
        });

        let day = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let sales = store.sales_on(day).await.unwrap();
        assert_eq!(sales.total, dec("10.00"));
        assert_eq!(sales.count, 1);
    }

    #[tokio::test]
    async fn record_query_appends_with_sequential_ids() {
        let store = InMemoryStore::new();
        let meta = stockpilot_core::AuditMeta::new(0, 0, Decimal::ZERO, "test");
        let new = |q: &str| NewAuditedQuery {
            query_type: "stock_analyst".to_string(),
            question: q.to_string(),
            answer: Some("fine".to_string()),
            meta: meta.clone(),
        };

        let first = store.record_query(new("a")).await.unwrap();
        let second = store.record_query(new("b")).await.unwrap();

        assert_eq!((first, second), (1, 2));
        let queries = store.audited_queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].question, "a");
        assert_eq!(queries[0].query_type, "stock_analyst");
    }
}
