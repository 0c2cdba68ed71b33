//! `stockpilot-core` — shared data foundation for the back-office service.
//!
//! This crate contains **pure data** types (no I/O, no framework concerns):
//! the persisted entities, the upsert inputs produced by reconciliation,
//! and the process configuration.

pub mod config;
pub mod entity;
pub mod upsert;

pub use config::{AiConfig, AppConfig, ShopifyConfig};
pub use entity::{AuditMeta, AuditedQuery, NewAuditedQuery, Order, OrderItem, Product};
pub use upsert::{OrderItemUpsert, OrderUpsert, ProductUpsert};
