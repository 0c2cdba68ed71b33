//! `stockpilot-store`
//!
//! **Responsibility:** the local store boundary.
//!
//! Defines the [`CommerceStore`] contract (atomic batch upserts plus the
//! read-side queries the aggregation layer needs) with two
//! implementations: an in-memory store for tests/dev and a
//! PostgreSQL-backed store for production.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use store::{BestSellerRow, CommerceStore, DaySales, StoreError};
