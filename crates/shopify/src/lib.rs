//! `stockpilot-shopify`
//!
//! **Responsibility:** the remote catalog boundary.
//!
//! The Shopify Admin API is treated as an opaque paginated source of
//! loosely-typed product and order records. This crate only fetches and
//! decodes; mapping records onto local entities lives in the sync layer.

pub mod client;
pub mod records;

pub use client::{CatalogClient, CatalogError, RestCatalogClient};
pub use records::{ImageRecord, LineItemRecord, OrderRecord, ProductRecord, VariantRecord};
