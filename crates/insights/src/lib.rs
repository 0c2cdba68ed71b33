//! `stockpilot-insights`
//!
//! **Responsibility:** the read side.
//!
//! Computes dashboard metrics and the bounded, deterministically ranked
//! lists used for UI rendering and for grounding analyst answers. Pure
//! reads over the store; no caching, no external calls, always fresh.

pub mod aggregates;
pub mod context;

pub use aggregates::{
    AnalystSnapshot, Dashboard, InsightsService, LowStockAlert, NearExpiryAlert, OnSaleItem,
    Totals, TodayMetrics, TransactionRow, EXPIRY_WINDOW_DAYS, LOW_STOCK_THRESHOLD,
};
pub use context::build_context;
