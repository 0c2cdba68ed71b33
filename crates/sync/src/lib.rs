//! `stockpilot-sync`
//!
//! **Responsibility:** reconciliation.
//!
//! Pulls one bounded page of remote records per call and brings the local
//! store into agreement with it: upserts keyed by the stable remote
//! identifiers, defaults for absent fields, cross-references resolved, and
//! the whole page applied as a single atomic batch.

pub mod service;

pub use service::{SyncError, SyncService};
