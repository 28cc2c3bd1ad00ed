//! Core types for the fxiaoke-sync pipeline.
//!
//! This crate provides the foundational types shared by the source reader,
//! the CRM sink, and the run orchestration:
//!
//! - [`ConsumableRecord`] - One row of the medical-consumable source table
//! - [`SyncOutcome`] - Per-record push result
//! - [`RunSummary`] - Aggregated counters and timing for a whole run
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── postgresql-source  (produces ConsumableRecord)
//!    ├─── fxiaoke-sink       (consumes ConsumableRecord, produces SyncOutcome)
//!    └─── fxiaoke-sync       (aggregates SyncOutcome into RunSummary)
//! ```

pub mod record;
pub mod report;

// Re-exports for convenience
pub use record::ConsumableRecord;
pub use report::{RunSummary, SyncOutcome};
