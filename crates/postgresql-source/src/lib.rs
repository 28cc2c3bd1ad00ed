//! PostgreSQL source reader for fxiaoke-sync.
//!
//! Provides the full-table snapshot read that feeds the push loop, and the
//! optional run-log mirror table.

mod full_read;
mod log_store;

pub use full_read::{connect, fetch_consumables, probe_table};
pub use log_store::{LogStore, LOG_TABLE};
