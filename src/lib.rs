//! fxiaoke-sync: push a medical-consumable registry table to Fxiaoke CRM.
//!
//! The run is a single linear pipeline: snapshot the source table into
//! memory, push each record to the CRM (direct ingest URL or token-based
//! open API), count outcomes, and notify chat webhooks about progress and
//! the final result.

pub mod config;
pub mod logging;
pub mod notifications;
pub mod sync;

pub use config::{CrmOpts, NotifyOpts, SourceOpts};
pub use notifications::Notifications;
pub use sync::{push_records, run_full_sync, PushMode};
