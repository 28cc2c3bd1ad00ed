//! Error types for the CRM sink.

use thiserror::Error;

/// Errors that abort a push run.
///
/// Per-record delivery problems are not errors; they are reported as
/// [`sync_core::SyncOutcome::Failure`] so the loop can keep going.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The token exchange was rejected or returned no usable token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure building or issuing a request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
