//! Run-log mirror table.
//!
//! When enabled, every captured log line of a run is inserted into a table
//! in the source database, alongside the chat-webhook delivery.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio_postgres::Client;

/// Table holding one row per captured log line.
pub const LOG_TABLE: &str = "fxiaoke_sync_log";

/// Writer for the run-log table.
pub struct LogStore {
    client: Client,
}

impl LogStore {
    /// Connect to the database that receives the log rows.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let client = crate::connect(connection_string).await?;
        Ok(Self { client })
    }

    /// Create the log table and its time index when missing.
    pub async fn init(&self) -> Result<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {LOG_TABLE} (
                uuid VARCHAR(36) NOT NULL PRIMARY KEY,
                log_time TIMESTAMP NOT NULL,
                log_level VARCHAR(20) NOT NULL,
                message TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_{LOG_TABLE}_time ON {LOG_TABLE} (log_time);"
        );
        self.client
            .batch_execute(&ddl)
            .await
            .context("Failed to create run-log table")?;
        Ok(())
    }

    /// Insert one log line.
    pub async fn insert(&self, time: DateTime<Utc>, level: &str, message: &str) -> Result<()> {
        let id = uuid::Uuid::new_v4().to_string();
        let log_time = time.naive_utc();
        self.client
            .execute(
                &format!(
                    "INSERT INTO {LOG_TABLE} (uuid, log_time, log_level, message) \
                     VALUES ($1, $2, $3, $4)"
                ),
                &[&id, &log_time, &level, &message],
            )
            .await
            .context("Failed to insert run-log row")?;
        Ok(())
    }
}
