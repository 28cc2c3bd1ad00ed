//! The push loop: snapshot, per-record delivery, counters, notifications.

use std::collections::HashMap;
use std::time::Instant;

use anyhow::{Context, Result};
use fxiaoke_sink::{DirectPusher, FxiaokeClient};
use sync_core::{ConsumableRecord, RunSummary, SyncOutcome};
use tracing::{error, info};

use crate::config::{CrmOpts, SourceOpts};
use crate::notifications::Notifications;

/// How each record reaches the CRM.
pub enum PushMode {
    /// Count every record as a success without any HTTP.
    DryRun,
    /// POST to a fixed ingest URL with a static token.
    Direct(DirectPusher),
    /// Token exchange, then one object creation per record.
    Create(FxiaokeClient),
}

impl PushMode {
    /// Select the mode from the CLI options: dry-run wins, then the direct
    /// URL, then the token-based API.
    pub fn from_opts(opts: &CrmOpts) -> Result<Self> {
        if opts.dry_run {
            return Ok(PushMode::DryRun);
        }
        if let Some(url) = opts.direct_post_url.as_deref().filter(|u| !u.is_empty()) {
            let extra_headers = parse_extra_headers(opts.direct_post_headers.as_deref());
            let pusher = DirectPusher::new(
                url,
                &opts.dc_id,
                &opts.tenant_id,
                &opts.push_token,
                extra_headers,
            )?;
            return Ok(PushMode::Direct(pusher));
        }
        let client = FxiaokeClient::new(
            &opts.api_base,
            &opts.app_id,
            &opts.app_secret,
            &opts.permanent_code,
        )?;
        Ok(PushMode::Create(client))
    }
}

/// The extra-header option is free-form JSON; malformed input is dropped
/// with a warning rather than failing the run.
fn parse_extra_headers(raw: Option<&str>) -> HashMap<String, String> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return HashMap::new();
    };
    match serde_json::from_str::<HashMap<String, String>>(raw) {
        Ok(map) => map,
        Err(e) => {
            tracing::warn!("Ignoring malformed direct-post headers: {e}");
            HashMap::new()
        }
    }
}

enum Pusher<'a> {
    DryRun,
    Direct(&'a DirectPusher),
    Create {
        client: &'a FxiaokeClient,
        token: String,
    },
}

/// Push all records and collect per-record outcomes into a summary.
///
/// An authentication failure aborts before the first record is attempted.
/// Per-record failures are counted, logged and notified; the loop keeps
/// going. A run over zero records issues no HTTP at all.
pub async fn push_records(
    records: &[ConsumableRecord],
    mode: &PushMode,
    notifications: &Notifications,
    progress_step: usize,
) -> Result<RunSummary> {
    let started = Instant::now();
    let total = records.len();
    let mut summary = RunSummary::new(total as u64);

    info!("Fetched {total} records, preparing push");
    if total == 0 {
        info!("No records to push");
        summary.total_duration = started.elapsed();
        return Ok(summary);
    }

    let pusher = match mode {
        PushMode::DryRun => Pusher::DryRun,
        PushMode::Direct(pusher) => Pusher::Direct(pusher),
        PushMode::Create(client) => match client.acquire_token().await {
            Ok(token) => Pusher::Create { client, token },
            Err(e) => {
                error!("Could not acquire access token, aborting push: {e}");
                notifications.auth_failed().await;
                return Err(anyhow::Error::from(e)).context("authentication failed");
            }
        },
    };

    let progress_step = progress_step.max(1);

    for (i, record) in records.iter().enumerate() {
        let record_id = record.unique_id();

        let outcome = match &pusher {
            Pusher::DryRun => {
                info!(
                    "Dry-run: would push record {record_id} ({})",
                    record.display_name()
                );
                SyncOutcome::Success { trace: None }
            }
            Pusher::Direct(pusher) => pusher.push(record).await,
            Pusher::Create { client, token } => client.create_object(token, record).await,
        };

        match &outcome {
            SyncOutcome::Success { .. } => {
                // Direct-mode acceptances are not announced one by one.
                if !matches!(pusher, Pusher::Direct(_)) {
                    notifications
                        .record_synced(&record_id, record.display_name())
                        .await;
                }
            }
            SyncOutcome::Failure { error } => {
                error!("Push failed for record {record_id}: {error}");
                notifications.record_failed(&record_id, error).await;
            }
        }
        summary.record(&record_id, &outcome);

        if (i + 1) % progress_step == 0 {
            info!(
                "Progress: {}/{total} succeeded:{} failed:{}",
                i + 1,
                summary.succeeded,
                summary.failed
            );
            notifications
                .progress(i + 1, total, summary.succeeded, summary.failed)
                .await;
        }
    }

    summary.total_duration = started.elapsed();
    info!("{}", summary.summary());
    notifications.run_complete(&summary).await;

    Ok(summary)
}

/// One complete run: snapshot the source table, push, notify.
pub async fn run_full_sync(
    source: &SourceOpts,
    crm: &CrmOpts,
    notifications: &Notifications,
) -> Result<RunSummary> {
    let mode = PushMode::from_opts(crm)?;
    if crm.dry_run {
        info!("Running in dry-run mode - no records will be pushed");
    }

    let client = postgresql_source::connect(&source.database_url).await?;
    let records = postgresql_source::fetch_consumables(&client, &source.table).await?;
    // The snapshot is complete; the push loop must not hold the source
    // connection open across slow CRM calls.
    drop(client);

    push_records(&records, &mode, notifications, crm.progress_step).await
}
