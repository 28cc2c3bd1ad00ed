//! Domain notifications sent around the push loop.

use notify::{FeishuClient, PostElement, WeChatClient, WebhookTarget};
use sync_core::RunSummary;

use crate::config::NotifyOpts;

/// Success traces included in the final summary card.
const MAX_TRACES_IN_SUMMARY: usize = 5;

/// Best-effort wrapper over the configured chat webhooks.
///
/// Delivery failures are logged and swallowed; a notification must never
/// change the outcome of a run.
#[derive(Default)]
pub struct Notifications {
    feishu: Option<FeishuClient>,
    wechat: Option<WeChatClient>,
    mention_user_id: Option<String>,
    detail_url: Option<String>,
}

impl Notifications {
    /// No-op notifications.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build clients from the CLI options, skipping channels that are
    /// missing or malformed.
    pub fn from_opts(opts: &NotifyOpts) -> Self {
        let feishu = opts
            .feishu_webhook
            .as_deref()
            .and_then(|token| match FeishuClient::new(token) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!("Ignoring Feishu webhook: {e:#}");
                    None
                }
            });

        let wechat = opts
            .wechat_webhook
            .as_deref()
            .or(opts.wechat_robot_key.as_deref())
            .and_then(|key| match WeChatClient::new(key) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!("Ignoring WeCom webhook: {e:#}");
                    None
                }
            });

        Self {
            feishu,
            wechat,
            mention_user_id: opts.mention_user_id.clone(),
            detail_url: opts.detail_url.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.feishu.is_some() || self.wechat.is_some()
    }

    /// One record accepted (dry-run and open-API modes only).
    pub async fn record_synced(&self, id: &str, name: &str) {
        if let Some(feishu) = &self.feishu {
            log_delivery(
                feishu
                    .send_card(
                        "CRM sync succeeded",
                        &[format!("ID: {id}"), format!("Name: {name}")],
                    )
                    .await,
            );
        }
    }

    /// One record rejected.
    pub async fn record_failed(&self, id: &str, error: &str) {
        if let Some(feishu) = &self.feishu {
            log_delivery(
                feishu
                    .send_card(
                        "CRM sync failed",
                        &[format!("ID: {id}"), format!("Error: {error}")],
                    )
                    .await,
            );
        }
    }

    /// Periodic progress card.
    pub async fn progress(&self, done: usize, total: usize, succeeded: u64, failed: u64) {
        if let Some(feishu) = &self.feishu {
            log_delivery(
                feishu
                    .send_card(
                        "CRM sync progress",
                        &[
                            format!("{done}/{total}"),
                            format!("Succeeded: {succeeded}"),
                            format!("Failed: {failed}"),
                        ],
                    )
                    .await,
            );
        }
    }

    /// The token exchange failed and the run is being aborted.
    pub async fn auth_failed(&self) {
        let detail = "Could not acquire an access token, check appId/appSecret/permanentCode";
        if let Some(feishu) = &self.feishu {
            log_delivery(
                feishu
                    .send_card("CRM sync failed", &[detail.to_string()])
                    .await,
            );
        }
        if let Some(wechat) = &self.wechat {
            log_delivery(
                wechat
                    .send_markdown(&format!("**CRM sync failed**\n> {detail}"))
                    .await,
            );
        }
    }

    /// Final summary card with totals, optional detail link, collected
    /// traces and an optional mention.
    pub async fn run_complete(&self, summary: &RunSummary) {
        if let Some(feishu) = &self.feishu {
            let mut paragraphs = vec![
                vec![PostElement::text(format!("Total: {}", summary.total))],
                vec![PostElement::text(format!("Succeeded: {}", summary.succeeded))],
                vec![PostElement::text(format!("Failed: {}", summary.failed))],
            ];
            if let Some(url) = &self.detail_url {
                paragraphs.push(vec![PostElement::link("details", url.clone())]);
            }
            for (id, trace) in summary.traces.iter().take(MAX_TRACES_IN_SUMMARY) {
                paragraphs.push(vec![PostElement::text(format!("{id} | {trace}"))]);
            }
            if let Some(user_id) = &self.mention_user_id {
                paragraphs.push(vec![PostElement::at(user_id.clone())]);
            }
            log_delivery(feishu.send_post("CRM sync finished", paragraphs).await);
        }
        if let Some(wechat) = &self.wechat {
            log_delivery(
                wechat
                    .send_markdown(&format!(
                        "**CRM sync finished**\n> Total: {}\n> Succeeded: {}\n> Failed: {}",
                        summary.total, summary.succeeded, summary.failed
                    ))
                    .await,
            );
        }
    }

    /// Plain test message for the `notify` subcommand.
    pub async fn test_message(&self, message: &str) {
        if let Some(feishu) = &self.feishu {
            log_delivery(feishu.send_text(message).await);
        }
        if let Some(wechat) = &self.wechat {
            log_delivery(wechat.send_text(message).await);
        }
    }
}

fn log_delivery(result: anyhow::Result<()>) {
    if let Err(e) = result {
        tracing::warn!("Notification delivery failed: {e:#}");
    }
}
