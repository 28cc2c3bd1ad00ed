//! CLI option groups shared by the subcommands.
//!
//! Every option can come from the environment (a `.env` file is loaded at
//! startup), mirroring how the pipeline is configured in deployments.

use clap::Args;

/// Source database connection options.
#[derive(Args, Clone, Debug)]
pub struct SourceOpts {
    /// PostgreSQL connection string for the source database
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Source table holding the consumable records
    #[arg(long, default_value = "medical_consumables")]
    pub table: String,
}

/// Fxiaoke CRM push options.
#[derive(Args, Clone, Debug)]
pub struct CrmOpts {
    /// Base URL of the Fxiaoke open API
    #[arg(
        long,
        env = "FXIAOKE_API_BASE",
        default_value = "https://open.fxiaoke.com/cgi"
    )]
    pub api_base: String,

    /// App ID for the token exchange (also sent as corpId)
    #[arg(long, env = "FXIAOKE_APP_ID", default_value = "")]
    pub app_id: String,

    /// App secret for the token exchange
    #[arg(long, env = "FXIAOKE_APP_SECRET", default_value = "")]
    pub app_secret: String,

    /// Permanent code for the token exchange
    #[arg(long, env = "FXIAOKE_PERMANENT_CODE", default_value = "")]
    pub permanent_code: String,

    /// Push records to this fixed ingest URL instead of the open API
    #[arg(long, env = "FXIAOKE_DIRECT_POST_URL")]
    pub direct_post_url: Option<String>,

    /// Extra headers for the direct endpoint, as a JSON object
    #[arg(long, env = "FXIAOKE_DIRECT_POST_HEADERS")]
    pub direct_post_headers: Option<String>,

    /// Data-center id header for the direct endpoint
    #[arg(long, env = "FXIAOKE_DC_ID", default_value = "")]
    pub dc_id: String,

    /// Tenant id header for the direct endpoint
    #[arg(long, env = "FXIAOKE_TENANT_ID", default_value = "")]
    pub tenant_id: String,

    /// Static token header for the direct endpoint
    #[arg(long, env = "FXIAOKE_TOKEN", default_value = "")]
    pub push_token: String,

    /// Count every record as pushed without issuing any HTTP request
    #[arg(long, env = "FXIAOKE_DRY_RUN")]
    pub dry_run: bool,

    /// Log and notify progress every this many records
    #[arg(long, env = "FXIAOKE_PROGRESS_STEP", default_value = "100")]
    pub progress_step: usize,
}

/// Chat-webhook notification options.
#[derive(Args, Clone, Debug)]
pub struct NotifyOpts {
    /// Feishu group-robot webhook token or full URL
    #[arg(long, env = "FEISHU_WEBHOOK_TOKEN")]
    pub feishu_webhook: Option<String>,

    /// WeCom group-robot webhook URL
    #[arg(long, env = "WECHAT_WEBHOOK_URL")]
    pub wechat_webhook: Option<String>,

    /// WeCom group-robot key, used when no URL is given
    #[arg(long, env = "WECHAT_ROBOT_KEY")]
    pub wechat_robot_key: Option<String>,

    /// Feishu user to mention in the final summary card
    #[arg(long, env = "FEISHU_MENTION_USER_ID")]
    pub mention_user_id: Option<String>,

    /// Link to the detailed run log, included in the final summary card
    #[arg(long, env = "DETAIL_URL")]
    pub detail_url: Option<String>,

    /// Buffered log sink: flush after this many lines
    #[arg(long, default_value = "50")]
    pub notify_buffer_lines: usize,

    /// Buffered log sink: flush after this many seconds
    #[arg(long, default_value = "15")]
    pub notify_buffer_secs: u64,

    /// Mirror run logs into a table in the source database
    #[arg(long, env = "FXIAOKE_LOG_TO_DATABASE")]
    pub log_to_database: bool,
}

impl NotifyOpts {
    /// Options with every channel disabled, for library callers and tests.
    pub fn disabled() -> Self {
        Self {
            feishu_webhook: None,
            wechat_webhook: None,
            wechat_robot_key: None,
            mention_user_id: None,
            detail_url: None,
            notify_buffer_lines: 50,
            notify_buffer_secs: 15,
            log_to_database: false,
        }
    }
}
