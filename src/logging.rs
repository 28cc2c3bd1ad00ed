//! Logging bootstrap: console output plus optional chat-webhook and
//! database mirrors of the run log.

use anyhow::Result;
use notify::{FeishuClient, FlushConfig, ForwardLayer, LogLine, SinkHandle, WeChatClient, WebhookTarget};
use postgresql_source::LogStore;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{NotifyOpts, SourceOpts};

/// Modules whose own delivery logs must not re-enter the mirrors.
const IGNORED_TARGETS: [&str; 3] = [
    "notify",
    "fxiaoke_sync::logging",
    "fxiaoke_sync::notifications",
];

/// Handles to the background log-delivery tasks.
#[derive(Default)]
pub struct LogGuards {
    webhook_sink: Option<SinkHandle>,
    db_writer: Option<DbWriterHandle>,
}

impl LogGuards {
    /// Drain and stop the delivery tasks, waiting for final flushes.
    pub async fn shutdown(self) {
        if let Some(sink) = self.webhook_sink {
            sink.shutdown().await;
        }
        if let Some(writer) = self.db_writer {
            writer.shutdown().await;
        }
    }
}

/// Console-only logging for the lightweight subcommands.
pub fn init_console() {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .init();
}

/// Full logging for a sync run: console, plus the webhook log sink and the
/// database log mirror when configured.
pub async fn init(source: &SourceOpts, opts: &NotifyOpts) -> Result<LogGuards> {
    let mut guards = LogGuards::default();
    let mut setup_warnings = Vec::new();

    let mut webhook_layer = None;
    let targets = webhook_targets(opts);
    if !targets.is_empty() {
        let (tx, rx) = mpsc::unbounded_channel();
        webhook_layer = Some(forward_layer(tx));
        guards.webhook_sink = Some(notify::spawn_webhook_flusher(
            rx,
            targets,
            FlushConfig {
                max_lines: opts.notify_buffer_lines,
                max_interval: std::time::Duration::from_secs(opts.notify_buffer_secs),
            },
        ));
    }

    let mut db_layer = None;
    if opts.log_to_database {
        match connect_log_store(&source.database_url).await {
            Ok(store) => {
                let (tx, rx) = mpsc::unbounded_channel();
                db_layer = Some(forward_layer(tx));
                guards.db_writer = Some(spawn_db_writer(store, rx));
            }
            Err(e) => setup_warnings.push(format!("Database log mirror disabled: {e:#}")),
        }
    }

    tracing_subscriber::registry()
        .with(default_filter())
        .with(tracing_subscriber::fmt::layer())
        .with(webhook_layer)
        .with(db_layer)
        .init();

    for warning in setup_warnings {
        tracing::warn!("{warning}");
    }

    Ok(guards)
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn forward_layer(tx: mpsc::UnboundedSender<LogLine>) -> ForwardLayer {
    let mut layer = ForwardLayer::new(tx);
    for target in IGNORED_TARGETS {
        layer = layer.ignore_target(target);
    }
    layer
}

fn webhook_targets(opts: &NotifyOpts) -> Vec<Box<dyn WebhookTarget + Send + Sync>> {
    let mut targets: Vec<Box<dyn WebhookTarget + Send + Sync>> = Vec::new();
    if let Some(token) = opts.feishu_webhook.as_deref() {
        if let Ok(client) = FeishuClient::new(token) {
            targets.push(Box::new(client));
        }
    }
    if let Some(key) = opts
        .wechat_webhook
        .as_deref()
        .or(opts.wechat_robot_key.as_deref())
    {
        if let Ok(client) = WeChatClient::new(key) {
            targets.push(Box::new(client));
        }
    }
    targets
}

async fn connect_log_store(database_url: &str) -> Result<LogStore> {
    let store = LogStore::connect(database_url).await?;
    store.init().await?;
    Ok(store)
}

struct DbWriterHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl DbWriterHandle {
    async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

fn spawn_db_writer(store: LogStore, mut rx: mpsc::UnboundedReceiver<LogLine>) -> DbWriterHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                line = rx.recv() => match line {
                    Some(line) => write_line(&store, line).await,
                    None => break,
                },
                _ = &mut shutdown_rx => break,
            }
        }
        while let Ok(line) = rx.try_recv() {
            write_line(&store, line).await;
        }
    });

    DbWriterHandle {
        shutdown: shutdown_tx,
        task,
    }
}

async fn write_line(store: &LogStore, line: LogLine) {
    if let Err(e) = store
        .insert(line.time, &line.level.to_string(), &line.message)
        .await
    {
        tracing::warn!("Failed to mirror log line to database: {e:#}");
    }
}
