//! Background task that batches captured log lines to the webhooks.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::buffer::LineBuffer;
use crate::layer::LogLine;
use crate::webhook::WebhookTarget;

/// Flush thresholds for the buffered sink.
#[derive(Debug, Clone)]
pub struct FlushConfig {
    /// Flush once this many lines are buffered.
    pub max_lines: usize,
    /// Flush once this long has passed since the last flush.
    pub max_interval: Duration,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            max_lines: 50,
            max_interval: Duration::from_secs(15),
        }
    }
}

/// Handle to a running flusher task.
///
/// Dropping the handle without calling [`SinkHandle::shutdown`] still lets
/// the task drain and exit once the sending side of the channel closes, but
/// an explicit shutdown also waits for the final flush to be delivered.
pub struct SinkHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SinkHandle {
    /// Stop the task after a final drain-and-flush.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

/// Spawn the flusher: receives [`LogLine`]s, batches them per
/// [`FlushConfig`], and fans each batch out to every target.
pub fn spawn_webhook_flusher(
    mut rx: mpsc::UnboundedReceiver<LogLine>,
    targets: Vec<Box<dyn WebhookTarget + Send + Sync>>,
    config: FlushConfig,
) -> SinkHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut buffer = LineBuffer::new(config.max_lines, config.max_interval);
        // Check the time threshold at half the interval, so a quiet run
        // still flushes close to on time.
        let period = (config.max_interval / 2).max(Duration::from_millis(10));
        let mut tick = tokio::time::interval(period);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                line = rx.recv() => match line {
                    Some(line) => {
                        buffer.push(line.formatted());
                        if buffer.should_flush() {
                            flush(&mut buffer, &targets).await;
                        }
                    }
                    None => break,
                },
                _ = tick.tick() => {
                    if buffer.should_flush() {
                        flush(&mut buffer, &targets).await;
                    }
                }
                _ = &mut shutdown_rx => break,
            }
        }

        while let Ok(line) = rx.try_recv() {
            buffer.push(line.formatted());
        }
        flush(&mut buffer, &targets).await;
    });

    SinkHandle {
        shutdown: shutdown_tx,
        task,
    }
}

async fn flush(buffer: &mut LineBuffer, targets: &[Box<dyn WebhookTarget + Send + Sync>]) {
    let Some(content) = buffer.drain() else {
        return;
    };
    let message = format!("[fxiaoke-sync]\n{content}");
    for target in targets {
        if let Err(e) = target.send_text(&message).await {
            tracing::warn!("Failed to deliver log batch to {}: {e:#}", target.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    struct CaptureTarget {
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl WebhookTarget for CaptureTarget {
        fn name(&self) -> &'static str {
            "capture"
        }

        async fn send_text(&self, content: &str) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(content.to_string());
            Ok(())
        }
    }

    fn line(message: &str) -> LogLine {
        LogLine {
            time: Utc::now(),
            level: Level::INFO,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_flushes_at_size_threshold() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_webhook_flusher(
            rx,
            vec![Box::new(CaptureTarget { sent: sent.clone() })],
            FlushConfig {
                max_lines: 2,
                max_interval: Duration::from_secs(3600),
            },
        );

        tx.send(line("first")).unwrap();
        tx.send(line("second")).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        {
            let sent = sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert!(sent[0].starts_with("[fxiaoke-sync]\n"));
            assert!(sent[0].contains("first"));
            assert!(sent[0].contains("second"));
        }

        drop(tx);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_flushes_at_time_threshold() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_webhook_flusher(
            rx,
            vec![Box::new(CaptureTarget { sent: sent.clone() })],
            FlushConfig {
                max_lines: 100,
                max_interval: Duration::from_millis(30),
            },
        );

        tx.send(line("lonely")).unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(sent.lock().unwrap().len(), 1);

        drop(tx);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_flushes_remainder() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_webhook_flusher(
            rx,
            vec![Box::new(CaptureTarget { sent: sent.clone() })],
            FlushConfig {
                max_lines: 100,
                max_interval: Duration::from_secs(3600),
            },
        );

        tx.send(line("pending")).unwrap();
        handle.shutdown().await;

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("pending"));
    }

    #[tokio::test]
    async fn test_lines_delivered_in_order() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_webhook_flusher(
            rx,
            vec![Box::new(CaptureTarget { sent: sent.clone() })],
            FlushConfig {
                max_lines: 3,
                max_interval: Duration::from_secs(3600),
            },
        );

        for message in ["a", "b", "c"] {
            tx.send(line(message)).unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        {
            let sent = sent.lock().unwrap();
            let a = sent[0].find(" a").unwrap();
            let b = sent[0].find(" b").unwrap();
            let c = sent[0].find(" c").unwrap();
            assert!(a < b && b < c);
        }

        drop(tx);
        handle.shutdown().await;
    }
}
