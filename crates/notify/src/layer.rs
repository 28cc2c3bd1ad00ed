//! A `tracing` layer that forwards log events into a channel.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// One captured log event.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub time: DateTime<Utc>,
    pub level: Level,
    pub message: String,
}

impl LogLine {
    /// Short presentation used in chat messages: `HH:MM:SS message`.
    pub fn formatted(&self) -> String {
        format!("{} {}", self.time.format("%H:%M:%S"), self.message)
    }
}

/// Layer that captures the `message` field of events at or above a severity
/// threshold and sends them into an unbounded channel.
///
/// Events whose target starts with one of the ignored prefixes are skipped;
/// the delivery tasks log their own failures, and forwarding those again
/// would loop the pipeline back into itself.
pub struct ForwardLayer {
    tx: mpsc::UnboundedSender<LogLine>,
    max_level: Level,
    ignored_targets: Vec<String>,
}

impl ForwardLayer {
    pub fn new(tx: mpsc::UnboundedSender<LogLine>) -> Self {
        Self {
            tx,
            max_level: Level::INFO,
            ignored_targets: Vec::new(),
        }
    }

    /// Forward events up to this verbosity (default INFO).
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }

    /// Skip events whose target starts with `prefix`.
    pub fn ignore_target(mut self, prefix: impl Into<String>) -> Self {
        self.ignored_targets.push(prefix.into());
        self
    }
}

impl<S: Subscriber> Layer<S> for ForwardLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }
        if self
            .ignored_targets
            .iter()
            .any(|prefix| meta.target().starts_with(prefix.as_str()))
        {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if let Some(message) = visitor.message {
            let _ = self.tx.send(LogLine {
                time: Utc::now(),
                level: *meta.level(),
                message,
            });
        }
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }
}
