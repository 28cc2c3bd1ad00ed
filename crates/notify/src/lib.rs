//! Chat-webhook notification support for fxiaoke-sync.
//!
//! Provides group-robot webhook clients (Feishu and WeCom), plus a buffered
//! log sink: a [`ForwardLayer`] captures `tracing` events into a channel and
//! a background task batches them to the webhooks when a size or time
//! threshold is reached.

pub mod buffer;
pub mod layer;
pub mod sink;
pub mod webhook;

pub use buffer::LineBuffer;
pub use layer::{ForwardLayer, LogLine};
pub use sink::{spawn_webhook_flusher, FlushConfig, SinkHandle};
pub use webhook::{FeishuClient, PostElement, WeChatClient, WebhookTarget};
