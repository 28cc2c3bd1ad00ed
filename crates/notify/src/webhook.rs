//! Group-robot webhook clients.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

const FEISHU_HOOK_BASE: &str = "https://open.feishu.cn/open-apis/bot/v2/hook";
const WECHAT_HOOK_BASE: &str = "https://qyapi.weixin.qq.com/cgi-bin/webhook/send";

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(20);

/// A destination that accepts plain-text notification messages.
///
/// Implemented by both webhook clients so the buffered log sink can fan
/// out to whichever are configured.
#[async_trait]
pub trait WebhookTarget {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    /// Deliver one text message.
    async fn send_text(&self, content: &str) -> Result<()>;
}

/// Element of a Feishu rich-text ("post") card paragraph.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "tag")]
pub enum PostElement {
    /// Plain text.
    #[serde(rename = "text")]
    Text { text: String },
    /// Hyperlink.
    #[serde(rename = "a")]
    Link { text: String, href: String },
    /// Mention of a chat member.
    #[serde(rename = "at")]
    At { user_id: String },
}

impl PostElement {
    pub fn text(text: impl Into<String>) -> Self {
        PostElement::Text { text: text.into() }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        PostElement::Link {
            text: text.into(),
            href: href.into(),
        }
    }

    pub fn at(user_id: impl Into<String>) -> Self {
        PostElement::At {
            user_id: user_id.into(),
        }
    }
}

/// Feishu group-robot webhook client.
#[derive(Clone)]
pub struct FeishuClient {
    http: reqwest::Client,
    webhook_url: String,
}

impl FeishuClient {
    /// Create a client from a webhook token or a full webhook URL.
    pub fn new(token_or_url: &str) -> Result<Self> {
        let token_or_url = token_or_url.trim();
        if token_or_url.is_empty() {
            bail!("Feishu webhook token is empty");
        }
        let webhook_url = if token_or_url.starts_with("http") {
            token_or_url.to_string()
        } else {
            format!("{FEISHU_HOOK_BASE}/{token_or_url}")
        };
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(WEBHOOK_TIMEOUT)
                .build()
                .context("Failed to build Feishu HTTP client")?,
            webhook_url,
        })
    }

    /// Send a rich-text card built from plain text lines.
    pub async fn send_card(&self, title: &str, lines: &[String]) -> Result<()> {
        let paragraphs: Vec<Vec<PostElement>> = lines
            .iter()
            .map(|line| vec![PostElement::text(line.clone())])
            .collect();
        self.send_post(title, paragraphs).await
    }

    /// Send a rich-text card with arbitrary paragraph elements.
    pub async fn send_post(&self, title: &str, paragraphs: Vec<Vec<PostElement>>) -> Result<()> {
        let payload = json!({
            "msg_type": "post",
            "content": {
                "post": {
                    "zh_cn": {
                        "title": title,
                        "content": paragraphs,
                    }
                }
            }
        });
        self.deliver(&payload).await
    }

    async fn deliver(&self, payload: &serde_json::Value) -> Result<()> {
        let resp = self
            .http
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .context("Feishu webhook request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Feishu webhook HTTP error: {status} {body}");
        }
        Ok(())
    }
}

#[async_trait]
impl WebhookTarget for FeishuClient {
    fn name(&self) -> &'static str {
        "feishu"
    }

    async fn send_text(&self, content: &str) -> Result<()> {
        let payload = json!({
            "msg_type": "text",
            "content": { "text": content },
        });
        self.deliver(&payload).await
    }
}

/// WeCom (WeChat Work) group-robot webhook client.
#[derive(Clone)]
pub struct WeChatClient {
    http: reqwest::Client,
    webhook_url: String,
}

impl WeChatClient {
    /// Create a client from a robot key or a full webhook URL.
    pub fn new(key_or_url: &str) -> Result<Self> {
        let key_or_url = key_or_url.trim();
        if key_or_url.is_empty() {
            bail!("WeCom webhook key is empty");
        }
        let webhook_url = if key_or_url.starts_with("http") {
            key_or_url.to_string()
        } else {
            format!("{WECHAT_HOOK_BASE}?key={key_or_url}")
        };
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(WEBHOOK_TIMEOUT)
                .build()
                .context("Failed to build WeCom HTTP client")?,
            webhook_url,
        })
    }

    /// Send a markdown message.
    pub async fn send_markdown(&self, content: &str) -> Result<()> {
        let payload = json!({
            "msgtype": "markdown",
            "markdown": { "content": content },
        });
        self.deliver(&payload).await
    }

    async fn deliver(&self, payload: &serde_json::Value) -> Result<()> {
        let resp = self
            .http
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await
            .context("WeCom webhook request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("WeCom webhook HTTP error: {status} {body}");
        }
        Ok(())
    }
}

#[async_trait]
impl WebhookTarget for WeChatClient {
    fn name(&self) -> &'static str {
        "wechat"
    }

    async fn send_text(&self, content: &str) -> Result<()> {
        let payload = json!({
            "msgtype": "text",
            "text": { "content": content },
        });
        self.deliver(&payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_element_tags() {
        let text = serde_json::to_value(PostElement::text("hello")).unwrap();
        assert_eq!(text, json!({"tag": "text", "text": "hello"}));

        let link = serde_json::to_value(PostElement::link("details", "https://example.com")).unwrap();
        assert_eq!(
            link,
            json!({"tag": "a", "text": "details", "href": "https://example.com"})
        );

        let at = serde_json::to_value(PostElement::at("ou_123")).unwrap();
        assert_eq!(at, json!({"tag": "at", "user_id": "ou_123"}));
    }

    #[test]
    fn test_feishu_token_expands_to_url() {
        let client = FeishuClient::new("tok-abc").unwrap();
        assert_eq!(
            client.webhook_url,
            "https://open.feishu.cn/open-apis/bot/v2/hook/tok-abc"
        );
    }

    #[test]
    fn test_feishu_full_url_kept() {
        let client = FeishuClient::new("http://localhost:9999/hook").unwrap();
        assert_eq!(client.webhook_url, "http://localhost:9999/hook");
    }

    #[test]
    fn test_feishu_empty_token_rejected() {
        assert!(FeishuClient::new("   ").is_err());
    }

    #[test]
    fn test_wechat_key_expands_to_url() {
        let client = WeChatClient::new("key-1").unwrap();
        assert_eq!(
            client.webhook_url,
            "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=key-1"
        );
    }

    #[test]
    fn test_wechat_empty_key_rejected() {
        assert!(WeChatClient::new("").is_err());
    }
}
