//! 企业微信机器人 - webhook 投递 markdown 消息
//!
//! 企业微信单条 markdown 上限 4096 字符，超长内容按字符切片分段发送。

use super::channel::{Channel, SendResult};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

/// 单条消息长度上限（字符）
const MAX_MESSAGE_CHARS: usize = 4096;

/// 企业微信机器人
pub struct WeworkBot {
    name: String,
    webhook_url: String,
    enabled: bool,
    client: Client,
}

impl WeworkBot {
    pub fn new(
        name: impl Into<String>,
        webhook_url: impl Into<String>,
        enabled: bool,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            name: name.into(),
            webhook_url: webhook_url.into(),
            enabled,
            client,
        })
    }

    async fn post_markdown(&self, content: &str) -> Result<SendResult> {
        let payload = json!({
            "msgtype": "markdown",
            "markdown": { "content": content }
        });
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            info!(bot = %self.name, "WeCom message sent");
            Ok(SendResult::Sent)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(bot = %self.name, status = %status, body = %body, "WeCom send failed");
            Ok(SendResult::Failed(format!("status {status}: {body}")))
        }
    }
}

#[async_trait]
impl Channel for WeworkBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn deliver(&self, content: &str) -> Result<SendResult> {
        if !self.enabled {
            return Ok(SendResult::Skipped("bot disabled".to_string()));
        }
        // 分段发送：任何一段失败即整条算失败
        for part in split_chunks(content, MAX_MESSAGE_CHARS) {
            match self.post_markdown(&part).await? {
                SendResult::Sent => {}
                other => return Ok(other),
            }
        }
        Ok(SendResult::Sent)
    }
}

/// 按字符数切片（不在字符中间截断）
fn split_chunks(content: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for ch in content.chars() {
        if count == max_chars {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_content_single_chunk() {
        let chunks = split_chunks("短消息", 4096);
        assert_eq!(chunks, vec!["短消息".to_string()]);
    }

    #[test]
    fn test_split_long_content_by_chars_not_bytes() {
        // 多字节字符按字符计数，不会截在字节中间
        let content = "云".repeat(10);
        let chunks = split_chunks(&content, 4);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 4);
        assert_eq!(chunks[2].chars().count(), 2);
        assert_eq!(chunks.concat(), content);
    }

    #[test]
    fn test_split_empty_content() {
        assert!(split_chunks("", 4096).is_empty());
    }

    #[tokio::test]
    async fn test_disabled_bot_skips() {
        let bot = WeworkBot::new("bot1", "https://example.invalid/hook", false).unwrap();
        let result = bot.deliver("hi").await.unwrap();
        assert!(matches!(result, SendResult::Skipped(_)));
    }
}
