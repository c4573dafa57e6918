//! 云之家机器人 - webhook 投递纯文本消息

use super::channel::{Channel, SendResult};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

/// 云之家机器人
pub struct YunzhijiaBot {
    name: String,
    webhook_url: String,
    enabled: bool,
    client: Client,
}

impl YunzhijiaBot {
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
}

#[async_trait]
impl Channel for YunzhijiaBot {
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

        // 云之家只支持文本消息
        let payload = json!({ "content": content });
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if response.status().is_success() {
            info!(bot = %self.name, "Yunzhijia message sent");
            Ok(SendResult::Sent)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(bot = %self.name, status = %status, body = %body, "Yunzhijia send failed");
            Ok(SendResult::Failed(format!("status {status}: {body}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_bot_skips() {
        let bot = YunzhijiaBot::new("bot1", "https://example.invalid/hook", false).unwrap();
        let result = bot.deliver("hi").await.unwrap();
        assert!(matches!(result, SendResult::Skipped(_)));
    }
}
