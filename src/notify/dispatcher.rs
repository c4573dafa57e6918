//! 渠道分发 - 每个渠道族一组命名机器人，按选择策略路由
//!
//! 选择优先级：显式指定 > send_to_all > 默认机器人 > 配置序第一个启用的。
//! 只要有一个目标渠道接受投递就算成功，个别渠道失败不致命。

use super::channel::{Channel, SendResult};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// 一个渠道族（企业微信 / 云之家 / 邮件）的机器人集合
pub struct ChannelGroup {
    family: String,
    enabled: bool,
    send_to_all: bool,
    default_bot: Option<String>,
    /// 配置顺序保存，回退策略依赖它
    bots: Vec<Arc<dyn Channel>>,
    dry_run: bool,
}

impl ChannelGroup {
    pub fn new(family: impl Into<String>, enabled: bool) -> Self {
        Self {
            family: family.into(),
            enabled,
            send_to_all: false,
            default_bot: None,
            bots: Vec::new(),
            dry_run: false,
        }
    }

    pub fn with_send_to_all(mut self, send_to_all: bool) -> Self {
        self.send_to_all = send_to_all;
        self
    }

    pub fn with_default_bot(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.default_bot = Some(name);
        }
        self
    }

    /// dry-run 模式：选择照常，投递只记日志
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// 注册一个机器人（注册顺序即配置顺序）
    pub fn register(&mut self, bot: Arc<dyn Channel>) {
        info!(family = %self.family, bot = bot.name(), "Registering channel");
        self.bots.push(bot);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn bot_count(&self) -> usize {
        self.bots.len()
    }

    pub fn bot_names(&self) -> Vec<&str> {
        self.bots.iter().map(|b| b.name()).collect()
    }

    /// 按优先级挑出本次投递的目标渠道
    fn select(&self, explicit: Option<&str>) -> Vec<Arc<dyn Channel>> {
        let enabled: Vec<&Arc<dyn Channel>> =
            self.bots.iter().filter(|b| b.enabled()).collect();
        if enabled.is_empty() {
            return Vec::new();
        }

        if let Some(name) = explicit {
            if let Some(bot) = enabled.iter().find(|b| b.name() == name) {
                return vec![Arc::clone(bot)];
            }
        }
        if self.send_to_all {
            return enabled.into_iter().map(Arc::clone).collect();
        }
        if let Some(default) = &self.default_bot {
            if let Some(bot) = enabled.iter().find(|b| b.name() == default) {
                return vec![Arc::clone(bot)];
            }
        }
        vec![Arc::clone(enabled[0])]
    }

    /// 投递一条内容；返回是否至少有一个渠道接受
    pub async fn dispatch(&self, content: &str, explicit: Option<&str>) -> bool {
        if !self.enabled {
            info!(family = %self.family, "Channel family disabled, dispatch skipped");
            return false;
        }

        let targets = self.select(explicit);
        if targets.is_empty() {
            warn!(family = %self.family, "No enabled channel available");
            return false;
        }

        let mut delivered = false;
        for bot in targets {
            if self.dry_run {
                info!(family = %self.family, bot = bot.name(), "[dry-run] Would deliver");
                delivered = true;
                continue;
            }
            let result = match bot.deliver(content).await {
                Ok(r) => r,
                Err(e) => SendResult::Failed(e.to_string()),
            };
            match result {
                SendResult::Sent => {
                    info!(family = %self.family, bot = bot.name(), "Delivered");
                    delivered = true;
                }
                SendResult::Skipped(reason) => {
                    info!(family = %self.family, bot = bot.name(), reason = %reason, "Skipped");
                }
                SendResult::Failed(reason) => {
                    warn!(family = %self.family, bot = bot.name(), error = %reason, "Delivery failed");
                }
            }
        }
        delivered
    }
}
