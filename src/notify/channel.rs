//! 渠道 trait 定义

use anyhow::Result;
use async_trait::async_trait;

/// 投递结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 投递成功
    Sent,
    /// 跳过（渠道未启用或 dry-run）
    Skipped(String),
    /// 投递失败（非 2xx 或传输异常）
    Failed(String),
}

/// 通知渠道 - 一个命名的、可独立启停的投递目标
#[async_trait]
pub trait Channel: Send + Sync {
    /// 渠道名（用于日志和显式指定）
    fn name(&self) -> &str;

    /// 是否启用
    fn enabled(&self) -> bool;

    /// 投递一条已渲染的内容，阻塞等待一次网络往返
    async fn deliver(&self, content: &str) -> Result<SendResult>;
}
