//! 通知层 - 统一渠道接口与分发
//!
//! 所有机器人/邮件实现同一个 `Channel` trait；`ChannelGroup` 按选择
//! 策略决定一条内容投给哪些渠道。单个渠道失败只算它自己的失败。

pub mod channel;
pub mod dispatcher;
pub mod email;
pub mod wework;
pub mod yunzhijia;

pub use channel::{Channel, SendResult};
pub use dispatcher::ChannelGroup;
pub use email::{EmailChannel, SmtpSettings};
pub use wework::WeworkBot;
pub use yunzhijia::YunzhijiaBot;
