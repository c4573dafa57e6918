//! 配置 - 从环境变量装载（支持 .env）
//!
//! 账号和机器人都按下标枚举：ACCOUNT1_NAME/AK/SK、WEWORK_BOT1_NAME/
//! WEBHOOK/ENABLED……遇到第一个缺失的下标停止。

use crate::model::Account;
use crate::notify::SmtpSettings;
use anyhow::{bail, Result};
use std::env;
use tracing::info;

/// 单个 webhook 机器人的配置
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub name: String,
    pub webhook: String,
    pub enabled: bool,
}

/// 一个 webhook 渠道族（企业微信 / 云之家）的配置
#[derive(Debug, Clone, Default)]
pub struct WebhookGroupConfig {
    pub enabled: bool,
    pub send_to_all: bool,
    pub default_bot: String,
    pub bots: Vec<BotConfig>,
}

/// 数据库配置
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// 邮件配置
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub settings: SmtpSettings,
}

/// 全量运行配置
#[derive(Debug, Clone)]
pub struct Config {
    pub accounts: Vec<Account>,
    pub db: DbConfig,
    pub wework: WebhookGroupConfig,
    pub yunzhijia: WebhookGroupConfig,
    pub smtp: SmtpConfig,
    /// 资源告警阈值（天）
    pub alert_days: i64,
}

impl Config {
    /// 从进程环境装载
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意查找函数装载（测试注入用）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).unwrap_or_default();
        let get_or = |key: &str, default: &str| {
            lookup(key).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
        };
        let get_bool = |key: &str| get(key).to_lowercase() == "true";

        let mut accounts = Vec::new();
        for index in 1.. {
            let name = get(&format!("ACCOUNT{index}_NAME"));
            let ak = get(&format!("ACCOUNT{index}_AK"));
            let sk = get(&format!("ACCOUNT{index}_SK"));
            if name.is_empty() || ak.is_empty() || sk.is_empty() {
                break;
            }
            accounts.push(Account::new(name, ak, sk));
        }

        let load_bots = |prefix: &str| {
            let mut bots = Vec::new();
            for index in 1.. {
                let name = get(&format!("{prefix}_BOT{index}_NAME"));
                let webhook = get(&format!("{prefix}_BOT{index}_WEBHOOK"));
                if name.is_empty() && webhook.is_empty() {
                    break;
                }
                bots.push(BotConfig {
                    enabled: get_bool(&format!("{prefix}_BOT{index}_ENABLED")),
                    name,
                    webhook,
                });
            }
            bots
        };

        let wework = WebhookGroupConfig {
            enabled: get_bool("WEWORK_ENABLED"),
            send_to_all: get_bool("WEWORK_SEND_TO_ALL"),
            default_bot: get("WEWORK_DEFAULT_BOT"),
            bots: load_bots("WEWORK"),
        };
        let yunzhijia = WebhookGroupConfig {
            enabled: get_bool("YUNZHIJIA_ENABLED"),
            send_to_all: get_bool("YUNZHIJIA_SEND_TO_ALL"),
            default_bot: get("YUNZHIJIA_DEFAULT_BOT"),
            bots: load_bots("YUNZHIJIA"),
        };

        let smtp = SmtpConfig {
            enabled: get_bool("SMTP_ENABLED"),
            settings: SmtpSettings {
                server: get("SMTP_SERVER"),
                port: get_or("SMTP_PORT", "465").parse().unwrap_or(465),
                username: get("SMTP_USERNAME"),
                password: get("SMTP_PASSWORD"),
                from: get("SMTP_FROM"),
                to: get("SMTP_TO")
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
                use_ssl: get_or("EMAIL_USE_SSL", "true").to_lowercase() == "true",
            },
        };

        let db = DbConfig {
            enabled: get_bool("ENABLE_DATABASE"),
            host: get_or("DB_HOST", "localhost"),
            port: get_or("DB_PORT", "3306").parse().unwrap_or(3306),
            user: get_or("DB_USER", "root"),
            password: get("DB_PASSWORD"),
            database: get_or("DB_NAME", "huaweicloud_monitor"),
        };

        Self {
            accounts,
            db,
            wework,
            yunzhijia,
            smtp,
            alert_days: get_or("RESOURCE_ALERT_DAYS", "65").parse().unwrap_or(65),
        }
    }

    /// 校验配置有效性
    pub fn validate(&self) -> Result<()> {
        if self.accounts.is_empty() {
            bail!("no account configured (ACCOUNT1_NAME/AK/SK)");
        }
        if self.db.enabled && (self.db.host.is_empty() || self.db.user.is_empty()) {
            bail!("database enabled but DB_HOST/DB_USER incomplete");
        }
        if self.wework.enabled && !self.wework.bots.iter().any(|b| !b.webhook.is_empty()) {
            bail!("WeCom enabled but no bot webhook configured");
        }
        if self.yunzhijia.enabled && !self.yunzhijia.bots.iter().any(|b| !b.webhook.is_empty()) {
            bail!("Yunzhijia enabled but no bot webhook configured");
        }
        if self.smtp.enabled {
            let s = &self.smtp.settings;
            if s.server.is_empty()
                || s.username.is_empty()
                || s.password.is_empty()
                || s.from.is_empty()
                || s.to.is_empty()
            {
                bail!("SMTP enabled but configuration incomplete");
            }
        }
        Ok(())
    }

    /// 启动时把配置摘要打进日志
    pub fn log_summary(&self) {
        info!(accounts = self.accounts.len(), "Accounts discovered");
        if self.db.enabled {
            info!(host = %self.db.host, port = self.db.port, database = %self.db.database, "Database enabled");
        } else {
            info!("Database disabled");
        }
        info!(
            enabled = self.wework.enabled,
            bots = self.wework.bots.len(),
            send_to_all = self.wework.send_to_all,
            default = %self.wework.default_bot,
            "WeCom channel"
        );
        info!(
            enabled = self.yunzhijia.enabled,
            bots = self.yunzhijia.bots.len(),
            send_to_all = self.yunzhijia.send_to_all,
            default = %self.yunzhijia.default_bot,
            "Yunzhijia channel"
        );
        if self.smtp.enabled {
            info!(
                server = %self.smtp.settings.server,
                port = self.smtp.settings.port,
                recipients = self.smtp.settings.to.len(),
                "Email channel enabled"
            );
        } else {
            info!("Email channel disabled");
        }
        info!(days = self.alert_days, "Resource alert threshold");
    }
}
