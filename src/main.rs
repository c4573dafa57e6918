//! Huaweicloud Monitor CLI
//!
//! 巡检华为云账号的到期资源、余额、储值卡、账单和 SSL 证书，
//! 落库历史记录并推送企业微信 / 云之家 / 邮件报告

use anyhow::Result;
use clap::{Parser, Subcommand};
use huaweicloud_monitor::config::{BotConfig, Config, SmtpConfig, WebhookGroupConfig};
use huaweicloud_monitor::fetch::bss::{BssConfig, BssFetcher};
use huaweicloud_monitor::notify::{Channel, ChannelGroup, EmailChannel, WeworkBot, YunzhijiaBot};
use huaweicloud_monitor::recorder::mysql::MySqlRecorder;
use huaweicloud_monitor::recorder::Recorder;
use huaweicloud_monitor::runner::{Channels, Runner};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "hwc-monitor")]
#[command(about = "华为云资源到期与账单巡检")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 执行一次完整巡检（采集、落库、推送）。
    /// 部分失败只记日志、退出码仍为 0；所有账号全部失败才以非零码退出
    Run {
        /// 只采集和渲染，不真正推送
        #[arg(long)]
        dry_run: bool,
        /// 本次运行跳过数据库写入
        #[arg(long)]
        no_db: bool,
    },
    /// 校验配置并打印摘要，不发起任何网络调用
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // 日志级别由 RUST_LOG 控制，默认 info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("huaweicloud_monitor=info,hwc_monitor=info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Run { dry_run, no_db } => run(config, dry_run, no_db).await,
        Commands::CheckConfig => {
            config.validate()?;
            config.log_summary();
            info!("Configuration OK");
            Ok(())
        }
    }
}

async fn run(config: Config, dry_run: bool, no_db: bool) -> Result<()> {
    config.validate()?;
    config.log_summary();
    if dry_run {
        info!("Dry-run mode: reports will be rendered but not delivered");
    }

    let fetcher = BssFetcher::new(BssConfig::default())?;

    let recorder: Option<Box<dyn Recorder>> = if config.db.enabled && !no_db {
        match MySqlRecorder::connect(&config.db).await {
            Ok(recorder) => {
                recorder.ensure_database_exists().await?;
                recorder.ensure_tables_exist().await?;
                Some(Box::new(recorder))
            }
            Err(e) => {
                // 数据库连不上不阻断巡检，本次只是不留历史
                error!(error = %e, "Database unavailable, history recording disabled for this run");
                None
            }
        }
    } else {
        if config.db.enabled && no_db {
            info!("Database writes skipped (--no-db)");
        }
        None
    };

    let channels = Channels {
        chat: webhook_group("wework", &config.wework, dry_run, |bot| {
            WeworkBot::new(&bot.name, &bot.webhook, bot.enabled)
                .map(|b| Arc::new(b) as Arc<dyn Channel>)
        }),
        im: webhook_group("yunzhijia", &config.yunzhijia, dry_run, |bot| {
            YunzhijiaBot::new(&bot.name, &bot.webhook, bot.enabled)
                .map(|b| Arc::new(b) as Arc<dyn Channel>)
        }),
        email: email_group(&config.smtp, dry_run),
    };

    let runner = Runner::new(fetcher, recorder, channels, config.alert_days);
    let summary = runner.run(&config.accounts).await?;

    if summary.accounts_failed == summary.accounts_total {
        anyhow::bail!(
            "all {} accounts failed, exiting non-zero (partial failure would exit 0)",
            summary.accounts_total
        );
    }
    Ok(())
}

/// 按配置装配一个 webhook 渠道族；族未启用返回 None
fn webhook_group<B>(
    family: &str,
    config: &WebhookGroupConfig,
    dry_run: bool,
    build: B,
) -> Option<ChannelGroup>
where
    B: Fn(&BotConfig) -> Result<Arc<dyn Channel>>,
{
    if !config.enabled {
        return None;
    }
    let mut group = ChannelGroup::new(family, true)
        .with_send_to_all(config.send_to_all)
        .with_default_bot(&config.default_bot)
        .with_dry_run(dry_run);
    for bot in &config.bots {
        match build(bot) {
            Ok(channel) => group.register(channel),
            Err(e) => warn!(family = %family, bot = %bot.name, error = %e, "Bot skipped"),
        }
    }
    Some(group)
}

fn email_group(config: &SmtpConfig, dry_run: bool) -> Option<ChannelGroup> {
    if !config.enabled {
        return None;
    }
    let mut group = ChannelGroup::new("email", true).with_dry_run(dry_run);
    match EmailChannel::new(config.settings.clone(), true) {
        Ok(channel) => group.register(Arc::new(channel)),
        Err(e) => warn!(error = %e, "Email channel skipped"),
    }
    Some(group)
}
