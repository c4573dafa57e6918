//! 运行编排 - 一次完整巡检：逐账号采集、落库，最后统一分发报告
//!
//! 账号之间互不影响，采集失败的账号照常出现在报告里（对应字段缺失）。
//! 落库是尽力而为：单条写失败记日志继续，绝不中断本批次。

use crate::fetch::CloudFetcher;
use crate::model::Account;
use crate::notify::ChannelGroup;
use crate::recorder::Recorder;
use crate::report::{RenderStyle, ReportBuilder};
use crate::snapshot::{aggregate, AccountSnapshot, BatchId};
use anyhow::Result;
use chrono::Local;
use tracing::{error, info, warn};

/// 本次运行要用的渠道族
pub struct Channels {
    pub chat: Option<ChannelGroup>,
    pub im: Option<ChannelGroup>,
    pub email: Option<ChannelGroup>,
}

/// 一次运行的统计结果
#[derive(Debug, Default)]
pub struct RunSummary {
    pub accounts_total: usize,
    pub accounts_failed: usize,
    pub resources_saved: usize,
    pub bills_saved: usize,
    pub reports_dispatched: usize,
}

/// 巡检编排器
pub struct Runner<F: CloudFetcher> {
    fetcher: F,
    recorder: Option<Box<dyn Recorder>>,
    channels: Channels,
    alert_days: i64,
}

impl<F: CloudFetcher> Runner<F> {
    pub fn new(
        fetcher: F,
        recorder: Option<Box<dyn Recorder>>,
        channels: Channels,
        alert_days: i64,
    ) -> Self {
        Self {
            fetcher,
            recorder,
            channels,
            alert_days,
        }
    }

    /// 跑完一个批次：采集 -> 落库 -> 分发
    pub async fn run(&self, accounts: &[Account]) -> Result<RunSummary> {
        let batch = BatchId::generate();
        let cycle = Local::now().format("%Y-%m").to_string();
        info!(batch = %batch, cycle = %cycle, accounts = accounts.len(), "Run started");

        let mut summary = RunSummary {
            accounts_total: accounts.len(),
            ..Default::default()
        };

        let mut snapshots = Vec::with_capacity(accounts.len());
        for account in accounts {
            info!(account = %account.name, "Collecting account data");
            let snapshot = self.collect(account, &cycle).await;
            if snapshot.resources.is_none()
                && snapshot.balance.is_none()
                && snapshot.bills.is_none()
                && snapshot.stored_cards.is_none()
            {
                summary.accounts_failed += 1;
                warn!(account = %account.name, "All queries failed for account");
            }
            if let Some(recorder) = &self.recorder {
                self.record(recorder.as_ref(), &snapshot, &cycle, &batch, &mut summary)
                    .await;
            }
            snapshots.push(snapshot);
        }

        summary.reports_dispatched = self.dispatch(&snapshots).await;
        info!(
            batch = %batch,
            failed_accounts = summary.accounts_failed,
            resources_saved = summary.resources_saved,
            bills_saved = summary.bills_saved,
            reports = summary.reports_dispatched,
            "Run finished"
        );
        Ok(summary)
    }

    /// 五路查询按顺序各跑一次，失败的路在快照里留空
    async fn collect(&self, account: &Account, cycle: &str) -> AccountSnapshot {
        let resources = self.fetcher.fetch_resources(account).await;
        let balance = self.fetcher.fetch_balance(account).await;
        let stored_cards = self.fetcher.fetch_stored_cards(account).await;
        let bills = self.fetcher.fetch_bills(account, cycle).await;
        let certificates = self.fetcher.fetch_certificates(account).await;
        aggregate(
            &account.name,
            resources,
            balance,
            stored_cards,
            bills,
            certificates,
        )
    }

    /// 把一个账号的快照写进历史库，逐实体尽力而为
    async fn record(
        &self,
        recorder: &dyn Recorder,
        snapshot: &AccountSnapshot,
        cycle: &str,
        batch: &BatchId,
        summary: &mut RunSummary,
    ) {
        let account = &snapshot.account_name;

        if let Some(services) = &snapshot.resources {
            for resource in services.values().flatten() {
                match recorder.save_resource(account, resource, batch).await {
                    Ok(()) => summary.resources_saved += 1,
                    Err(e) => {
                        error!(account = %account, resource = %resource.name, error = %e, "Failed to save resource")
                    }
                }
            }
        }

        if let Some(balance) = &snapshot.balance {
            if let Err(e) = recorder.save_balance(account, balance, batch).await {
                error!(account = %account, error = %e, "Failed to save balance");
            }
        }

        if let Some(bills) = &snapshot.bills {
            for record in &bills.records {
                match recorder
                    .save_bill(account, record, cycle, &bills.currency, batch)
                    .await
                {
                    Ok(()) => summary.bills_saved += 1,
                    Err(e) => {
                        error!(account = %account, resource = %record.resource_name, error = %e, "Failed to save bill record")
                    }
                }
            }
        }

        if let Some(cards) = &snapshot.stored_cards {
            for card in &cards.cards {
                if let Err(e) = recorder.save_stored_card(account, card, batch).await {
                    error!(account = %account, card = %card.card_id, error = %e, "Failed to save stored card");
                }
            }
        }
    }

    /// 全部账号采完后统一分发三类输出
    async fn dispatch(&self, snapshots: &[AccountSnapshot]) -> usize {
        let builder = ReportBuilder::new(self.alert_days);
        let mut dispatched = 0;

        if let Some(chat) = &self.channels.chat {
            dispatched += self
                .dispatch_text(chat, &builder, snapshots, RenderStyle::ChatMarkdown)
                .await;
        }
        if let Some(im) = &self.channels.im {
            dispatched += self
                .dispatch_text(im, &builder, snapshots, RenderStyle::PlainText)
                .await;
        }
        if let Some(email) = &self.channels.email {
            if let Some(html) = builder.html_report(snapshots) {
                if email.dispatch(&html, None).await {
                    dispatched += 1;
                }
            } else {
                info!("HTML report empty, email skipped");
            }
        }
        dispatched
    }

    /// 一个文本渠道族要发的三类消息：余额、各账号资源告警、账单
    async fn dispatch_text(
        &self,
        group: &ChannelGroup,
        builder: &ReportBuilder,
        snapshots: &[AccountSnapshot],
        style: RenderStyle,
    ) -> usize {
        let mut dispatched = 0;

        if let Some(balance) = builder.balance_report(snapshots, style) {
            if group.dispatch(&balance, None).await {
                dispatched += 1;
            }
        }
        for snapshot in snapshots {
            if let Some(services) = &snapshot.resources {
                if let Some(report) =
                    builder.resource_report(&snapshot.account_name, services, style)
                {
                    if group.dispatch(&report, None).await {
                        dispatched += 1;
                    }
                }
            }
        }
        if let Some(bills) = builder.bill_report(snapshots, style) {
            if group.dispatch(&bills, None).await {
                dispatched += 1;
            }
        }
        dispatched
    }
}
