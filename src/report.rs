//! 报表渲染 - 同一份快照渲染成三种输出
//!
//! 一个渲染核心按 `RenderStyle` 参数化：风格只提供转义和标记规则，
//! 分组、过滤、严重级别到样式的映射三种风格共用。所有渲染函数返回
//! `Option<String>`，`None` 表示没有可发的内容（抑制投递，不是错误）。

use crate::expiry::{classify, Severity};
use crate::model::{BillRecord, BillSummary, Resource, ServiceMap};
use crate::snapshot::AccountSnapshot;
use chrono::{DateTime, Local, Utc};
use indexmap::IndexMap;

/// 输出风格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    /// 企业微信 markdown
    ChatMarkdown,
    /// 云之家纯文本
    PlainText,
    /// 邮件 HTML
    Html,
}

impl RenderStyle {
    /// 严重级别 -> 风格标记（markdown 字体色 / HTML class）
    fn severity_tag(self, severity: Severity) -> &'static str {
        match (self, severity) {
            (RenderStyle::ChatMarkdown, Severity::Critical) => "warning",
            (RenderStyle::ChatMarkdown, Severity::Medium) => "info",
            (RenderStyle::ChatMarkdown, Severity::Low) => "comment",
            (RenderStyle::Html, Severity::Critical) => "critical",
            (RenderStyle::Html, Severity::Medium) => "medium",
            (RenderStyle::Html, Severity::Low) => "low",
            (RenderStyle::PlainText, _) => "",
        }
    }

    fn escape(self, text: &str) -> String {
        match self {
            RenderStyle::Html => text
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;"),
            _ => text.to_string(),
        }
    }

    fn field(self, label: &str, value: &str) -> String {
        let value = self.escape(value);
        match self {
            RenderStyle::ChatMarkdown => format!("> **{label}**：{value}"),
            RenderStyle::PlainText => format!("{label}: {value}"),
            RenderStyle::Html => format!("<p><strong>{label}：</strong>{value}</p>"),
        }
    }

    fn section_heading(self, title: &str) -> String {
        let title = self.escape(title);
        match self {
            RenderStyle::ChatMarkdown => format!("### {title}"),
            RenderStyle::PlainText => format!("======= {title} ======="),
            RenderStyle::Html => format!("<h4>{title}</h4>"),
        }
    }

    fn days_value(self, remaining_days: i64, severity: Severity) -> String {
        match self {
            RenderStyle::ChatMarkdown => format!(
                "<font color='{}'>{}天</font>",
                self.severity_tag(severity),
                remaining_days
            ),
            RenderStyle::PlainText => format!("{remaining_days}天"),
            RenderStyle::Html => format!("<span class='days'>{remaining_days}天</span>"),
        }
    }
}

/// 报表生成器 - 同一实例多次渲染同一份快照产出完全一致
pub struct ReportBuilder {
    threshold: i64,
    generated_at: String,
}

impl ReportBuilder {
    pub fn new(threshold: i64) -> Self {
        Self {
            threshold,
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// 固定生成时间（测试用，也用于一次运行内多路输出共用同一时间戳）
    pub fn with_generated_at(mut self, generated_at: impl Into<String>) -> Self {
        self.generated_at = generated_at.into();
        self
    }

    /// 余额汇总：每个账号一段，现金余额加储值卡。
    /// 账号既没有余额也没有储值卡时整段省略；有余额就渲染，哪怕是零。
    pub fn balance_report(&self, snapshots: &[AccountSnapshot], style: RenderStyle) -> Option<String> {
        let mut sections = Vec::new();
        for snapshot in snapshots {
            if let Some(section) = self.balance_section(snapshot, style) {
                sections.push(section);
            }
        }
        if sections.is_empty() {
            return None;
        }

        let content = match style {
            RenderStyle::ChatMarkdown => format!(
                "## 💰 华为云账户余额汇总\n生成时间：{}\n\n{}",
                self.generated_at,
                sections.join("\n\n")
            ),
            RenderStyle::PlainText => {
                format!("华为云账户余额汇总\n{}", sections.join("\n"))
            }
            RenderStyle::Html => format!("<div class='balance'>{}</div>", sections.concat()),
        };
        Some(content)
    }

    fn balance_section(&self, snapshot: &AccountSnapshot, style: RenderStyle) -> Option<String> {
        let has_cards = snapshot
            .stored_cards
            .as_ref()
            .map(|s| !s.cards.is_empty())
            .unwrap_or(false);
        if snapshot.balance.is_none() && !has_cards {
            return None;
        }

        let mut lines = Vec::new();
        match style {
            RenderStyle::ChatMarkdown => lines.push(format!("### 账号：{}", snapshot.account_name)),
            RenderStyle::PlainText => lines.push(style.section_heading(&snapshot.account_name)),
            RenderStyle::Html => lines.push(format!(
                "<h3>{}</h3>",
                style.escape(&snapshot.account_name)
            )),
        }
        if let Some(balance) = &snapshot.balance {
            lines.push(style.field(
                "当前余额",
                &format!("{} {}", balance.total_amount, balance.currency),
            ));
        }
        if let Some(cards) = &snapshot.stored_cards {
            lines.extend(cards.cards.iter().map(|card| match style {
                RenderStyle::Html => format!(
                    "<div class='stored-card'><p><strong>{}</strong></p>\
                     <p>余额：{} CNY</p><p>面值：{} CNY</p><p>有效期至：{}</p></div>",
                    style.escape(&card.card_name),
                    card.balance,
                    card.face_value,
                    clean_timestamp(&card.expire_time)
                ),
                _ => style.field(
                    &format!("储值卡 {}", card.card_name),
                    &format!(
                        "余额 {} / 面值 {}，{} 到期",
                        card.balance,
                        card.face_value,
                        clean_timestamp(&card.expire_time)
                    ),
                ),
            }));
        }
        Some(lines.join(if style == RenderStyle::Html { "" } else { "\n" }))
    }

    /// 资源到期提醒：单账号视角。只含剩余天数不超过阈值的资源；
    /// 没有可告警资源的服务段整段省略；全账号无告警返回 None。
    pub fn resource_report(
        &self,
        account_name: &str,
        services: &ServiceMap,
        style: RenderStyle,
    ) -> Option<String> {
        let sections = self.resource_sections(services, style)?;

        let content = match style {
            RenderStyle::ChatMarkdown => format!(
                "## 📢 华为云资源到期提醒\n### 账号：<font color='info'>{account_name}</font>\n{}",
                sections.join("\n")
            ),
            RenderStyle::PlainText => format!(
                "华为云 {account_name} 资源到期提醒\n\n{}",
                sections.join("\n\n")
            ),
            RenderStyle::Html => format!(
                "<div class='account'><h2>账号：{}</h2><h3>资源信息</h3>{}</div>",
                style.escape(account_name),
                sections.concat()
            ),
        };
        Some(content)
    }

    /// 按服务类型出段；无任何告警返回 None
    fn resource_sections(&self, services: &ServiceMap, style: RenderStyle) -> Option<Vec<String>> {
        let mut sections = Vec::new();
        for (service_type, resources) in services {
            let entries: Vec<String> = resources
                .iter()
                .filter_map(|r| self.resource_entry(r, style))
                .collect();
            if entries.is_empty() {
                continue;
            }
            let section = match style {
                RenderStyle::Html => format!(
                    "<div class='service'>{}{}</div>",
                    style.section_heading(service_type),
                    entries.concat()
                ),
                _ => format!(
                    "{}\n{}",
                    style.section_heading(service_type),
                    entries.join("\n")
                ),
            };
            sections.push(section);
        }
        if sections.is_empty() {
            None
        } else {
            Some(sections)
        }
    }

    fn resource_entry(&self, resource: &Resource, style: RenderStyle) -> Option<String> {
        let severity = classify(resource.remaining_days, self.threshold)?;
        let mut fields = vec![
            style.field("名称", &resource.name),
            style.field("区域", &resource.region),
            style.field("到期时间", &format_time(resource.expire_time)),
        ];
        match style {
            RenderStyle::ChatMarkdown => fields.push(format!(
                "> **剩余天数**：{}",
                style.days_value(resource.remaining_days, severity)
            )),
            RenderStyle::PlainText => fields.push(format!(
                "剩余天数: {}",
                style.days_value(resource.remaining_days, severity)
            )),
            RenderStyle::Html => fields.push(format!(
                "<p><strong>剩余天数：</strong>{}</p>",
                style.days_value(resource.remaining_days, severity)
            )),
        }
        if !resource.project.is_empty() {
            fields.push(style.field("企业项目", &resource.project));
        }

        let entry = match style {
            RenderStyle::Html => format!(
                "<div class='resource {}'>{}</div>",
                style.severity_tag(severity),
                fields.concat()
            ),
            _ => fields.join("\n"),
        };
        Some(entry)
    }

    /// 按需账单汇总：记录按项目分桶（未标注归 default），有记录就渲染，
    /// 不做阈值过滤。
    pub fn bill_report(&self, snapshots: &[AccountSnapshot], style: RenderStyle) -> Option<String> {
        let mut sections = Vec::new();
        for snapshot in snapshots {
            let bills = match &snapshot.bills {
                Some(b) if !b.records.is_empty() => b,
                _ => continue,
            };
            sections.push(self.bill_section(&snapshot.account_name, bills, style));
        }
        if sections.is_empty() {
            return None;
        }

        let content = match style {
            RenderStyle::ChatMarkdown => {
                format!("## 💳 华为云按需账单汇总\n{}", sections.join("\n\n"))
            }
            RenderStyle::PlainText => {
                format!("华为云按需账单汇总\n{}", sections.join("\n"))
            }
            RenderStyle::Html => sections.concat(),
        };
        Some(content)
    }

    fn bill_section(&self, account_name: &str, bills: &BillSummary, style: RenderStyle) -> String {
        // 分桶保持记录到达顺序
        let mut projects: IndexMap<&str, Vec<&BillRecord>> = IndexMap::new();
        for record in &bills.records {
            projects.entry(record.project_bucket()).or_default().push(record);
        }

        let total = format!("{} {}", bills.total_amount, bills.currency);
        match style {
            RenderStyle::Html => {
                let mut html = format!(
                    "<div class='bill'><h3>账号：{}</h3><p><strong>总金额：</strong>{}</p>",
                    style.escape(account_name),
                    total
                );
                for (project, records) in &projects {
                    html.push_str(&format!(
                        "<div class='bill-project'>{}",
                        style.section_heading(&format!("项目：{project}"))
                    ));
                    for record in records {
                        html.push_str(&format!(
                            "<div class='bill-record'>{}{}{}{}</div>",
                            style.field("服务类型", &record.service_type),
                            style.field("资源", &record.resource_name),
                            style.field("区域", &record.region),
                            style.field("金额", &format!("{} {}", record.amount, bills.currency)),
                        ));
                    }
                    html.push_str("</div>");
                }
                html.push_str("</div>");
                html
            }
            _ => {
                let mut lines = match style {
                    RenderStyle::ChatMarkdown => vec![
                        format!("### 账号：{account_name}"),
                        style.field("总金额", &total),
                    ],
                    _ => vec![
                        style.section_heading(account_name),
                        style.field("总金额", &total),
                    ],
                };
                for (project, records) in &projects {
                    match style {
                        RenderStyle::ChatMarkdown => lines.push(format!("#### 项目:{project}")),
                        _ => lines.push(format!("--- 项目: {project} ---")),
                    }
                    for record in records {
                        lines.push(style.field("服务类型", &record.service_type));
                        lines.push(style.field("资源", &record.resource_name));
                        lines.push(style.field("区域", &record.region));
                        lines.push(
                            style.field("金额", &format!("{} {}", record.amount, bills.currency)),
                        );
                    }
                }
                lines.join("\n")
            }
        }
    }

    /// 完整 HTML 报告（邮件正文）
    ///
    /// 余额段独立渲染（有就展示）；账单 + 资源告警合并判断，两者都为空
    /// 时整份文档抑制（返回 None）。
    pub fn html_report(&self, snapshots: &[AccountSnapshot]) -> Option<String> {
        let balance = self.balance_report(snapshots, RenderStyle::Html);
        let bills = self.bill_report(snapshots, RenderStyle::Html);

        let mut alert_sections = Vec::new();
        for snapshot in snapshots {
            if let Some(services) = &snapshot.resources {
                if let Some(section) =
                    self.resource_report(&snapshot.account_name, services, RenderStyle::Html)
                {
                    alert_sections.push(section);
                }
            }
        }

        if bills.is_none() && alert_sections.is_empty() {
            return None;
        }

        let mut body = format!(
            "<h1>📢华为云资源和账单监控报告</h1>\
             <p class='meta-info'>生成时间：{}</p>",
            self.generated_at
        );
        if let Some(balance) = balance {
            body.push_str("<h2>💳 账户余额汇总</h2>");
            body.push_str(&balance);
        }
        if let Some(bills) = bills {
            body.push_str("<h2>💰 按需计费账单汇总</h2>");
            body.push_str(&bills);
        }
        if !alert_sections.is_empty() {
            body.push_str("<h2>⚠️ 资源到期提醒</h2>");
            body.push_str(&alert_sections.concat());
        }

        Some(format!(
            "<html><head><style>{STYLE_SHEET}</style></head><body>{body}</body></html>"
        ))
    }
}

/// 到期时间展示格式
fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 接口原样返回的时间串里去掉 T/Z
fn clean_timestamp(raw: &str) -> String {
    raw.replace('T', " ").replace('Z', "")
}

const STYLE_SHEET: &str = "\
body{font-family:Arial,sans-serif;line-height:1.6;color:#333;max-width:1200px;margin:0 auto;padding:20px}\
h1{color:#1a73e8;border-bottom:2px solid #1a73e8;padding-bottom:10px}\
h2{color:#202124;margin-top:30px}\
h3{color:#1a73e8;margin-top:20px}\
.meta-info{color:#5f6368;font-size:.9em;margin-bottom:20px}\
.account{background:#f8f9fa;border-radius:8px;padding:20px;margin-bottom:30px;box-shadow:0 2px 4px rgba(0,0,0,.1)}\
.balance{background:#e8f0fe;padding:15px;border-radius:6px;margin-bottom:20px}\
.stored-card{background:white;padding:10px;margin:10px 0;border-radius:4px;border-left:4px solid #4caf50}\
.service{margin-bottom:20px}\
.resource{background:white;padding:15px;margin:10px 0;border-radius:6px;border-left:4px solid #1a73e8}\
.resource p{margin:5px 0}\
.critical{border-left:4px solid #f44336}\
.critical .days{color:#f44336;font-weight:bold}\
.medium{border-left:4px solid #fb8c00}\
.medium .days{color:#fb8c00;font-weight:bold}\
.low .days{color:#1a73e8;font-weight:bold}\
.bill{background:#e3f2fd;padding:15px;border-radius:6px;margin-bottom:20px}\
.bill-project{background:white;padding:15px;margin:10px 0;border-radius:6px;border-left:4px solid #2196f3}\
.bill-record{margin:10px 0;padding:10px;background:#f5f5f5;border-radius:4px}";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Balance, StoredCard, StoredCardSummary, SubAccountBalance};
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const THRESHOLD: i64 = 65;

    fn builder() -> ReportBuilder {
        ReportBuilder::new(THRESHOLD).with_generated_at("2026-08-26 09:30:00")
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn resource(name: &str, remaining_days: i64) -> Resource {
        Resource {
            name: name.to_string(),
            id: format!("id-{name}"),
            service_type: "弹性云服务器".to_string(),
            region: "cn-north-1".to_string(),
            expire_time: Utc.with_ymd_and_hms(2026, 9, 5, 0, 0, 0).unwrap(),
            project: "default".to_string(),
            remaining_days,
        }
    }

    fn balance(amount: &str) -> Balance {
        Balance {
            total_amount: dec(amount),
            currency: "CNY".to_string(),
            accounts: vec![SubAccountBalance {
                account_id: "a".to_string(),
                account_type: 1,
                amount: dec(amount),
                currency: "CNY".to_string(),
                designated_amount: Decimal::ZERO,
                credit_amount: Decimal::ZERO,
            }],
        }
    }

    fn bill(project: Option<&str>, service: &str, amount: &str) -> BillRecord {
        BillRecord {
            project_name: project.map(str::to_string),
            service_type: service.to_string(),
            resource_name: "vm-1".to_string(),
            region: "cn-north-1".to_string(),
            amount: dec(amount),
        }
    }

    fn snapshot(name: &str) -> AccountSnapshot {
        AccountSnapshot {
            account_name: name.to_string(),
            resources: None,
            balance: None,
            bills: None,
            stored_cards: None,
        }
    }

    #[test]
    fn test_balance_report_zero_balance_still_renders() {
        let mut s = snapshot("生产账号");
        s.balance = Some(balance("0"));
        let report = builder()
            .balance_report(&[s], RenderStyle::ChatMarkdown)
            .unwrap();
        assert!(report.contains("生产账号"));
        assert!(report.contains("0 CNY"));
    }

    #[test]
    fn test_balance_report_omits_account_without_balance_or_cards() {
        let mut with = snapshot("有余额");
        with.balance = Some(balance("5.00"));
        let without = snapshot("无余额");
        let report = builder()
            .balance_report(&[with, without], RenderStyle::PlainText)
            .unwrap();
        assert!(report.contains("有余额"));
        assert!(!report.contains("无余额"));
    }

    #[test]
    fn test_balance_report_nothing_to_send() {
        assert!(builder()
            .balance_report(&[snapshot("空")], RenderStyle::ChatMarkdown)
            .is_none());
        assert!(builder().balance_report(&[], RenderStyle::Html).is_none());
    }

    #[test]
    fn test_balance_report_includes_stored_cards() {
        let mut s = snapshot("acct");
        s.stored_cards = Some(StoredCardSummary::from_cards(vec![StoredCard {
            card_id: "c1".to_string(),
            card_name: "代金卡".to_string(),
            face_value: dec("100"),
            balance: dec("42.50"),
            effective_time: "2025-01-01T00:00:00Z".to_string(),
            expire_time: "2027-01-01T00:00:00Z".to_string(),
        }]));
        let report = builder()
            .balance_report(&[s], RenderStyle::ChatMarkdown)
            .unwrap();
        assert!(report.contains("代金卡"));
        assert!(report.contains("42.50"));
        assert!(report.contains("2027-01-01 00:00:00"));
    }

    #[test]
    fn test_resource_report_filters_beyond_threshold() {
        let mut services = ServiceMap::new();
        services.insert(
            "弹性云服务器".to_string(),
            vec![resource("vm-alert", 10), resource("vm-quiet", 66)],
        );
        let report = builder()
            .resource_report("acct", &services, RenderStyle::ChatMarkdown)
            .unwrap();
        assert!(report.contains("vm-alert"));
        assert!(!report.contains("vm-quiet"));
    }

    #[test]
    fn test_resource_report_critical_scenario() {
        // vm-1 十天后到期，阈值 65 -> CRITICAL，出现在服务段里
        let mut services = ServiceMap::new();
        services.insert("弹性云服务器".to_string(), vec![resource("vm-1", 10)]);
        let report = builder()
            .resource_report("acct", &services, RenderStyle::ChatMarkdown)
            .unwrap();
        assert!(report.contains("### 弹性云服务器"));
        assert!(report.contains("<font color='warning'>10天</font>"));
    }

    #[test]
    fn test_resource_report_omits_empty_service_section() {
        let mut services = ServiceMap::new();
        services.insert("云数据库".to_string(), vec![resource("db-quiet", 200)]);
        services.insert("弹性云服务器".to_string(), vec![resource("vm-alert", 5)]);
        let report = builder()
            .resource_report("acct", &services, RenderStyle::PlainText)
            .unwrap();
        assert!(!report.contains("云数据库"));
        assert!(report.contains("弹性云服务器"));
    }

    #[test]
    fn test_resource_report_nothing_alertable() {
        let mut services = ServiceMap::new();
        services.insert("弹性云服务器".to_string(), vec![resource("vm-quiet", 300)]);
        assert!(builder()
            .resource_report("acct", &services, RenderStyle::Html)
            .is_none());
        assert!(builder()
            .resource_report("acct", &ServiceMap::new(), RenderStyle::ChatMarkdown)
            .is_none());
    }

    #[test]
    fn test_resource_report_preserves_insertion_order() {
        let mut services = ServiceMap::new();
        services.insert("乙服务".to_string(), vec![resource("b-1", 5)]);
        services.insert("甲服务".to_string(), vec![resource("a-1", 5)]);
        let report = builder()
            .resource_report("acct", &services, RenderStyle::PlainText)
            .unwrap();
        let b_pos = report.find("乙服务").unwrap();
        let a_pos = report.find("甲服务").unwrap();
        assert!(b_pos < a_pos);
    }

    #[test]
    fn test_resource_report_expired_resource_renders_negative_days() {
        let mut services = ServiceMap::new();
        services.insert("弹性云服务器".to_string(), vec![resource("vm-dead", -3)]);
        let report = builder()
            .resource_report("acct", &services, RenderStyle::Html)
            .unwrap();
        assert!(report.contains("class='resource critical'"));
        assert!(report.contains("-3天"));
    }

    #[test]
    fn test_bill_report_groups_by_project_in_order() {
        let mut s = snapshot("acct");
        s.bills = Some(BillSummary::from_records(
            vec![
                bill(Some("prod"), "弹性云服务器", "1.00"),
                bill(None, "对象存储", "2.00"),
                bill(Some("prod"), "云数据库", "3.00"),
            ],
            "CNY",
        ));
        let report = builder()
            .bill_report(&[s], RenderStyle::ChatMarkdown)
            .unwrap();
        let prod_pos = report.find("项目:prod").unwrap();
        let default_pos = report.find("项目:default").unwrap();
        assert!(prod_pos < default_pos);
        // prod 桶内保持到达顺序
        let ecs = report.find("弹性云服务器").unwrap();
        let rds = report.find("云数据库").unwrap();
        assert!(ecs < rds);
        assert!(report.contains("6.00 CNY"));
    }

    #[test]
    fn test_bill_report_no_records_nothing_to_send() {
        let mut s = snapshot("acct");
        s.bills = Some(BillSummary::from_records(vec![], "CNY"));
        assert!(builder().bill_report(&[s], RenderStyle::PlainText).is_none());
        assert!(builder().bill_report(&[], RenderStyle::Html).is_none());
    }

    #[test]
    fn test_html_report_suppressed_without_bills_or_alerts() {
        let mut s = snapshot("acct");
        s.balance = Some(balance("100.00"));
        let mut services = ServiceMap::new();
        services.insert("弹性云服务器".to_string(), vec![resource("vm-quiet", 300)]);
        s.resources = Some(services);
        // 余额在，但没有账单也没有告警 -> 整份文档抑制
        assert!(builder().html_report(&[s]).is_none());
    }

    #[test]
    fn test_html_report_balance_rides_along_with_alerts() {
        let mut s = snapshot("acct");
        s.balance = Some(balance("100.00"));
        let mut services = ServiceMap::new();
        services.insert("弹性云服务器".to_string(), vec![resource("vm-1", 10)]);
        s.resources = Some(services);
        let html = builder().html_report(&[s]).unwrap();
        assert!(html.contains("账户余额汇总"));
        assert!(html.contains("资源到期提醒"));
        assert!(html.contains("vm-1"));
        assert!(html.contains("<style>"));
    }

    #[test]
    fn test_html_report_bills_alone_produce_document() {
        let mut s = snapshot("acct");
        s.bills = Some(BillSummary::from_records(
            vec![bill(None, "对象存储", "0.42")],
            "CNY",
        ));
        let html = builder().html_report(&[s]).unwrap();
        assert!(html.contains("按需计费账单汇总"));
        assert!(!html.contains("资源到期提醒"));
    }

    #[test]
    fn test_html_escapes_markup_in_names() {
        let mut s = snapshot("a<b>&c");
        s.balance = Some(balance("1.00"));
        s.bills = Some(BillSummary::from_records(
            vec![bill(None, "对象存储", "0.42")],
            "CNY",
        ));
        let html = builder().html_report(&[s]).unwrap();
        assert!(html.contains("a&lt;b&gt;&amp;c"));
    }

    #[test]
    fn test_renderers_are_idempotent() {
        let mut s = snapshot("acct");
        s.balance = Some(balance("10.00"));
        let mut services = ServiceMap::new();
        services.insert("弹性云服务器".to_string(), vec![resource("vm-1", 10)]);
        s.resources = Some(services);
        s.bills = Some(BillSummary::from_records(
            vec![bill(Some("prod"), "弹性云服务器", "1.00")],
            "CNY",
        ));
        let snapshots = vec![s];
        let b = builder();
        assert_eq!(
            b.balance_report(&snapshots, RenderStyle::ChatMarkdown),
            b.balance_report(&snapshots, RenderStyle::ChatMarkdown)
        );
        assert_eq!(b.html_report(&snapshots), b.html_report(&snapshots));
        assert_eq!(
            b.bill_report(&snapshots, RenderStyle::PlainText),
            b.bill_report(&snapshots, RenderStyle::PlainText)
        );
    }

    #[test]
    fn test_empty_snapshot_list_nothing_to_send_everywhere() {
        let b = builder();
        assert!(b.balance_report(&[], RenderStyle::ChatMarkdown).is_none());
        assert!(b.bill_report(&[], RenderStyle::PlainText).is_none());
        assert!(b.html_report(&[]).is_none());
    }
}
