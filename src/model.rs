//! 数据模型 - 账号、资源、余额、储值卡、账单

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 华为云账号凭证（只读，不落库，下游记录只引用 name）
#[derive(Debug, Clone)]
pub struct Account {
    pub name: String,
    pub access_key: String,
    pub secret_key: String,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

/// 一条计费/到期资源
///
/// `remaining_days` 是派生值，始终按日期差重新计算，可能为负（已到期）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub id: String,
    pub service_type: String,
    pub region: String,
    pub expire_time: DateTime<Utc>,
    /// 企业项目，缺失时由聚合器补为 "default"
    pub project: String,
    pub remaining_days: i64,
}

/// 按服务类型分组的资源映射（保持插入顺序，渲染顺序依赖它）
pub type ServiceMap = IndexMap<String, Vec<Resource>>;

/// 子账户余额明细
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubAccountBalance {
    pub account_id: String,
    /// 1 = 主账户
    pub account_type: i32,
    pub amount: Decimal,
    pub currency: String,
    pub designated_amount: Decimal,
    pub credit_amount: Decimal,
}

impl SubAccountBalance {
    pub fn is_main(&self) -> bool {
        self.account_type == 1
    }
}

/// 账户现金余额
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub total_amount: Decimal,
    pub currency: String,
    pub accounts: Vec<SubAccountBalance>,
}

impl Balance {
    /// 从子账户明细构造：取主账户的金额和币种，找不到则按零初始化
    pub fn from_sub_accounts(accounts: Vec<SubAccountBalance>) -> Self {
        let (total_amount, currency) = accounts
            .iter()
            .find(|a| a.is_main())
            .map(|a| (a.amount, a.currency.clone()))
            .unwrap_or((Decimal::ZERO, "CNY".to_string()));
        Self {
            total_amount,
            currency,
            accounts,
        }
    }
}

/// 储值卡
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCard {
    pub card_id: String,
    pub card_name: String,
    pub face_value: Decimal,
    pub balance: Decimal,
    pub effective_time: String,
    pub expire_time: String,
}

/// 储值卡汇总
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredCardSummary {
    pub cards: Vec<StoredCard>,
    pub total_balance: Decimal,
}

impl StoredCardSummary {
    pub fn from_cards(cards: Vec<StoredCard>) -> Self {
        let total_balance = cards.iter().map(|c| c.balance).sum();
        Self {
            cards,
            total_balance,
        }
    }
}

/// 一条按需消费记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillRecord {
    pub project_name: Option<String>,
    pub service_type: String,
    pub resource_name: String,
    pub region: String,
    pub amount: Decimal,
}

impl BillRecord {
    /// 项目分组键：未标注项目的记录归入 "default" 桶
    pub fn project_bucket(&self) -> &str {
        match self.project_name.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => "default",
        }
    }
}

/// 账单汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillSummary {
    pub records: Vec<BillRecord>,
    pub total_amount: Decimal,
    pub currency: String,
}

impl BillSummary {
    pub fn from_records(records: Vec<BillRecord>, currency: impl Into<String>) -> Self {
        let total_amount = records.iter().map(|r| r.amount).sum();
        Self {
            records,
            total_amount,
            currency: currency.into(),
        }
    }
}
