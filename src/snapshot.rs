//! 快照聚合 - 把一个账号的五路查询结果合成一份 `AccountSnapshot`
//!
//! 各路查询独立成败：余额查询失败不影响资源聚合，失败的那一路
//! 在快照里就是 None，绝不出现半填充字段。

use crate::fetch::FetchOutcome;
use crate::model::{Balance, BillSummary, Resource, ServiceMap, StoredCardSummary};
use chrono::Local;
use tracing::warn;

/// 批次号 - 一次运行一个，打在该次运行落库的每一行上
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchId(String);

impl BatchId {
    /// 以运行开始时间生成（秒级时间戳串）
    pub fn generate() -> Self {
        Self(Local::now().format("%Y%m%d%H%M%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 单个账号在一个批次内的聚合视图，构造后不再修改
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    pub account_name: String,
    pub resources: Option<ServiceMap>,
    pub balance: Option<Balance>,
    pub bills: Option<BillSummary>,
    pub stored_cards: Option<StoredCardSummary>,
}

/// 聚合五路查询结果
///
/// 证书并入资源映射（证书也是一种到期资源）；缺企业项目的资源在
/// 离开聚合器前统一补成 "default"。
pub fn aggregate(
    account_name: &str,
    resources: FetchOutcome<ServiceMap>,
    balance: FetchOutcome<Balance>,
    stored_cards: FetchOutcome<StoredCardSummary>,
    bills: FetchOutcome<BillSummary>,
    certificates: FetchOutcome<Vec<Resource>>,
) -> AccountSnapshot {
    let resources = log_failed(account_name, "resources", resources);
    let balance = log_failed(account_name, "balance", balance);
    let stored_cards = log_failed(account_name, "stored_cards", stored_cards);
    let bills = log_failed(account_name, "bills", bills);
    let certificates = log_failed(account_name, "certificates", certificates);

    // 资源和证书有一路成功就有资源映射；两路都失败才是 None
    let mut merged: Option<ServiceMap> = resources;
    if let Some(certs) = certificates {
        let map = merged.get_or_insert_with(ServiceMap::new);
        for cert in certs {
            map.entry(cert.service_type.clone()).or_default().push(cert);
        }
    }

    if let Some(map) = merged.as_mut() {
        for resource in map.values_mut().flatten() {
            if resource.project.is_empty() {
                resource.project = "default".to_string();
            }
        }
    }

    AccountSnapshot {
        account_name: account_name.to_string(),
        resources: merged,
        balance,
        bills,
        stored_cards,
    }
}

fn log_failed<T>(account: &str, kind: &str, outcome: FetchOutcome<T>) -> Option<T> {
    match outcome {
        Ok(data) => Some(data),
        Err(e) => {
            warn!(account = %account, kind = %kind, error = %e, "Query failed, field left absent");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::model::SubAccountBalance;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn resource(name: &str, service_type: &str, project: &str) -> Resource {
        Resource {
            name: name.to_string(),
            id: format!("id-{name}"),
            service_type: service_type.to_string(),
            region: "cn-north-1".to_string(),
            expire_time: Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap(),
            project: project.to_string(),
            remaining_days: 36,
        }
    }

    fn transport_err<T>() -> FetchOutcome<T> {
        Err(FetchError::Transport("connection refused".to_string()))
    }

    fn some_balance() -> FetchOutcome<Balance> {
        Ok(Balance::from_sub_accounts(vec![SubAccountBalance {
            account_id: "a".to_string(),
            account_type: 1,
            amount: Decimal::new(10050, 2),
            currency: "CNY".to_string(),
            designated_amount: Decimal::ZERO,
            credit_amount: Decimal::ZERO,
        }]))
    }

    #[test]
    fn test_aggregate_independent_per_kind() {
        let mut services = ServiceMap::new();
        services.insert("弹性云服务器".to_string(), vec![resource("vm-1", "弹性云服务器", "prod")]);

        let snapshot = aggregate(
            "生产账号",
            Ok(services),
            transport_err(),
            transport_err(),
            transport_err(),
            Ok(vec![]),
        );

        assert!(snapshot.resources.is_some());
        assert!(snapshot.balance.is_none());
        assert!(snapshot.bills.is_none());
        assert!(snapshot.stored_cards.is_none());
    }

    #[test]
    fn test_aggregate_defaults_missing_project() {
        let mut services = ServiceMap::new();
        services.insert(
            "弹性云服务器".to_string(),
            vec![resource("vm-1", "弹性云服务器", ""), resource("vm-2", "弹性云服务器", "prod")],
        );

        let snapshot = aggregate(
            "acct",
            Ok(services),
            some_balance(),
            transport_err(),
            transport_err(),
            transport_err(),
        );

        let resources = &snapshot.resources.unwrap()["弹性云服务器"];
        assert_eq!(resources[0].project, "default");
        assert_eq!(resources[1].project, "prod");
    }

    #[test]
    fn test_aggregate_merges_certificates_into_resources() {
        let mut services = ServiceMap::new();
        services.insert("弹性云服务器".to_string(), vec![resource("vm-1", "弹性云服务器", "prod")]);
        let cert = resource("example.com", "SSL证书", "default");

        let snapshot = aggregate(
            "acct",
            Ok(services),
            transport_err(),
            transport_err(),
            transport_err(),
            Ok(vec![cert]),
        );

        let map = snapshot.resources.unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["SSL证书"][0].name, "example.com");
        // 插入顺序：先资源后证书
        assert_eq!(map.get_index(0).unwrap().0, "弹性云服务器");
    }

    #[test]
    fn test_aggregate_certificates_alone_form_resource_map() {
        let cert = resource("example.com", "SSL证书", "default");
        let snapshot = aggregate(
            "acct",
            transport_err(),
            transport_err(),
            transport_err(),
            transport_err(),
            Ok(vec![cert]),
        );
        let map = snapshot.resources.unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("SSL证书"));
    }

    #[test]
    fn test_aggregate_all_failed_leaves_resources_absent() {
        let snapshot = aggregate(
            "acct",
            transport_err::<ServiceMap>(),
            transport_err(),
            transport_err(),
            transport_err(),
            transport_err(),
        );
        assert!(snapshot.resources.is_none());
    }

    #[test]
    fn test_batch_id_format() {
        let id = BatchId::generate();
        assert_eq!(id.as_str().len(), 14);
        assert!(id.as_str().chars().all(|c| c.is_ascii_digit()));
    }
}
