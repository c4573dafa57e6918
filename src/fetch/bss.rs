//! 华为云 BSS v2 / SCM v3 查询实现
//!
//! 走 REST 接口 + SDK-HMAC-SHA256 签名。每次调用一次往返、固定超时，
//! 供应商错误转成 `FetchError::Api`，其余归入 `FetchError::Transport`。

use super::signer::{self, SigningInput};
use super::{CloudFetcher, FetchError, FetchOutcome};
use crate::expiry;
use crate::model::{
    Account, Balance, BillRecord, BillSummary, Resource, ServiceMap, StoredCard,
    StoredCardSummary, SubAccountBalance,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, Method};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_BSS_HOST: &str = "bss.myhuaweicloud.com";
const DEFAULT_SCM_HOST: &str = "scm.cn-north-4.myhuaweicloud.com";
/// SSL 证书是全局资源，固定记签发区域
const DEFAULT_SCM_REGION: &str = "cn-north-4";

/// BSS/SCM 查询客户端配置
#[derive(Debug, Clone)]
pub struct BssConfig {
    pub bss_host: String,
    pub scm_host: String,
    pub scm_region: String,
    /// 单次调用超时（秒）
    pub timeout_secs: u64,
}

impl Default for BssConfig {
    fn default() -> Self {
        Self {
            bss_host: DEFAULT_BSS_HOST.to_string(),
            scm_host: DEFAULT_SCM_HOST.to_string(),
            scm_region: DEFAULT_SCM_REGION.to_string(),
            timeout_secs: 30,
        }
    }
}

/// 华为云查询客户端
pub struct BssFetcher {
    client: Client,
    config: BssConfig,
}

impl BssFetcher {
    pub fn new(config: BssConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        account: &Account,
        method: Method,
        host: &str,
        path: &str,
        query: &str,
        body: Option<&serde_json::Value>,
    ) -> FetchOutcome<T> {
        let body_bytes = match body {
            Some(b) => serde_json::to_vec(b).map_err(|e| FetchError::Transport(e.to_string()))?,
            None => Vec::new(),
        };

        let signature = signer::sign(
            &SigningInput {
                method: method.as_str(),
                host,
                path,
                query,
                content_type: "application/json",
                body: &body_bytes,
                timestamp: Utc::now(),
            },
            &account.access_key,
            &account.secret_key,
        )?;

        let url = if query.is_empty() {
            format!("https://{host}{path}")
        } else {
            format!("https://{host}{path}?{query}")
        };
        debug!(method = %method, url = %url, "Calling provider API");

        let mut request = self
            .client
            .request(method, &url)
            .header("Content-Type", "application/json")
            .header("X-Sdk-Date", &signature.sdk_date)
            .header("Authorization", &signature.authorization);
        if !body_bytes.is_empty() {
            request = request.body(body_bytes);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let request_id = response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let error: ApiErrorBody = response.json().await.unwrap_or_default();
            return Err(FetchError::Api {
                status_code: status.as_u16(),
                request_id,
                error_code: error.error_code,
                error_msg: error.error_msg,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Transport(format!("response parse failed: {e}")))
    }
}

#[async_trait]
impl CloudFetcher for BssFetcher {
    async fn fetch_resources(&self, account: &Account) -> FetchOutcome<ServiceMap> {
        // 仅查有效主资源
        let body = json!({
            "limit": 100,
            "status_list": [2],
            "only_main_resource": 1,
        });
        let response: ResourcesResponse = self
            .request(
                account,
                Method::POST,
                &self.config.bss_host,
                "/v2/resources/pay-per-use-resources/query",
                "",
                Some(&body),
            )
            .await?;

        let services = map_resources(response.data, Utc::now());
        let count: usize = services.values().map(Vec::len).sum();
        info!(
            account = %account.name,
            resources = count,
            services = services.len(),
            "Resource query succeeded"
        );
        Ok(services)
    }

    async fn fetch_balance(&self, account: &Account) -> FetchOutcome<Balance> {
        let response: BalancesResponse = self
            .request(
                account,
                Method::GET,
                &self.config.bss_host,
                "/v2/accounts/customer-accounts/balances",
                "",
                None,
            )
            .await?;

        let balance = Balance::from_sub_accounts(
            response
                .account_balances
                .into_iter()
                .map(RawSubBalance::into_model)
                .collect(),
        );
        info!(
            account = %account.name,
            amount = %balance.total_amount,
            currency = %balance.currency,
            "Balance query succeeded"
        );
        Ok(balance)
    }

    async fn fetch_stored_cards(&self, account: &Account) -> FetchOutcome<StoredCardSummary> {
        // status=1：只查可使用的储值卡
        let response: StoredCardsResponse = self
            .request(
                account,
                Method::GET,
                &self.config.bss_host,
                "/v2/promotions/benefits/stored-value-cards",
                "status=1",
                None,
            )
            .await?;

        let summary = StoredCardSummary::from_cards(
            response
                .stored_value_cards
                .into_iter()
                .map(RawStoredCard::into_model)
                .collect(),
        );
        info!(
            account = %account.name,
            cards = summary.cards.len(),
            "Stored card query succeeded"
        );
        Ok(summary)
    }

    async fn fetch_bills(&self, account: &Account, cycle: &str) -> FetchOutcome<BillSummary> {
        // 按需计费（charge_mode=3），只查自身账单，不含零元记录
        let body = json!({
            "cycle": cycle,
            "charge_mode": 3,
            "include_zero_record": false,
            "method": "oneself",
            "limit": 1000,
            "offset": 0,
        });
        let response: BillsResponse = self
            .request(
                account,
                Method::POST,
                &self.config.bss_host,
                "/v2/bills/customer-bills/res-records/query",
                "",
                Some(&body),
            )
            .await?;

        let currency = if response.currency.is_empty() {
            "CNY".to_string()
        } else {
            response.currency
        };
        let records: Vec<BillRecord> = response
            .monthly_records
            .into_iter()
            .map(RawBillRecord::into_model)
            .collect();
        info!(account = %account.name, records = records.len(), cycle = %cycle, "Bill query succeeded");
        Ok(BillSummary::from_records(records, currency))
    }

    async fn fetch_certificates(&self, account: &Account) -> FetchOutcome<Vec<Resource>> {
        let response: CertificatesResponse = self
            .request(
                account,
                Method::GET,
                &self.config.scm_host,
                "/v3/scm/certificates",
                "",
                None,
            )
            .await?;

        let certificates =
            map_certificates(response.certificates, &self.config.scm_region, Utc::now());
        info!(
            account = %account.name,
            certificates = certificates.len(),
            "Certificate query succeeded"
        );
        Ok(certificates)
    }
}

fn map_resources(raw: Vec<RawResource>, now: DateTime<Utc>) -> ServiceMap {
    let mut services = ServiceMap::new();
    for resource in raw {
        let expire_time = match parse_bss_time(&resource.expire_time) {
            Some(t) => t,
            None => {
                warn!(
                    resource = %resource.resource_id,
                    expire_time = %resource.expire_time,
                    "Unparsable expire time, resource skipped"
                );
                continue;
            }
        };
        let name = match resource.resource_name {
            Some(n) if !n.is_empty() => n,
            _ => "未命名".to_string(),
        };
        let entry = Resource {
            name,
            id: resource.resource_id,
            service_type: resource.service_type_name.clone(),
            region: resource.region_code,
            expire_time,
            project: resource
                .enterprise_project
                .map(|p| p.name)
                .unwrap_or_default(),
            remaining_days: expiry::remaining_days(expire_time, now),
        };
        services
            .entry(resource.service_type_name)
            .or_default()
            .push(entry);
    }
    services
}

fn map_certificates(raw: Vec<RawCertificate>, region: &str, now: DateTime<Utc>) -> Vec<Resource> {
    let mut certificates = Vec::new();
    for cert in raw {
        if cert.status == "EXPIRED" {
            continue;
        }
        let expire_time = match cert.expire_time.as_deref().and_then(parse_scm_time) {
            Some(t) => t,
            None => continue,
        };
        certificates.push(Resource {
            name: cert.name,
            id: cert.id,
            service_type: "SSL证书".to_string(),
            region: region.to_string(),
            expire_time,
            project: cert.enterprise_project_id.unwrap_or_default(),
            remaining_days: expiry::remaining_days(expire_time, now),
        });
    }
    certificates
}

/// BSS 时间格式："2026-03-01T00:00:00Z"
fn parse_bss_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%SZ")
        .ok()
        .map(|t| t.and_utc())
}

/// SCM 时间格式："2026-03-01 00:00:00.0"
fn parse_scm_time(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.split('.').next().unwrap_or(value);
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|t| t.and_utc())
}

fn decimal_from_f64(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or_default()
}

fn decimal_from_str(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap_or_default()
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    error_msg: String,
}

#[derive(Debug, Deserialize)]
struct ResourcesResponse {
    #[serde(default)]
    data: Vec<RawResource>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(default)]
    resource_name: Option<String>,
    #[serde(default)]
    resource_id: String,
    #[serde(default)]
    service_type_name: String,
    #[serde(default)]
    enterprise_project: Option<EnterpriseProject>,
    #[serde(default)]
    region_code: String,
    #[serde(default)]
    expire_time: String,
}

#[derive(Debug, Deserialize)]
struct EnterpriseProject {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct BalancesResponse {
    #[serde(default)]
    account_balances: Vec<RawSubBalance>,
}

#[derive(Debug, Deserialize)]
struct RawSubBalance {
    #[serde(default)]
    account_id: String,
    #[serde(default)]
    account_type: i32,
    #[serde(default)]
    amount: f64,
    #[serde(default)]
    currency: String,
    #[serde(default)]
    designated_amount: f64,
    #[serde(default)]
    credit_amount: f64,
}

impl RawSubBalance {
    fn into_model(self) -> SubAccountBalance {
        SubAccountBalance {
            account_id: self.account_id,
            account_type: self.account_type,
            amount: decimal_from_f64(self.amount),
            currency: self.currency,
            designated_amount: decimal_from_f64(self.designated_amount),
            credit_amount: decimal_from_f64(self.credit_amount),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StoredCardsResponse {
    #[serde(default)]
    stored_value_cards: Vec<RawStoredCard>,
}

#[derive(Debug, Deserialize)]
struct RawStoredCard {
    #[serde(default)]
    card_id: String,
    #[serde(default)]
    card_name: String,
    /// 接口返回字符串金额
    #[serde(default)]
    face_value: String,
    #[serde(default)]
    balance: String,
    #[serde(default)]
    effective_time: String,
    #[serde(default)]
    expire_time: String,
}

impl RawStoredCard {
    fn into_model(self) -> StoredCard {
        StoredCard {
            card_id: self.card_id,
            card_name: self.card_name,
            face_value: decimal_from_str(&self.face_value),
            balance: decimal_from_str(&self.balance),
            effective_time: self.effective_time,
            expire_time: self.expire_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BillsResponse {
    #[serde(default)]
    currency: String,
    #[serde(default)]
    monthly_records: Vec<RawBillRecord>,
}

#[derive(Debug, Deserialize)]
struct RawBillRecord {
    #[serde(default)]
    enterprise_project_name: Option<String>,
    #[serde(default)]
    cloud_service_type_name: String,
    #[serde(default)]
    resource_name: Option<String>,
    #[serde(default)]
    product_spec_desc: Option<String>,
    #[serde(default)]
    region_name: String,
    #[serde(default)]
    consume_amount: f64,
}

impl RawBillRecord {
    fn into_model(self) -> BillRecord {
        // 资源名缺失时退回产品规格描述
        let resource_name = self
            .resource_name
            .filter(|n| !n.is_empty())
            .or(self.product_spec_desc)
            .unwrap_or_default();
        BillRecord {
            project_name: self.enterprise_project_name,
            service_type: self.cloud_service_type_name,
            resource_name,
            region: self.region_name,
            amount: decimal_from_f64(self.consume_amount),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CertificatesResponse {
    #[serde(default)]
    certificates: Vec<RawCertificate>,
}

#[derive(Debug, Deserialize)]
struct RawCertificate {
    #[serde(default)]
    name: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    expire_time: Option<String>,
    #[serde(default)]
    enterprise_project_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 26, 8, 0, 0).unwrap()
    }

    fn raw_resource(name: Option<&str>, service: &str, expire: &str) -> RawResource {
        RawResource {
            resource_name: name.map(str::to_string),
            resource_id: "res-1".to_string(),
            service_type_name: service.to_string(),
            enterprise_project: None,
            region_code: "cn-north-1".to_string(),
            expire_time: expire.to_string(),
        }
    }

    #[test]
    fn test_map_resources_groups_in_arrival_order() {
        let raw = vec![
            raw_resource(Some("vm-1"), "弹性云服务器", "2026-09-05T00:00:00Z"),
            raw_resource(Some("db-1"), "云数据库", "2026-09-10T00:00:00Z"),
            raw_resource(Some("vm-2"), "弹性云服务器", "2026-09-06T00:00:00Z"),
        ];
        let services = map_resources(raw, now());
        assert_eq!(services.len(), 2);
        assert_eq!(services.get_index(0).unwrap().0, "弹性云服务器");
        assert_eq!(services["弹性云服务器"].len(), 2);
        assert_eq!(services["弹性云服务器"][0].name, "vm-1");
        assert_eq!(services["弹性云服务器"][0].remaining_days, 10);
    }

    #[test]
    fn test_map_resources_unnamed_fallback() {
        let raw = vec![raw_resource(None, "弹性云服务器", "2026-09-05T00:00:00Z")];
        let services = map_resources(raw, now());
        assert_eq!(services["弹性云服务器"][0].name, "未命名");
    }

    #[test]
    fn test_map_resources_skips_unparsable_time() {
        let raw = vec![raw_resource(Some("vm-1"), "弹性云服务器", "not-a-date")];
        assert!(map_resources(raw, now()).is_empty());
    }

    #[test]
    fn test_map_certificates_filters_expired_and_missing_time() {
        let cert = |status: &str, expire: Option<&str>| RawCertificate {
            name: "example.com".to_string(),
            id: "cert-1".to_string(),
            status: status.to_string(),
            expire_time: expire.map(str::to_string),
            enterprise_project_id: None,
        };
        let raw = vec![
            cert("ISSUED", Some("2026-10-01 00:00:00.0")),
            cert("EXPIRED", Some("2026-01-01 00:00:00.0")),
            cert("ISSUED", None),
        ];
        let certificates = map_certificates(raw, "cn-north-4", now());
        assert_eq!(certificates.len(), 1);
        assert_eq!(certificates[0].service_type, "SSL证书");
        assert_eq!(certificates[0].region, "cn-north-4");
        assert_eq!(certificates[0].remaining_days, 36);
    }

    #[test]
    fn test_parse_times() {
        assert!(parse_bss_time("2026-03-01T00:00:00Z").is_some());
        assert!(parse_scm_time("2026-03-01 00:00:00.0").is_some());
        assert!(parse_scm_time("2026-03-01 00:00:00").is_some());
        assert!(parse_bss_time("garbage").is_none());
    }

    #[test]
    fn test_bill_record_falls_back_to_spec_desc() {
        let raw = RawBillRecord {
            enterprise_project_name: None,
            cloud_service_type_name: "弹性云服务器".to_string(),
            resource_name: Some(String::new()),
            product_spec_desc: Some("通用计算型".to_string()),
            region_name: "华北-北京一".to_string(),
            consume_amount: 3.14,
        };
        let record = raw.into_model();
        assert_eq!(record.resource_name, "通用计算型");
        assert_eq!(record.amount.to_string(), "3.14");
    }
}
