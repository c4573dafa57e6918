//! 查询层 - 五类数据各一个查询，统一返回 `FetchOutcome`
//!
//! 每个查询独立失败：凭证错误、限流等供应商错误在这一层被转换成
//! `FetchError`，不会越过查询边界向上抛。

pub mod bss;
pub mod signer;

use crate::model::{Account, Balance, BillSummary, Resource, ServiceMap, StoredCardSummary};
use async_trait::async_trait;
use thiserror::Error;

/// 查询失败原因
#[derive(Debug, Error)]
pub enum FetchError {
    /// 供应商 API 返回的错误（带状态码和错误码）
    #[error("api error: status={status_code} code={error_code} msg={error_msg}")]
    Api {
        status_code: u16,
        request_id: String,
        error_code: String,
        error_msg: String,
    },
    /// 传输层或解析等意外错误
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

/// 单次查询结果：成功带数据，失败带 `FetchError`，二者必居其一
pub type FetchOutcome<T> = Result<T, FetchError>;

/// 云端查询接口 - 每个方法对应一类数据，阻塞等待一次网络往返
#[async_trait]
pub trait CloudFetcher: Send + Sync {
    /// 按需/包周期资源，按服务类型分组（保持 API 返回顺序）
    async fn fetch_resources(&self, account: &Account) -> FetchOutcome<ServiceMap>;

    /// 账户现金余额
    async fn fetch_balance(&self, account: &Account) -> FetchOutcome<Balance>;

    /// 可用储值卡
    async fn fetch_stored_cards(&self, account: &Account) -> FetchOutcome<StoredCardSummary>;

    /// 指定账期的按需账单明细
    async fn fetch_bills(&self, account: &Account, cycle: &str) -> FetchOutcome<BillSummary>;

    /// SSL 证书（已过期或无到期时间的证书被过滤掉）
    async fn fetch_certificates(&self, account: &Account) -> FetchOutcome<Vec<Resource>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display_carries_codes() {
        let err = FetchError::Api {
            status_code: 401,
            request_id: "req-1".to_string(),
            error_code: "CBC.0150".to_string(),
            error_msg: "auth failed".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("CBC.0150"));
        assert!(text.contains("auth failed"));
    }
}
