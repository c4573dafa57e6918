//! 历史落库 - 每个批次按实体追加写入，只插入不更新
//!
//! 单个实体保存失败由调用方捕获并记日志，不影响同批次其他实体。

pub mod mysql;

use crate::model::{Balance, BillRecord, Resource, StoredCard};
use crate::snapshot::BatchId;
use async_trait::async_trait;
use thiserror::Error;

/// 落库错误
#[derive(Debug, Error)]
pub enum RecorderError {
    /// 必填字段缺失，写入前的强制校验
    #[error("resource is missing required fields: {fields:?}")]
    Validation { fields: Vec<&'static str> },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// 历史记录存储接口
///
/// 四个 save 各自幂等安全（每实体调用一次），相互之间不保证原子。
#[async_trait]
pub trait Recorder: Send + Sync {
    /// 建库（不存在则建），每次进程启动调用一次
    async fn ensure_database_exists(&self) -> Result<(), RecorderError>;

    /// 建表（固定四张：resources、account_balances、account_bills、stored_cards）
    async fn ensure_tables_exist(&self) -> Result<(), RecorderError>;

    async fn save_resource(
        &self,
        account: &str,
        resource: &Resource,
        batch: &BatchId,
    ) -> Result<(), RecorderError>;

    async fn save_balance(
        &self,
        account: &str,
        balance: &Balance,
        batch: &BatchId,
    ) -> Result<(), RecorderError>;

    async fn save_bill(
        &self,
        account: &str,
        record: &BillRecord,
        cycle: &str,
        currency: &str,
        batch: &BatchId,
    ) -> Result<(), RecorderError>;

    async fn save_stored_card(
        &self,
        account: &str,
        card: &StoredCard,
        batch: &BatchId,
    ) -> Result<(), RecorderError>;
}

/// 资源完整性校验，任何 Recorder 实现都必须在写入前调用
pub fn validate_resource(resource: &Resource) -> Result<(), RecorderError> {
    let mut fields = Vec::new();
    if resource.name.is_empty() {
        fields.push("name");
    }
    if resource.id.is_empty() {
        fields.push("id");
    }
    if resource.service_type.is_empty() {
        fields.push("service_type");
    }
    if resource.region.is_empty() {
        fields.push("region");
    }
    if resource.project.is_empty() {
        fields.push("project");
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(RecorderError::Validation { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn resource() -> Resource {
        Resource {
            name: "vm-1".to_string(),
            id: "res-1".to_string(),
            service_type: "弹性云服务器".to_string(),
            region: "cn-north-1".to_string(),
            expire_time: Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap(),
            project: "default".to_string(),
            remaining_days: 36,
        }
    }

    #[test]
    fn test_validate_complete_resource() {
        assert!(validate_resource(&resource()).is_ok());
    }

    #[test]
    fn test_validate_reports_all_missing_fields() {
        let mut r = resource();
        r.id.clear();
        r.region.clear();
        match validate_resource(&r) {
            Err(RecorderError::Validation { fields }) => {
                assert_eq!(fields, vec!["id", "region"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_missing_project() {
        let mut r = resource();
        r.project.clear();
        assert!(matches!(
            validate_resource(&r),
            Err(RecorderError::Validation { .. })
        ));
    }
}
