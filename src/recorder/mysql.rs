//! MySQL 落库实现（sqlx 连接池）
//!
//! 连接按逻辑操作从池里取用即还，不跨多次 save 持有。

use super::{validate_resource, Recorder, RecorderError};
use crate::config::DbConfig;
use crate::model::{Balance, BillRecord, Resource, StoredCard};
use crate::snapshot::BatchId;
use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::info;

/// 固定的四张历史表
const TABLE_DDL: [&str; 4] = [
    r"CREATE TABLE IF NOT EXISTS resources (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        account_name VARCHAR(64) NOT NULL,
        resource_name VARCHAR(255) NOT NULL,
        resource_id VARCHAR(64) NOT NULL,
        service_type VARCHAR(64) NOT NULL,
        region VARCHAR(64) NOT NULL,
        expire_time DATETIME NOT NULL,
        project_name VARCHAR(64) NOT NULL,
        remaining_days INT NOT NULL,
        batch_number VARCHAR(14) NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        INDEX idx_account_batch (account_name, batch_number)
    ) DEFAULT CHARACTER SET utf8mb4",
    r"CREATE TABLE IF NOT EXISTS account_balances (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        account_name VARCHAR(64) NOT NULL,
        total_amount DECIMAL(18,2) NOT NULL,
        currency VARCHAR(8) NOT NULL,
        batch_number VARCHAR(14) NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        INDEX idx_account_batch (account_name, batch_number)
    ) DEFAULT CHARACTER SET utf8mb4",
    r"CREATE TABLE IF NOT EXISTS account_bills (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        account_name VARCHAR(64) NOT NULL,
        project_name VARCHAR(64) NOT NULL,
        service_type VARCHAR(64) NOT NULL,
        resource_name VARCHAR(255) NOT NULL,
        region VARCHAR(64) NOT NULL,
        amount DECIMAL(18,2) NOT NULL,
        currency VARCHAR(8) NOT NULL,
        cycle VARCHAR(7) NOT NULL,
        batch_number VARCHAR(14) NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        INDEX idx_account_batch (account_name, batch_number)
    ) DEFAULT CHARACTER SET utf8mb4",
    r"CREATE TABLE IF NOT EXISTS stored_cards (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        account_name VARCHAR(64) NOT NULL,
        card_id VARCHAR(64) NOT NULL,
        card_name VARCHAR(255) NOT NULL,
        face_value DECIMAL(18,2) NOT NULL,
        balance DECIMAL(18,2) NOT NULL,
        effective_time VARCHAR(32) NOT NULL,
        expire_time VARCHAR(32) NOT NULL,
        batch_number VARCHAR(14) NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        INDEX idx_account_batch (account_name, batch_number)
    ) DEFAULT CHARACTER SET utf8mb4",
];

/// MySQL 历史记录存储
pub struct MySqlRecorder {
    pool: MySqlPool,
    database: String,
}

impl MySqlRecorder {
    /// 连接目标库；库不存在时先通过一条服务器级连接建出来
    pub async fn connect(config: &DbConfig) -> Result<Self, RecorderError> {
        let server_url = format!(
            "mysql://{}:{}@{}:{}",
            config.user, config.password, config.host, config.port
        );
        let bootstrap = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&server_url)
            .await?;
        sqlx::query(&create_database_sql(&config.database))
            .execute(&bootstrap)
            .await?;
        bootstrap.close().await;

        let pool = MySqlPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&format!("{server_url}/{}", config.database))
            .await?;
        info!(host = %config.host, database = %config.database, "MySQL connection pool established");

        Ok(Self {
            pool,
            database: config.database.clone(),
        })
    }
}

fn create_database_sql(database: &str) -> String {
    format!(
        "CREATE DATABASE IF NOT EXISTS `{database}` \
         DEFAULT CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci"
    )
}

#[async_trait]
impl Recorder for MySqlRecorder {
    async fn ensure_database_exists(&self) -> Result<(), RecorderError> {
        sqlx::query(&create_database_sql(&self.database))
            .execute(&self.pool)
            .await?;
        info!(database = %self.database, "Database checked/created");
        Ok(())
    }

    async fn ensure_tables_exist(&self) -> Result<(), RecorderError> {
        for ddl in TABLE_DDL {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        info!(tables = TABLE_DDL.len(), "Tables checked/created");
        Ok(())
    }

    async fn save_resource(
        &self,
        account: &str,
        resource: &Resource,
        batch: &BatchId,
    ) -> Result<(), RecorderError> {
        validate_resource(resource)?;
        sqlx::query(
            "INSERT INTO resources \
             (account_name, resource_name, resource_id, service_type, region, \
              expire_time, project_name, remaining_days, batch_number) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(account)
        .bind(&resource.name)
        .bind(&resource.id)
        .bind(&resource.service_type)
        .bind(&resource.region)
        .bind(resource.expire_time)
        .bind(&resource.project)
        .bind(resource.remaining_days)
        .bind(batch.as_str())
        .execute(&self.pool)
        .await?;
        info!(account = %account, resource = %resource.name, "Resource saved");
        Ok(())
    }

    async fn save_balance(
        &self,
        account: &str,
        balance: &Balance,
        batch: &BatchId,
    ) -> Result<(), RecorderError> {
        sqlx::query(
            "INSERT INTO account_balances \
             (account_name, total_amount, currency, batch_number) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(account)
        .bind(balance.total_amount)
        .bind(&balance.currency)
        .bind(batch.as_str())
        .execute(&self.pool)
        .await?;
        info!(
            account = %account,
            amount = %balance.total_amount,
            currency = %balance.currency,
            "Balance saved"
        );
        Ok(())
    }

    async fn save_bill(
        &self,
        account: &str,
        record: &BillRecord,
        cycle: &str,
        currency: &str,
        batch: &BatchId,
    ) -> Result<(), RecorderError> {
        sqlx::query(
            "INSERT INTO account_bills \
             (account_name, project_name, service_type, resource_name, region, \
              amount, currency, cycle, batch_number) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(account)
        .bind(record.project_bucket())
        .bind(&record.service_type)
        .bind(&record.resource_name)
        .bind(&record.region)
        .bind(record.amount)
        .bind(currency)
        .bind(cycle)
        .bind(batch.as_str())
        .execute(&self.pool)
        .await?;
        info!(account = %account, service = %record.service_type, "Bill record saved");
        Ok(())
    }

    async fn save_stored_card(
        &self,
        account: &str,
        card: &StoredCard,
        batch: &BatchId,
    ) -> Result<(), RecorderError> {
        sqlx::query(
            "INSERT INTO stored_cards \
             (account_name, card_id, card_name, face_value, balance, \
              effective_time, expire_time, batch_number) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(account)
        .bind(&card.card_id)
        .bind(&card.card_name)
        .bind(card.face_value)
        .bind(card.balance)
        .bind(&card.effective_time)
        .bind(&card.expire_time)
        .bind(batch.as_str())
        .execute(&self.pool)
        .await?;
        info!(account = %account, card = %card.card_name, "Stored card saved");
        Ok(())
    }
}
