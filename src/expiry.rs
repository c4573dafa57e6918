//! 到期策略 - 剩余天数计算与三级告警分级
//!
//! 分级只看天数，不看时分秒：
//! - 剩余 <= 15 天：Critical（含已过期的负数天）
//! - 15 < 剩余 <= 30 天：Medium
//! - 30 < 剩余 <= 告警阈值：Low
//! - 超过阈值：不告警（None）

use chrono::{DateTime, Utc};

/// 告警严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Critical,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 到期日与当前日的整天差（只比日期，时分秒忽略）
pub fn remaining_days(expire_time: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expire_time.date_naive() - now.date_naive()).num_days()
}

/// 按剩余天数分级；超过阈值返回 None（不进告警）
pub fn classify(remaining_days: i64, threshold: i64) -> Option<Severity> {
    if remaining_days > threshold {
        return None;
    }
    if remaining_days <= 15 {
        Some(Severity::Critical)
    } else if remaining_days <= 30 {
        Some(Severity::Medium)
    } else {
        Some(Severity::Low)
    }
}
