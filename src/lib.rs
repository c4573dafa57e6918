//! Huaweicloud Monitor - 华为云资源到期与账单巡检

pub mod config;
pub mod expiry;
pub mod fetch;
pub mod model;
pub mod notify;
pub mod recorder;
pub mod report;
pub mod runner;
pub mod snapshot;

pub use config::Config;
pub use expiry::{classify, remaining_days, Severity};
pub use fetch::{bss::BssFetcher, CloudFetcher, FetchError, FetchOutcome};
pub use model::{
    Account, Balance, BillRecord, BillSummary, Resource, ServiceMap, StoredCard,
    StoredCardSummary,
};
pub use notify::{Channel, ChannelGroup, EmailChannel, SendResult, WeworkBot, YunzhijiaBot};
pub use recorder::{mysql::MySqlRecorder, Recorder, RecorderError};
pub use report::{RenderStyle, ReportBuilder};
pub use runner::{Channels, RunSummary, Runner};
pub use snapshot::{aggregate, AccountSnapshot, BatchId};
