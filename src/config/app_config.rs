//! # 应用配置定义

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::database::DatabaseConfig;

/// 错误信息展示格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorFormat {
    /// 彩色、带上下文的完整输出
    #[default]
    Pretty,
    /// 完整输出但不带 ANSI 颜色
    Colorless,
    /// 仅一行错误消息
    Minimal,
}

/// 事务隔离级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    #[default]
    Serializable,
}

impl From<IsolationLevel> for sea_orm::IsolationLevel {
    fn from(level: IsolationLevel) -> Self {
        match level {
            IsolationLevel::ReadUncommitted => Self::ReadUncommitted,
            IsolationLevel::ReadCommitted => Self::ReadCommitted,
            IsolationLevel::RepeatableRead => Self::RepeatableRead,
            IsolationLevel::Serializable => Self::Serializable,
        }
    }
}

/// 事务默认参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// 事务开始前的最长排队等待（毫秒）
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
    /// 事务最长执行时间（毫秒）
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// 默认隔离级别
    #[serde(default)]
    pub isolation_level: IsolationLevel,
}

const fn default_max_wait_ms() -> u64 {
    2_000
}

const fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            max_wait_ms: default_max_wait_ms(),
            timeout_ms: default_timeout_ms(),
            isolation_level: IsolationLevel::default(),
        }
    }
}

impl TransactionConfig {
    #[must_use]
    pub const fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// 日志配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别（trace / debug / info / warn / error）
    pub level: Option<String>,
    /// 是否输出 SQL 查询日志
    #[serde(default)]
    pub log_queries: bool,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub transaction: TransactionConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// 错误展示格式
    #[serde(default)]
    pub error_format: ErrorFormat,
    /// 按表名的全局字段忽略规则：命中的字段从 JSON 投影结果中剔除
    /// （如 `users = ["password_hash"]`）
    #[serde(default)]
    pub omit: HashMap<String, Vec<String>>,
}
