//! # 错误类型定义

use thiserror::Error;

/// 数据访问层主要错误类型
#[derive(Debug, Error)]
pub enum DataError {
    /// `find_unique_or_throw` / `find_first_or_throw` 未命中任何记录
    #[error("记录未找到: {entity}")]
    NotFound { entity: String },

    /// 插入/更新与唯一索引冲突，fields 为冲突的字段集合
    #[error("唯一约束冲突: {fields:?}")]
    UniqueViolation {
        fields: Vec<String>,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 外键指向的关联记录不存在
    #[error("外键约束冲突: {message}")]
    ForeignKeyViolation {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 非法的查询/变更文档（如 select 与 include 同时提供、
    /// groupBy 的 orderBy 引用了未分组字段等），在执行任何 SQL 之前拒绝
    #[error("参数校验失败: {message}")]
    Validation { message: String },

    /// 底层存储引擎错误（连接失败、SQL 执行失败等）
    #[error("存储引擎错误: {message}")]
    Engine {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 配置相关错误
    #[error("配置错误: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 事务排队/执行超时
    #[error("事务超时: {message}")]
    TransactionTimeout { message: String },

    /// 带上下文信息的包装错误
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<DataError>,
    },
}

impl DataError {
    /// 创建 NotFound 错误
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }

    /// 创建参数校验错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// 创建存储引擎错误
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带源错误的存储引擎错误
    pub fn engine_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Engine {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建配置错误
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带源错误的配置错误
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建事务超时错误
    pub fn transaction_timeout(message: impl Into<String>) -> Self {
        Self::TransactionTimeout {
            message: message.into(),
        }
    }

    /// 是否为唯一约束冲突
    #[must_use]
    pub const fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    /// 是否为记录未找到
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<toml::de::Error> for DataError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML 解析失败", err)
    }
}
