//! # Sea-ORM 错误分类
//!
//! 将底层 `DbErr` 归类到数据访问层的错误分类（唯一冲突 / 外键冲突 / 引擎错误）

use sea_orm::{DbErr, SqlErr, TransactionError};

use super::types::DataError;

impl From<DbErr> for DataError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::UniqueViolation {
                fields: extract_constraint_fields(&message),
                source: Some(err.into()),
            },
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => Self::ForeignKeyViolation {
                message,
                source: Some(err.into()),
            },
            _ => match err {
                DbErr::RecordNotFound(entity) => Self::NotFound { entity },
                other => Self::Engine {
                    message: other.to_string(),
                    source: Some(other.into()),
                },
            },
        }
    }
}

impl From<TransactionError<DataError>> for DataError {
    fn from(err: TransactionError<DataError>) -> Self {
        match err {
            TransactionError::Connection(db_err) => db_err.into(),
            TransactionError::Transaction(data_err) => data_err,
        }
    }
}

/// 从驱动返回的错误文本中提取冲突字段名。
///
/// SQLite 报 `UNIQUE constraint failed: likes.post_id, likes.user_id`，
/// Postgres 报 `duplicate key value violates unique constraint "..."`，
/// 解析不出来时退化为整条消息。
fn extract_constraint_fields(message: &str) -> Vec<String> {
    if let Some((_, tail)) = message.split_once("constraint failed:") {
        let fields: Vec<String> = tail
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.rsplit_once('.')
                    .map_or(part, |(_, column)| column)
                    .to_string()
            })
            .filter(|f| !f.is_empty())
            .collect();
        if !fields.is_empty() {
            return fields;
        }
    }
    vec![message.to_string()]
}
