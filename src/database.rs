//! # 数据库模块
//!
//! 数据库连接、迁移管理，以及原生结果行的 JSON 解码

use std::path::Path;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, JsonValue, QueryResult};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, error, info, warn};

use crate::config::DatabaseConfig;
use crate::error::{DataError, Result};

/// 初始化数据库连接
pub async fn init_database(config: &DatabaseConfig) -> std::result::Result<DatabaseConnection, DbErr> {
    let database_url = config.url.as_str();
    info!(
        "正在连接数据库: {}",
        if database_url.starts_with("sqlite:") {
            &database_url[..std::cmp::min(database_url.len(), 50)]
        } else {
            database_url
        }
    );

    // 对于SQLite数据库，确保数据库文件的目录和文件存在
    if database_url.starts_with("sqlite://") {
        let db_path = database_url
            .strip_prefix("sqlite://")
            .unwrap_or(database_url);
        let db_file_path = Path::new(db_path);

        // 确保父目录存在
        if let Some(parent_dir) = db_file_path.parent() {
            if !parent_dir.exists() {
                debug!("创建数据库目录: {}", parent_dir.display());
                std::fs::create_dir_all(parent_dir).map_err(|e| {
                    DbErr::Custom(format!(
                        "无法创建数据库目录 {}: {}",
                        parent_dir.display(),
                        e
                    ))
                })?;
            }
        }

        // 确保数据库文件存在（如果不存在则创建空文件）
        if !db_file_path.exists() {
            debug!("创建数据库文件: {}", db_file_path.display());
            std::fs::File::create(db_file_path).map_err(|e| {
                DbErr::Custom(format!(
                    "无法创建数据库文件 {}: {}",
                    db_file_path.display(),
                    e
                ))
            })?;
        }
    }

    let mut options = ConnectOptions::new(database_url.to_string());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;

    info!("数据库连接成功");
    Ok(db)
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> std::result::Result<(), DbErr> {
    info!("开始运行数据库迁移...");

    match ::migration::Migrator::up(db, None).await {
        Ok(()) => {
            info!("数据库迁移完成");
            Ok(())
        }
        Err(e) => {
            error!("数据库迁移失败: {}", e);
            Err(e)
        }
    }
}

/// 把一个结果列解码为 JSON 值
///
/// SQLite 对表达式列（COUNT(*)、SUM 等别名列）不报告声明类型，
/// `JsonValue::from_query_result` 会丢掉这些列，这里按运行时类型
/// 依次尝试整数、浮点、文本解码
pub(crate) fn decode_json_column(row: &QueryResult, name: &str) -> Result<JsonValue> {
    if let Ok(value) = row.try_get_by::<Option<i64>, _>(name) {
        return Ok(value.map_or(JsonValue::Null, JsonValue::from));
    }
    if let Ok(value) = row.try_get_by::<Option<f64>, _>(name) {
        return Ok(value.map_or(JsonValue::Null, JsonValue::from));
    }
    if let Ok(value) = row.try_get_by::<Option<String>, _>(name) {
        return Ok(value.map_or(JsonValue::Null, JsonValue::from));
    }
    if let Ok(value) = row.try_get_by::<Option<bool>, _>(name) {
        return Ok(value.map_or(JsonValue::Null, JsonValue::from));
    }
    Err(DataError::engine(format!("结果列 {name} 无法解码为 JSON")))
}

/// 把整行结果解码为 JSON 对象，列名原样保留
pub(crate) fn row_to_json(row: &QueryResult) -> Result<JsonValue> {
    let mut object = serde_json::Map::new();
    for name in row.column_names() {
        let value = decode_json_column(row, &name)?;
        object.insert(name, value);
    }
    Ok(JsonValue::Object(object))
}

/// 检查数据库状态
pub async fn check_database_status(db: &DatabaseConnection) -> std::result::Result<(), DbErr> {
    info!("检查数据库状态...");

    let status = ::migration::Migrator::get_pending_migrations(db).await?;

    if status.is_empty() {
        info!("所有迁移都已应用");
    } else {
        warn!("有 {} 个待应用的迁移", status.len());
    }

    Ok(())
}
