//! # 配置管理模块
//!
//! 处理应用配置加载、验证和管理

mod app_config;
mod database;

pub use app_config::{AppConfig, ErrorFormat, IsolationLevel, LogConfig, TransactionConfig};
pub use database::DatabaseConfig;

use std::env;
use std::path::Path;

/// 加载配置文件
///
/// 按 `RUST_ENV` 选择 `config/config.{env}.toml`，缺省为 dev
pub fn load_config() -> crate::error::Result<AppConfig> {
    let env = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
    let config_file = format!("config/config.{env}.toml");

    if !Path::new(&config_file).exists() {
        return Err(crate::error::DataError::config(format!(
            "配置文件不存在: {config_file}"
        )));
    }

    let config_content = std::fs::read_to_string(&config_file).map_err(|e| {
        crate::error::DataError::config_with_source(format!("读取配置文件失败: {config_file}"), e)
    })?;

    let config: AppConfig = toml::from_str(&config_content)?;

    // 验证配置的有效性
    validate_config(&config)?;

    Ok(config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> crate::error::Result<()> {
    // 验证数据库配置
    if config.database.url.is_empty() {
        return Err(crate::error::DataError::config("数据库URL不能为空"));
    }

    if config.database.max_connections == 0 {
        return Err(crate::error::DataError::config(
            "数据库最大连接数必须大于0",
        ));
    }

    // 验证事务配置
    if config.transaction.timeout_ms == 0 {
        return Err(crate::error::DataError::config("事务超时必须大于0"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.error_format, ErrorFormat::Pretty);
    }

    #[test]
    fn test_parse_config_from_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            error_format = "minimal"

            [database]
            url = "sqlite://data/fundlab.db"
            max_connections = 5

            [transaction]
            max_wait_ms = 1000
            timeout_ms = 3000
            isolation_level = "repeatable_read"

            [omit]
            users = ["password_hash"]
            "#,
        )
        .expect("parse config");

        assert_eq!(config.database.url, "sqlite://data/fundlab.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.transaction.max_wait_ms, 1000);
        assert_eq!(
            config.transaction.isolation_level,
            IsolationLevel::RepeatableRead
        );
        assert_eq!(config.error_format, ErrorFormat::Minimal);
        assert_eq!(config.omit["users"], vec!["password_hash"]);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config: AppConfig = toml::from_str(
            r#"
            [transaction]
            timeout_ms = 0
            "#,
        )
        .expect("parse config");
        assert!(validate_config(&config).is_err());
    }
}
