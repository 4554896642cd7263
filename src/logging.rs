//! # 日志配置模块
//!
//! 基于 tracing 的日志初始化，以及宿主可注册的日志回调钩子
//! （query / info / warn / error 事件，带时间戳和消息文本）

use std::env;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ErrorFormat, LogConfig};

/// 日志事件级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// SQL 查询事件，message 为查询文本
    Query,
    Info,
    Warn,
    Error,
}

/// 推送给宿主回调的日志事件
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

type LogCallback = Arc<dyn Fn(&LogEvent) + Send + Sync>;

/// 日志回调注册表
///
/// 宿主按级别订阅；emit 同步调用所有命中的回调
#[derive(Clone, Default)]
pub struct LogHooks {
    subscribers: Arc<RwLock<Vec<(LogLevel, LogCallback)>>>,
}

impl LogHooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册某一级别的回调
    pub fn subscribe<F>(&self, level: LogLevel, callback: F)
    where
        F: Fn(&LogEvent) + Send + Sync + 'static,
    {
        if let Ok(mut subscribers) = self.subscribers.write() {
            subscribers.push((level, Arc::new(callback)));
        }
    }

    /// 分发一个事件
    pub fn emit(&self, level: LogLevel, message: impl Into<String>) {
        let event = LogEvent {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        };
        if let Ok(subscribers) = self.subscribers.read() {
            for (subscribed, callback) in subscribers.iter() {
                if *subscribed == level {
                    callback(&event);
                }
            }
        }
    }

    /// 分发查询事件，同时打到 tracing
    pub fn emit_query(&self, sql: &str) {
        tracing::debug!(target: "fundlab_data::query", "{sql}");
        self.emit(LogLevel::Query, sql);
    }
}

impl std::fmt::Debug for LogHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.subscribers.read().map_or(0, |s| s.len());
        f.debug_struct("LogHooks").field("subscribers", &count).finish()
    }
}

/// 初始化日志系统
///
/// 默认关闭 sqlx 的逐条查询日志，避免生产环境刷屏，
/// `log_queries` 为真时打开；`RUST_LOG` 可覆盖全部配置。
/// 错误格式 pretty 带 ANSI 颜色，colorless 去色，
/// minimal 在去色基础上省略时间戳与 target
pub fn init_logging(log: &LogConfig, error_format: ErrorFormat) {
    let level = log.level.as_deref().unwrap_or("info");
    let default_filter = default_filter(level, log.log_queries);
    let log_filter = env::var("RUST_LOG").unwrap_or(default_filter);

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into()));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    // 重复初始化（如多个测试）时忽略错误
    match error_format {
        ErrorFormat::Pretty => {
            let _ = registry.with(fmt_layer.with_ansi(true)).try_init();
        }
        ErrorFormat::Colorless => {
            let _ = registry.with(fmt_layer.with_ansi(false)).try_init();
        }
        ErrorFormat::Minimal => {
            let _ = registry
                .with(fmt_layer.with_ansi(false).without_time().with_target(false))
                .try_init();
        }
    }
}

/// 缺省的 EnvFilter 指令串
fn default_filter(level: &str, log_queries: bool) -> String {
    let query_level = if log_queries { "debug" } else { "off" };
    format!("{level},fundlab_data=debug,sqlx::query={query_level},sea_orm::query=warn")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_hooks_dispatch_by_level() {
        let hooks = LogHooks::new();
        let query_hits = Arc::new(AtomicUsize::new(0));
        let error_hits = Arc::new(AtomicUsize::new(0));

        {
            let query_hits = Arc::clone(&query_hits);
            hooks.subscribe(LogLevel::Query, move |_| {
                query_hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        {
            let error_hits = Arc::clone(&error_hits);
            hooks.subscribe(LogLevel::Error, move |_| {
                error_hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        hooks.emit(LogLevel::Query, "SELECT 1");
        hooks.emit(LogLevel::Query, "SELECT 2");
        hooks.emit(LogLevel::Warn, "慢查询");

        assert_eq!(query_hits.load(Ordering::SeqCst), 2);
        assert_eq!(error_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_default_filter_honors_log_queries() {
        assert_eq!(
            default_filter("info", false),
            "info,fundlab_data=debug,sqlx::query=off,sea_orm::query=warn"
        );
        assert!(default_filter("debug", true).contains("sqlx::query=debug"));
    }

    #[test]
    fn test_event_carries_timestamp_and_message() {
        let hooks = LogHooks::new();
        let seen = Arc::new(RwLock::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            hooks.subscribe(LogLevel::Info, move |event| {
                seen.write().expect("lock").push(event.clone());
            });
        }

        hooks.emit(LogLevel::Info, "连接成功");
        let events = seen.read().expect("lock");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message, "连接成功");
    }
}
