//! # FundLab 数据访问层
//!
//! 基金学习社区（文章 / 动态 / 评论 / 点赞 / 收藏）与模拟投资
//! （账户 / 持仓 / 交易流水）的统一数据访问层。每个实体暴露同一组
//! CRUD / 聚合操作，查询以结构化文档描述并在库内降解为 SQL，
//! 错误归一为 [`DataError`] 分类
//!
//! ## 快速上手
//!
//! ```no_run
//! use fundlab_data::{AppConfig, DataClient, Filter, Query};
//! use entity::users;
//!
//! # async fn demo() -> fundlab_data::Result<()> {
//! let client = DataClient::connect(&AppConfig::default()).await?;
//! let beginners = client
//!     .users()
//!     .find_many(Query::new().filter(Filter::eq(users::Column::Level, "BEGINNER")))
//!     .await?;
//! # let _ = beginners;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod database;
pub mod delegate;
pub mod error;
pub mod logging;
pub mod query;

pub use client::{batch_op, BatchOperation, DataClient, TransactionCallback, TransactionOptions};
pub use config::{
    load_config, AppConfig, DatabaseConfig, ErrorFormat, IsolationLevel, LogConfig,
    TransactionConfig,
};
pub use database::{check_database_status, init_database, run_migrations};
pub use delegate::{
    AccountInclude, AccountWithRelations, AggregateFn, AggregateSpec, EntityDelegate, FindResult,
    GroupBySpec, Having, HavingOp, PostInclude, PostWithRelations, RelationQuery, UserInclude,
    UserWithRelations,
};
pub use error::{Context, DataError, Result};
pub use logging::{init_logging, LogEvent, LogHooks, LogLevel};
pub use query::{
    Compare, Cursor, Direction, FieldUpdate, Filter, Nulls, OrderBy, Page, Query, UniqueKey,
};
