//! # 数据客户端
//!
//! 连接生命周期、按实体取委托、原生 SQL 透传与交互式事务。
//! 一个进程通常只建一个客户端，内部是连接池

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityName, EntityTrait, JsonValue,
    Statement, TransactionTrait, Value,
};
use tracing::warn;

use entity::{
    articles, collections, comments, likes, positions, posts, simulation_accounts, transactions,
    users,
};

use crate::config::{AppConfig, IsolationLevel, TransactionConfig};
use crate::database::{init_database, row_to_json, run_migrations};
use crate::delegate::include::{
    ensure_select_include_exclusive, load_account_relations, load_post_relations,
    load_user_relations, AccountInclude, AccountWithRelations, FindResult, PostInclude,
    PostWithRelations, UserInclude, UserWithRelations,
};
use crate::delegate::EntityDelegate;
use crate::error::{DataError, Result};
use crate::logging::LogHooks;
use crate::query::Query;

/// 单次事务的可选参数，未指定的项回落到配置默认值
#[derive(Debug, Clone, Default)]
pub struct TransactionOptions {
    /// 事务开始前的最长排队等待
    pub max_wait: Option<Duration>,
    /// 事务体的最长执行时间，超时自动回滚
    pub timeout: Option<Duration>,
    pub isolation_level: Option<IsolationLevel>,
}

/// 事务回调：借用事务句柄，返回装箱 Future
pub type TransactionCallback<'c, T> =
    Pin<Box<dyn Future<Output = Result<T>> + Send + 'c>>;

/// batch 中的单个写操作
pub type BatchOperation<T> =
    Box<dyn for<'c> FnOnce(&'c DatabaseTransaction) -> TransactionCallback<'c, T> + Send>;

/// 把闭包装箱为 batch 操作（帮助编译器推断高阶生命周期）
pub fn batch_op<T, F>(operation: F) -> BatchOperation<T>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TransactionCallback<'c, T> + Send + 'static,
{
    Box::new(operation)
}

/// 数据访问客户端
#[derive(Debug)]
pub struct DataClient {
    db: DatabaseConnection,
    hooks: LogHooks,
    tx_defaults: TransactionConfig,
    omit: HashMap<String, Vec<String>>,
}

impl DataClient {
    /// 建立连接池并应用全部待执行迁移
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let db = init_database(&config.database).await.map_err(DataError::from)?;
        run_migrations(&db).await.map_err(DataError::from)?;
        Ok(Self {
            db,
            hooks: LogHooks::new(),
            tx_defaults: config.transaction.clone(),
            omit: config.omit.clone(),
        })
    }

    /// 从现成连接构建（测试用内存库走这里）
    #[must_use]
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self {
            db,
            hooks: LogHooks::new(),
            tx_defaults: TransactionConfig::default(),
            omit: HashMap::new(),
        }
    }

    /// 覆盖按表的字段忽略规则
    #[must_use]
    pub fn with_omit(mut self, omit: HashMap<String, Vec<String>>) -> Self {
        self.omit = omit;
        self
    }

    /// 关闭连接池；之后的任何操作都会失败
    pub async fn disconnect(self) -> Result<()> {
        self.db.close().await.map_err(Into::into)
    }

    /// 底层连接
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 日志回调注册表
    #[must_use]
    pub const fn hooks(&self) -> &LogHooks {
        &self.hooks
    }

    /// 任意实体的委托
    #[must_use]
    pub const fn delegate<E: EntityTrait>(&self) -> EntityDelegate<'_, DatabaseConnection, E> {
        EntityDelegate::new(&self.db)
    }

    #[must_use]
    pub const fn users(&self) -> EntityDelegate<'_, DatabaseConnection, users::Entity> {
        self.delegate()
    }

    #[must_use]
    pub const fn articles(&self) -> EntityDelegate<'_, DatabaseConnection, articles::Entity> {
        self.delegate()
    }

    #[must_use]
    pub const fn posts(&self) -> EntityDelegate<'_, DatabaseConnection, posts::Entity> {
        self.delegate()
    }

    #[must_use]
    pub const fn comments(&self) -> EntityDelegate<'_, DatabaseConnection, comments::Entity> {
        self.delegate()
    }

    #[must_use]
    pub const fn likes(&self) -> EntityDelegate<'_, DatabaseConnection, likes::Entity> {
        self.delegate()
    }

    #[must_use]
    pub const fn collections(&self) -> EntityDelegate<'_, DatabaseConnection, collections::Entity> {
        self.delegate()
    }

    #[must_use]
    pub const fn simulation_accounts(
        &self,
    ) -> EntityDelegate<'_, DatabaseConnection, simulation_accounts::Entity> {
        self.delegate()
    }

    #[must_use]
    pub const fn positions(&self) -> EntityDelegate<'_, DatabaseConnection, positions::Entity> {
        self.delegate()
    }

    #[must_use]
    pub const fn transactions(
        &self,
    ) -> EntityDelegate<'_, DatabaseConnection, transactions::Entity> {
        self.delegate()
    }

    // ---------- 带投影 / 关联的读取 ----------

    /// 按配置的忽略规则剔除 JSON 行中的字段
    fn strip_omitted(&self, table: &str, mut rows: Vec<JsonValue>) -> Vec<JsonValue> {
        if let Some(fields) = self.omit.get(table) {
            for row in &mut rows {
                if let Some(object) = row.as_object_mut() {
                    for field in fields {
                        object.remove(field);
                    }
                }
            }
        }
        rows
    }

    /// 用户列表查询：整行、select 投影或 include 关联三选一
    pub async fn find_users(
        &self,
        query: Query<users::Entity>,
        select: Option<Vec<users::Column>>,
        include: Option<UserInclude>,
    ) -> Result<FindResult<users::Model, UserWithRelations>> {
        ensure_select_include_exclusive(select.is_some(), include.is_some())?;
        if let Some(columns) = select {
            let rows = self.users().find_many_select(query, columns).await?;
            return Ok(FindResult::Projected(
                self.strip_omitted(users::Entity.table_name(), rows),
            ));
        }
        let rows = self.users().find_many(query).await?;
        match include {
            Some(include) => Ok(FindResult::WithRelations(
                load_user_relations(&self.db, rows, include).await?,
            )),
            None => Ok(FindResult::Rows(rows)),
        }
    }

    /// 动态列表查询
    pub async fn find_posts(
        &self,
        query: Query<posts::Entity>,
        select: Option<Vec<posts::Column>>,
        include: Option<PostInclude>,
    ) -> Result<FindResult<posts::Model, PostWithRelations>> {
        ensure_select_include_exclusive(select.is_some(), include.is_some())?;
        if let Some(columns) = select {
            let rows = self.posts().find_many_select(query, columns).await?;
            return Ok(FindResult::Projected(
                self.strip_omitted(posts::Entity.table_name(), rows),
            ));
        }
        let rows = self.posts().find_many(query).await?;
        match include {
            Some(include) => Ok(FindResult::WithRelations(
                load_post_relations(&self.db, rows, include).await?,
            )),
            None => Ok(FindResult::Rows(rows)),
        }
    }

    /// 模拟账户列表查询
    pub async fn find_simulation_accounts(
        &self,
        query: Query<simulation_accounts::Entity>,
        select: Option<Vec<simulation_accounts::Column>>,
        include: Option<AccountInclude>,
    ) -> Result<FindResult<simulation_accounts::Model, AccountWithRelations>> {
        ensure_select_include_exclusive(select.is_some(), include.is_some())?;
        if let Some(columns) = select {
            let rows = self
                .simulation_accounts()
                .find_many_select(query, columns)
                .await?;
            return Ok(FindResult::Projected(
                self.strip_omitted(simulation_accounts::Entity.table_name(), rows),
            ));
        }
        let rows = self.simulation_accounts().find_many(query).await?;
        match include {
            Some(include) => Ok(FindResult::WithRelations(
                load_account_relations(&self.db, rows, include).await?,
            )),
            None => Ok(FindResult::Rows(rows)),
        }
    }

    // ---------- 原生 SQL ----------

    /// 参数化原生查询，返回 JSON 行
    pub async fn query_raw(&self, sql: &str, params: Vec<Value>) -> Result<Vec<JsonValue>> {
        let backend = self.db.get_database_backend();
        let stmt = Statement::from_sql_and_values(backend, sql, params);
        self.hooks.emit_query(&stmt.to_string());
        let rows = self.db.query_all(stmt).await.map_err(DataError::from)?;
        rows.iter().map(row_to_json).collect()
    }

    /// 参数化原生写入，返回受影响行数
    pub async fn execute_raw(&self, sql: &str, params: Vec<Value>) -> Result<u64> {
        let backend = self.db.get_database_backend();
        let stmt = Statement::from_sql_and_values(backend, sql, params);
        self.hooks.emit_query(&stmt.to_string());
        let result = self.db.execute(stmt).await.map_err(DataError::from)?;
        Ok(result.rows_affected())
    }

    /// 不带参数绑定的原生查询。SQL 文本原样下发，
    /// 调用方自行保证不拼接外部输入
    pub async fn query_raw_unsafe(&self, sql: &str) -> Result<Vec<JsonValue>> {
        let backend = self.db.get_database_backend();
        let stmt = Statement::from_string(backend, sql.to_string());
        self.hooks.emit_query(sql);
        let rows = self.db.query_all(stmt).await.map_err(DataError::from)?;
        rows.iter().map(row_to_json).collect()
    }

    /// 不带参数绑定的原生写入
    pub async fn execute_raw_unsafe(&self, sql: &str) -> Result<u64> {
        let backend = self.db.get_database_backend();
        let stmt = Statement::from_string(backend, sql.to_string());
        self.hooks.emit_query(sql);
        let result = self.db.execute(stmt).await.map_err(DataError::from)?;
        Ok(result.rows_affected())
    }

    // ---------- 事务 ----------

    /// 交互式事务：回调内的所有操作要么全部提交，要么全部回滚
    ///
    /// 回调返回 Err、panic 或执行超过 timeout 都会回滚；
    /// 排队等待超过 max_wait 时直接报 TransactionTimeout，不执行回调
    pub async fn transaction<T, F>(&self, options: TransactionOptions, callback: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> TransactionCallback<'c, T>,
    {
        let max_wait = options.max_wait.unwrap_or_else(|| self.tx_defaults.max_wait());
        let timeout = options.timeout.unwrap_or_else(|| self.tx_defaults.timeout());
        let isolation = options
            .isolation_level
            .unwrap_or(self.tx_defaults.isolation_level);

        let txn = tokio::time::timeout(
            max_wait,
            self.db.begin_with_config(Some(isolation.into()), None),
        )
        .await
        .map_err(|_| DataError::transaction_timeout("等待事务启动超时"))?
        .map_err(DataError::from)?;

        match tokio::time::timeout(timeout, callback(&txn)).await {
            Ok(Ok(value)) => {
                txn.commit().await.map_err(DataError::from)?;
                Ok(value)
            }
            Ok(Err(err)) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("事务回滚失败: {rollback_err}");
                }
                Err(err)
            }
            Err(_) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("事务回滚失败: {rollback_err}");
                }
                Err(DataError::transaction_timeout("事务执行超时，已回滚"))
            }
        }
    }

    /// 批量事务：按顺序执行一组写操作，全部成功才提交
    pub async fn batch<T: Send>(&self, operations: Vec<BatchOperation<T>>) -> Result<Vec<T>> {
        let txn = self.db.begin().await.map_err(DataError::from)?;
        let mut results = Vec::with_capacity(operations.len());
        for operation in operations {
            match operation(&txn).await {
                Ok(value) => results.push(value),
                Err(err) => {
                    if let Err(rollback_err) = txn.rollback().await {
                        warn!("事务回滚失败: {rollback_err}");
                    }
                    return Err(err);
                }
            }
        }
        txn.commit().await.map_err(DataError::from)?;
        Ok(results)
    }
}
