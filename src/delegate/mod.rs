//! # 实体 CRUD 委托
//!
//! 每个实体暴露同一组操作：findUnique / findFirst / findMany、
//! create(Many) / update(Many) / upsert / delete(Many)、count /
//! aggregate / groupBy。全部实现在一个按实体参数化的泛型委托上，
//! 唯一性、外键、小数精度等约束由存储引擎的 schema 保证

pub mod aggregate;
pub mod include;

pub use aggregate::{AggregateFn, AggregateSpec, GroupBySpec, Having, HavingOp};
pub use include::{
    ensure_select_include_exclusive, load_account_relations, load_post_relations,
    load_related_many, load_related_one, load_user_relations, AccountInclude,
    AccountWithRelations, FindResult, PostInclude, PostWithRelations, RelationQuery, UserInclude,
    UserWithRelations,
};

use std::collections::HashSet;
use std::marker::PhantomData;

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    FromQueryResult, IdenStatic, IntoActiveModel, Iterable, JsonValue, ModelTrait,
    PaginatorTrait, PrimaryKeyToColumn, QueryFilter, QuerySelect, QueryTrait, TransactionTrait,
    Value,
};
use serde::Serialize;

use crate::error::{DataError, Result};
use crate::query::{apply_order, FieldUpdate, Filter, Query, UniqueKey};

/// 按实体参数化的 CRUD 委托
///
/// `C` 既可以是连接池也可以是事务句柄，事务内复用同一套操作
pub struct EntityDelegate<'a, C, E> {
    conn: &'a C,
    entity: PhantomData<E>,
}

impl<'a, C, E> EntityDelegate<'a, C, E>
where
    C: ConnectionTrait + TransactionTrait,
    E: EntityTrait,
{
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self {
            conn,
            entity: PhantomData,
        }
    }

    /// 底层连接
    #[must_use]
    pub const fn connection(&self) -> &'a C {
        self.conn
    }

    fn table_name() -> String {
        E::default().table_name().to_string()
    }

    fn primary_key_column() -> Result<E::Column> {
        E::PrimaryKey::iter()
            .next()
            .map(PrimaryKeyToColumn::into_column)
            .ok_or_else(|| DataError::engine("实体缺少主键定义"))
    }

    // ---------- 读取 ----------

    /// 按唯一键查询，未命中返回 None
    pub async fn find_unique(&self, key: UniqueKey<E::Column>) -> Result<Option<E::Model>> {
        E::find()
            .filter(key.into_condition())
            .one(self.conn)
            .await
            .map_err(Into::into)
    }

    /// 按唯一键查询，未命中报 NotFound
    pub async fn find_unique_or_throw(&self, key: UniqueKey<E::Column>) -> Result<E::Model> {
        self.find_unique(key)
            .await?
            .ok_or_else(|| DataError::not_found(Self::table_name()))
    }

    /// 按过滤 + 排序取第一行
    pub async fn find_first(&self, query: Query<E>) -> Result<Option<E::Model>>
    where
        E::Model: Serialize + FromQueryResult + Send + Sync,
    {
        let mut query = query;
        query.page.take = Some(1);
        Ok(self.find_many(query).await?.into_iter().next())
    }

    /// 按过滤 + 排序取第一行，空结果报 NotFound
    pub async fn find_first_or_throw(&self, query: Query<E>) -> Result<E::Model>
    where
        E::Model: Serialize + FromQueryResult + Send + Sync,
    {
        self.find_first(query)
            .await?
            .ok_or_else(|| DataError::not_found(Self::table_name()))
    }

    /// 列表查询：过滤、排序、偏移/游标分页、distinct 去重
    ///
    /// distinct 与分页组合时先去重再分页：此时 SQL 不带 LIMIT/OFFSET，
    /// 在去重后的序列上做 take/skip 截断
    pub async fn find_many(&self, query: Query<E>) -> Result<Vec<E::Model>>
    where
        E::Model: Serialize + FromQueryResult + Send + Sync,
    {
        let Query {
            filter,
            order,
            page,
            distinct,
        } = query;

        let mut select = E::find();
        if let Some(f) = filter {
            select = select.filter(f.into_condition());
        }

        let backward = page.is_backward();
        let take = page.take_abs();
        let skip = page.skip.unwrap_or(0);
        let dedupe = !distinct.is_empty();
        let from_cursor = page.cursor.is_some();

        // 两条取数路径都把结果排成请求的顺序再返回
        let mut rows = if let Some(cursor) = page.cursor {
            // 游标分页：沿游标列扫描，起点行本身不包含在结果内。
            // skip 通过超取后截断实现（游标查询不支持 OFFSET）
            let mut paginator = select.cursor_by(cursor.column);
            if backward {
                paginator.before(cursor.value);
                if let (false, Some(n)) = (dedupe, take) {
                    paginator.last(n + skip);
                }
            } else {
                paginator.after(cursor.value);
                if let (false, Some(n)) = (dedupe, take) {
                    paginator.first(n + skip);
                }
            }
            paginator.all(self.conn).await.map_err(DataError::from)?
        } else {
            // 负向 take：反转所有排序方向查询，再把结果翻回来
            let mut select = apply_order(select, &order, backward);
            if !dedupe {
                if skip > 0 {
                    select = select.offset(skip);
                }
                if let Some(n) = take {
                    select = select.limit(n);
                }
            }
            let mut rows = select.all(self.conn).await.map_err(DataError::from)?;
            if backward {
                rows.reverse();
            }
            rows
        };

        if dedupe {
            rows = dedupe_rows::<E>(rows, &distinct)?;
            paginate_in_memory(&mut rows, skip, take, backward);
        } else if from_cursor {
            // 超取的 skip 行在这里截掉
            paginate_in_memory(&mut rows, skip, take, backward);
        }
        Ok(rows)
    }

    /// 标量字段投影查询，返回 JSON 行（与 include 互斥，不支持游标）
    pub async fn find_many_select(
        &self,
        query: Query<E>,
        columns: Vec<E::Column>,
    ) -> Result<Vec<JsonValue>> {
        if columns.is_empty() {
            return Err(DataError::validation("select 字段列表不能为空"));
        }
        if query.page.cursor.is_some() {
            return Err(DataError::validation("select 投影查询不支持游标分页"));
        }

        let Query {
            filter,
            order,
            page,
            distinct: _,
        } = query;

        let mut select = E::find().select_only().columns(columns);
        if let Some(f) = filter {
            select = select.filter(f.into_condition());
        }
        let backward = page.is_backward();
        let mut select = apply_order(select, &order, backward);
        if let Some(skip) = page.skip {
            select = select.offset(skip);
        }
        if let Some(n) = page.take_abs() {
            select = select.limit(n);
        }
        let mut rows = select
            .into_json()
            .all(self.conn)
            .await
            .map_err(DataError::from)?;
        if backward {
            rows.reverse();
        }
        Ok(rows)
    }

    // ---------- 写入 ----------

    /// 插入单条记录，缺省字段（id / 时间戳 / 默认等级）由实体钩子补全
    pub async fn create<A>(&self, model: A) -> Result<E::Model>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
        E::Model: IntoActiveModel<A>,
    {
        model.insert(self.conn).await.map_err(Into::into)
    }

    /// 批量插入，返回插入行数
    ///
    /// `skip_duplicates` 为真时违反唯一约束的行被静默跳过（ON CONFLICT DO
    /// NOTHING），不会使整批失败
    pub async fn create_many<A>(&self, models: Vec<A>, skip_duplicates: bool) -> Result<u64>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
        E::Model: IntoActiveModel<A>,
    {
        if models.is_empty() {
            return Ok(0);
        }
        let prepared = self.prepare_batch(models).await?;
        let mut insert = E::insert_many(prepared);
        if skip_duplicates {
            insert = insert.on_conflict(OnConflict::new().do_nothing().to_owned());
        }
        insert
            .exec_without_returning(self.conn)
            .await
            .map_err(Into::into)
    }

    /// 批量插入并返回插入的行
    ///
    /// SQLite 不支持 RETURNING，插入后按批次里准备好的主键回查；
    /// `skip_duplicates` 跳过的行自然不在回查结果里
    pub async fn create_many_and_return<A>(
        &self,
        models: Vec<A>,
        skip_duplicates: bool,
    ) -> Result<Vec<E::Model>>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
        E::Model: IntoActiveModel<A>,
    {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let prepared = self.prepare_batch(models).await?;
        let pk = Self::primary_key_column()?;
        let ids: Vec<Value> = prepared
            .iter()
            .filter_map(|model| model.get(pk).into_value())
            .collect();
        if ids.len() != prepared.len() {
            return Err(DataError::engine("批量插入的文档缺少主键值"));
        }

        let mut insert = E::insert_many(prepared);
        if skip_duplicates {
            insert = insert.on_conflict(OnConflict::new().do_nothing().to_owned());
        }

        if self.conn.get_database_backend().support_returning() {
            return insert.exec_with_returning_many(self.conn).await.map_err(Into::into);
        }

        insert
            .exec_without_returning(self.conn)
            .await
            .map_err(DataError::from)?;
        let mut rows = E::find()
            .filter(pk.is_in(ids.clone()))
            .all(self.conn)
            .await
            .map_err(DataError::from)?;
        // 按批次顺序回排
        let mut out = Vec::with_capacity(rows.len());
        for id in ids {
            if let Some(index) = rows.iter().position(|row| row.get(pk) == id) {
                out.push(rows.remove(index));
            }
        }
        Ok(out)
    }

    /// 批量插入不经过 ActiveModel 钩子，这里手动补全默认值
    async fn prepare_batch<A>(&self, models: Vec<A>) -> Result<Vec<A>>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
    {
        let mut prepared = Vec::with_capacity(models.len());
        for model in models {
            prepared.push(
                model
                    .before_save(self.conn, true)
                    .await
                    .map_err(DataError::from)?,
            );
        }
        Ok(prepared)
    }

    /// 按唯一键更新一条记录并返回更新后的行，未命中报 NotFound
    pub async fn update(
        &self,
        key: UniqueKey<E::Column>,
        updates: Vec<FieldUpdate<E::Column>>,
    ) -> Result<E::Model> {
        let existing = self.find_unique_or_throw(key).await?;
        // 空变更文档：原样返回
        if updates.is_empty() {
            return Ok(existing);
        }
        let pk = Self::primary_key_column()?;
        let pk_value: Value = existing.get(pk);
        self.apply_updates(pk, pk_value, updates).await
    }

    async fn apply_updates(
        &self,
        pk: E::Column,
        pk_value: Value,
        updates: Vec<FieldUpdate<E::Column>>,
    ) -> Result<E::Model> {
        // 变更文档覆盖主键时按新值回查
        let final_pk = updates
            .iter()
            .find_map(|u| (u.target().as_str() == pk.as_str()).then(|| u.set_value()).flatten())
            .unwrap_or_else(|| pk_value.clone());

        let mut update = E::update_many().filter(pk.eq(pk_value));
        for item in updates {
            update = update.col_expr(item.target(), item.into_expr());
        }
        update.exec(self.conn).await.map_err(DataError::from)?;

        E::find()
            .filter(pk.eq(final_pk))
            .one(self.conn)
            .await
            .map_err(DataError::from)?
            .ok_or_else(|| DataError::engine("更新后回查失败"))
    }

    /// 以 ActiveModel 形式更新（走实体钩子，updated_at 自动刷新）
    pub async fn update_from_model<A>(&self, model: A) -> Result<E::Model>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
        E::Model: IntoActiveModel<A>,
    {
        model.update(self.conn).await.map_err(Into::into)
    }

    /// 批量更新，`limit` 限制触达的行数，返回受影响行数
    pub async fn update_many(
        &self,
        filter: Option<Filter<E::Column>>,
        updates: Vec<FieldUpdate<E::Column>>,
        limit: Option<u64>,
    ) -> Result<u64> {
        if updates.is_empty() {
            return Err(DataError::validation("变更文档不能为空"));
        }
        let mut update = E::update_many();
        if let Some(cond) = Self::bounded_condition(filter, limit)? {
            update = update.filter(cond);
        }
        for item in updates {
            update = update.col_expr(item.target(), item.into_expr());
        }
        Ok(update
            .exec(self.conn)
            .await
            .map_err(DataError::from)?
            .rows_affected)
    }

    /// 批量更新并返回更新后的行
    ///
    /// SQLite 不支持 RETURNING，改为事务内先选出命中的主键、
    /// 更新后按主键回查
    pub async fn update_many_and_return(
        &self,
        filter: Option<Filter<E::Column>>,
        updates: Vec<FieldUpdate<E::Column>>,
        limit: Option<u64>,
    ) -> Result<Vec<E::Model>> {
        if updates.is_empty() {
            return Err(DataError::validation("变更文档不能为空"));
        }
        let cond = Self::bounded_condition(filter, limit)?;

        if self.conn.get_database_backend().support_returning() {
            let mut update = E::update_many();
            if let Some(cond) = cond {
                update = update.filter(cond);
            }
            for item in updates {
                update = update.col_expr(item.target(), item.into_expr());
            }
            return update.exec_with_returning(self.conn).await.map_err(Into::into);
        }

        let pk = Self::primary_key_column()?;
        let txn = self.conn.begin().await.map_err(DataError::from)?;

        let mut select = E::find();
        if let Some(cond) = cond {
            select = select.filter(cond);
        }
        let ids: Vec<Value> = select
            .all(&txn)
            .await
            .map_err(DataError::from)?
            .iter()
            .map(|row| row.get(pk))
            .collect();
        if ids.is_empty() {
            txn.commit().await.map_err(DataError::from)?;
            return Ok(Vec::new());
        }

        let mut update = E::update_many().filter(pk.is_in(ids.clone()));
        for item in updates {
            update = update.col_expr(item.target(), item.into_expr());
        }
        update.exec(&txn).await.map_err(DataError::from)?;

        let rows = E::find()
            .filter(pk.is_in(ids))
            .all(&txn)
            .await
            .map_err(DataError::from)?;
        txn.commit().await.map_err(DataError::from)?;
        Ok(rows)
    }

    /// 原子 upsert：唯一键命中则按变更文档更新，否则插入 create 文档。
    /// 查找与写入在同一事务内完成，并发 upsert 不会双双判定"不存在"
    pub async fn upsert<A>(
        &self,
        key: UniqueKey<E::Column>,
        create: A,
        updates: Vec<FieldUpdate<E::Column>>,
    ) -> Result<E::Model>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
        E::Model: IntoActiveModel<A>,
    {
        let txn = self.conn.begin().await.map_err(DataError::from)?;
        let existing = E::find()
            .filter(key.into_condition())
            .one(&txn)
            .await
            .map_err(DataError::from)?;

        let result = match existing {
            Some(model) => {
                if updates.is_empty() {
                    model
                } else {
                    let pk = Self::primary_key_column()?;
                    let pk_value: Value = model.get(pk);
                    let final_pk = updates
                        .iter()
                        .find_map(|u| {
                            (u.target().as_str() == pk.as_str())
                                .then(|| u.set_value())
                                .flatten()
                        })
                        .unwrap_or_else(|| pk_value.clone());

                    let mut update = E::update_many().filter(pk.eq(pk_value));
                    for item in updates {
                        update = update.col_expr(item.target(), item.into_expr());
                    }
                    update.exec(&txn).await.map_err(DataError::from)?;

                    E::find()
                        .filter(pk.eq(final_pk))
                        .one(&txn)
                        .await
                        .map_err(DataError::from)?
                        .ok_or_else(|| DataError::engine("更新后回查失败"))?
                }
            }
            None => create.insert(&txn).await.map_err(DataError::from)?,
        };

        txn.commit().await.map_err(DataError::from)?;
        Ok(result)
    }

    /// 按唯一键删除并返回被删除的行，未命中报 NotFound
    pub async fn delete(&self, key: UniqueKey<E::Column>) -> Result<E::Model> {
        let existing = self.find_unique_or_throw(key).await?;
        let pk = Self::primary_key_column()?;
        let pk_value: Value = existing.get(pk);
        E::delete_many()
            .filter(pk.eq(pk_value))
            .exec(self.conn)
            .await
            .map_err(DataError::from)?;
        Ok(existing)
    }

    /// 批量删除，`limit` 限制触达的行数，返回删除行数
    pub async fn delete_many(
        &self,
        filter: Option<Filter<E::Column>>,
        limit: Option<u64>,
    ) -> Result<u64> {
        let mut delete = E::delete_many();
        if let Some(cond) = Self::bounded_condition(filter, limit)? {
            delete = delete.filter(cond);
        }
        Ok(delete
            .exec(self.conn)
            .await
            .map_err(DataError::from)?
            .rows_affected)
    }

    /// 计数
    pub async fn count(&self, filter: Option<Filter<E::Column>>) -> Result<u64>
    where
        E::Model: FromQueryResult + Send + Sync,
    {
        let mut select = E::find();
        if let Some(f) = filter {
            select = select.filter(f.into_condition());
        }
        select.count(self.conn).await.map_err(Into::into)
    }

    /// 带 limit 的批量写入条件：SQLite 不支持 UPDATE/DELETE ... LIMIT，
    /// 用主键子查询 `pk IN (SELECT pk FROM t WHERE ... LIMIT n)` 等价实现
    fn bounded_condition(
        filter: Option<Filter<E::Column>>,
        limit: Option<u64>,
    ) -> Result<Option<sea_orm::Condition>> {
        match limit {
            Some(n) => {
                let pk = Self::primary_key_column()?;
                let mut subquery = E::find();
                if let Some(f) = filter {
                    subquery = subquery.filter(f.into_condition());
                }
                let stmt = subquery.select_only().column(pk).limit(n).into_query();
                Ok(Some(
                    sea_orm::Condition::all().add(pk.in_subquery(stmt)),
                ))
            }
            None => Ok(filter.map(Filter::into_condition)),
        }
    }
}

/// 内存分页：rows 已按请求顺序排列，backward 时 skip/take 都从尾部起算
fn paginate_in_memory<M>(rows: &mut Vec<M>, skip: u64, take: Option<u64>, backward: bool) {
    let skip = usize::try_from(skip).unwrap_or(usize::MAX);
    if backward {
        rows.truncate(rows.len().saturating_sub(skip));
        if let Some(n) = take {
            let n = usize::try_from(n).unwrap_or(usize::MAX);
            if rows.len() > n {
                rows.drain(..rows.len() - n);
            }
        }
    } else {
        if skip >= rows.len() {
            rows.clear();
        } else if skip > 0 {
            rows.drain(..skip);
        }
        if let Some(n) = take {
            rows.truncate(usize::try_from(n).unwrap_or(usize::MAX));
        }
    }
}

/// distinct 去重：按指定字段组合保留排序后的首行
fn dedupe_rows<E>(rows: Vec<E::Model>, distinct: &[E::Column]) -> Result<Vec<E::Model>>
where
    E: EntityTrait,
    E::Model: Serialize,
{
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let json = serde_json::to_value(&row)
            .map_err(|e| DataError::engine_with_source("行序列化失败", e))?;
        let key: Vec<String> = distinct
            .iter()
            .map(|column| {
                json.get(column.as_str())
                    .map_or_else(|| "null".to_string(), ToString::to_string)
            })
            .collect();
        if seen.insert(key) {
            out.push(row);
        }
    }
    Ok(out)
}
