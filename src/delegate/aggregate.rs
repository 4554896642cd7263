//! # 聚合与分组
//!
//! aggregate 在整个过滤结果上求 count / min / max / avg / sum，
//! groupBy 先按字段分组再聚合。结果列以 `_count_*`、`_sum_*` 等
//! 固定前缀命名，以 JSON 行返回

use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, IdenStatic, IntoSimpleExpr, JsonValue,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, TransactionTrait, Value,
};

use super::EntityDelegate;
use crate::database::row_to_json;
use crate::error::{DataError, Result};
use crate::query::{Direction, Filter};

/// 聚合函数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Count,
    Min,
    Max,
    Avg,
    Sum,
}

impl AggregateFn {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Count => "_count",
            Self::Min => "_min",
            Self::Max => "_max",
            Self::Avg => "_avg",
            Self::Sum => "_sum",
        }
    }

    fn expr<C: ColumnTrait>(self, column: C) -> SimpleExpr {
        let col = column.into_simple_expr();
        match self {
            Self::Count => SimpleExpr::from(Func::count(col)),
            Self::Min => SimpleExpr::from(Func::min(col)),
            Self::Max => SimpleExpr::from(Func::max(col)),
            Self::Avg => SimpleExpr::from(Func::avg(col)),
            Self::Sum => SimpleExpr::from(Func::sum(col)),
        }
    }
}

/// 聚合选择：每个字段列表对应一类聚合输出
#[derive(Debug, Clone)]
pub struct AggregateSpec<C: ColumnTrait> {
    /// 输出 `_count_all`（COUNT(*)，不忽略 NULL）
    pub count_all: bool,
    /// 逐字段非 NULL 计数
    pub count: Vec<C>,
    pub min: Vec<C>,
    pub max: Vec<C>,
    pub avg: Vec<C>,
    pub sum: Vec<C>,
}

impl<C: ColumnTrait> Default for AggregateSpec<C> {
    fn default() -> Self {
        Self {
            count_all: false,
            count: Vec::new(),
            min: Vec::new(),
            max: Vec::new(),
            avg: Vec::new(),
            sum: Vec::new(),
        }
    }
}

impl<C: ColumnTrait> AggregateSpec<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn count_all(mut self) -> Self {
        self.count_all = true;
        self
    }

    #[must_use]
    pub fn count(mut self, column: C) -> Self {
        self.count.push(column);
        self
    }

    #[must_use]
    pub fn min(mut self, column: C) -> Self {
        self.min.push(column);
        self
    }

    #[must_use]
    pub fn max(mut self, column: C) -> Self {
        self.max.push(column);
        self
    }

    #[must_use]
    pub fn avg(mut self, column: C) -> Self {
        self.avg.push(column);
        self
    }

    #[must_use]
    pub fn sum(mut self, column: C) -> Self {
        self.sum.push(column);
        self
    }

    fn is_empty(&self) -> bool {
        !self.count_all
            && self.count.is_empty()
            && self.min.is_empty()
            && self.max.is_empty()
            && self.avg.is_empty()
            && self.sum.is_empty()
    }

    /// (聚合函数, 目标列) 的展开序列
    fn entries(&self) -> Vec<(AggregateFn, C)>
    where
        C: Copy,
    {
        let mut entries = Vec::new();
        for &c in &self.count {
            entries.push((AggregateFn::Count, c));
        }
        for &c in &self.min {
            entries.push((AggregateFn::Min, c));
        }
        for &c in &self.max {
            entries.push((AggregateFn::Max, c));
        }
        for &c in &self.avg {
            entries.push((AggregateFn::Avg, c));
        }
        for &c in &self.sum {
            entries.push((AggregateFn::Sum, c));
        }
        entries
    }
}

/// 比较运算（用于 having）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HavingOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// 分组后筛选条件
///
/// `function` 为 None 时直接比较分组字段本身，该字段必须出现在
/// 分组字段列表里
#[derive(Debug, Clone)]
pub struct Having<C: ColumnTrait> {
    pub function: Option<AggregateFn>,
    pub column: C,
    pub op: HavingOp,
    pub value: Value,
}

impl<C: ColumnTrait> Having<C> {
    pub fn aggregate(
        function: AggregateFn,
        column: C,
        op: HavingOp,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            function: Some(function),
            column,
            op,
            value: value.into(),
        }
    }

    pub fn field(column: C, op: HavingOp, value: impl Into<Value>) -> Self {
        Self {
            function: None,
            column,
            op,
            value: value.into(),
        }
    }

    fn into_expr(self) -> SimpleExpr {
        let lhs = match self.function {
            Some(f) => f.expr(self.column),
            None => self.column.into_simple_expr(),
        };
        let lhs = Expr::expr(lhs);
        match self.op {
            HavingOp::Eq => lhs.eq(self.value),
            HavingOp::Ne => lhs.ne(self.value),
            HavingOp::Gt => lhs.gt(self.value),
            HavingOp::Gte => lhs.gte(self.value),
            HavingOp::Lt => lhs.lt(self.value),
            HavingOp::Lte => lhs.lte(self.value),
        }
    }
}

/// 分组查询描述
#[derive(Debug, Clone)]
pub struct GroupBySpec<C: ColumnTrait> {
    pub by: Vec<C>,
    pub aggregates: AggregateSpec<C>,
    pub having: Vec<Having<C>>,
    pub order_by: Vec<(C, Direction)>,
}

impl<C: ColumnTrait> GroupBySpec<C> {
    pub fn by(columns: impl IntoIterator<Item = C>) -> Self {
        Self {
            by: columns.into_iter().collect(),
            aggregates: AggregateSpec::default(),
            having: Vec::new(),
            order_by: Vec::new(),
        }
    }

    #[must_use]
    pub fn aggregates(mut self, aggregates: AggregateSpec<C>) -> Self {
        self.aggregates = aggregates;
        self
    }

    #[must_use]
    pub fn having(mut self, having: Having<C>) -> Self {
        self.having.push(having);
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: C, direction: Direction) -> Self {
        self.order_by.push((column, direction));
        self
    }
}

impl<C, E> EntityDelegate<'_, C, E>
where
    C: ConnectionTrait + TransactionTrait,
    E: EntityTrait,
{
    /// 全量聚合：一行 JSON，键为 `_count_all` / `_min_<col>` 等
    pub async fn aggregate(
        &self,
        filter: Option<Filter<E::Column>>,
        spec: AggregateSpec<E::Column>,
    ) -> Result<JsonValue> {
        if spec.is_empty() {
            return Err(DataError::validation("聚合查询至少需要一个聚合函数"));
        }

        let mut select = E::find().select_only();
        if let Some(f) = filter {
            select = select.filter(f.into_condition());
        }
        if spec.count_all {
            select = select.column_as(Expr::cust("COUNT(*)"), "_count_all");
        }
        for (function, column) in spec.entries() {
            let alias = format!("{}_{}", function.prefix(), column.as_str());
            select = select.column_as(function.expr(column), alias);
        }

        // 聚合列是表达式列，SQLite 下不能走 into_json（声明类型缺失
        // 会整列丢失），按列名手动解码
        let stmt = select.build(self.conn.get_database_backend());
        let row = self.conn.query_one(stmt).await.map_err(DataError::from)?;
        match row {
            Some(row) => row_to_json(&row),
            None => Ok(JsonValue::Null),
        }
    }

    /// 分组聚合：每组一行 JSON，分组字段按原名输出
    ///
    /// order_by 与非聚合 having 引用的字段必须在 `by` 里，
    /// 校验在拼 SQL 之前完成
    pub async fn group_by(
        &self,
        filter: Option<Filter<E::Column>>,
        spec: GroupBySpec<E::Column>,
    ) -> Result<Vec<JsonValue>> {
        if spec.by.is_empty() {
            return Err(DataError::validation("分组字段列表不能为空"));
        }
        let grouped: Vec<&str> = spec.by.iter().map(|column| column.as_str()).collect();
        for (column, _) in &spec.order_by {
            if !grouped.contains(&column.as_str()) {
                return Err(DataError::validation(format!(
                    "orderBy 字段 {} 不在分组字段列表内",
                    column.as_str()
                )));
            }
        }
        for having in &spec.having {
            if having.function.is_none() && !grouped.contains(&having.column.as_str()) {
                return Err(DataError::validation(format!(
                    "having 字段 {} 未聚合且不在分组字段列表内",
                    having.column.as_str()
                )));
            }
        }

        let mut select = E::find().select_only();
        if let Some(f) = filter {
            select = select.filter(f.into_condition());
        }
        for &column in &spec.by {
            select = select.column(column).group_by(column);
        }
        if spec.aggregates.count_all {
            select = select.column_as(Expr::cust("COUNT(*)"), "_count_all");
        }
        for (function, column) in spec.aggregates.entries() {
            let alias = format!("{}_{}", function.prefix(), column.as_str());
            select = select.column_as(function.expr(column), alias);
        }
        for having in spec.having {
            select = select.having(having.into_expr());
        }
        for (column, direction) in spec.order_by {
            let order = match direction {
                Direction::Asc => sea_orm::Order::Asc,
                Direction::Desc => sea_orm::Order::Desc,
            };
            select = select.order_by(column, order);
        }

        let stmt = select.build(self.conn.get_database_backend());
        let rows = self.conn.query_all(stmt).await.map_err(DataError::from)?;
        rows.iter().map(row_to_json).collect()
    }
}
