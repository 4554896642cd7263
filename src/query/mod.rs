//! # 查询构建模块
//!
//! 所有实体共享的通用查询描述：过滤谓词树、排序、分页（偏移 + 游标）、
//! 去重字段与变更文档。每个实体委托都复用这一套构建器，
//! 而不是为每个实体生成一份查询代码

pub mod filter;
pub mod mutation;
pub mod order;
pub mod page;

pub use filter::{Compare, Filter};
pub use mutation::FieldUpdate;
pub use order::{apply_order, Direction, Nulls, OrderBy};
pub use page::{Cursor, Page};

use sea_orm::{ColumnTrait, EntityTrait};

/// 一次读取操作的完整描述
#[derive(Debug, Clone)]
pub struct Query<E: EntityTrait> {
    pub filter: Option<Filter<E::Column>>,
    pub order: Vec<OrderBy<E::Column>>,
    pub page: Page<E::Column>,
    /// 去重字段列表；按排序后首行保留
    pub distinct: Vec<E::Column>,
}

impl<E: EntityTrait> Default for Query<E> {
    fn default() -> Self {
        Self {
            filter: None,
            order: Vec::new(),
            page: Page::default(),
            distinct: Vec::new(),
        }
    }
}

impl<E: EntityTrait> Query<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter<E::Column>) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn order_by(mut self, order: OrderBy<E::Column>) -> Self {
        self.order.push(order);
        self
    }

    #[must_use]
    pub fn take(mut self, take: i64) -> Self {
        self.page.take = Some(take);
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: u64) -> Self {
        self.page.skip = Some(skip);
        self
    }

    #[must_use]
    pub fn cursor(mut self, cursor: Cursor<E::Column>) -> Self {
        self.page.cursor = Some(cursor);
        self
    }

    #[must_use]
    pub fn distinct(mut self, columns: impl IntoIterator<Item = E::Column>) -> Self {
        self.distinct = columns.into_iter().collect();
        self
    }
}

/// 唯一键选择器：主键或唯一索引列的取值组合
#[derive(Debug, Clone)]
pub struct UniqueKey<C: sea_orm::ColumnTrait> {
    pub pairs: Vec<(C, sea_orm::Value)>,
}

impl<C: sea_orm::ColumnTrait> UniqueKey<C> {
    pub fn new(column: C, value: impl Into<sea_orm::Value>) -> Self {
        Self {
            pairs: vec![(column, value.into())],
        }
    }

    /// 复合唯一键（如 likes 的 (post_id, user_id)）
    pub fn composite<V: Into<sea_orm::Value>>(pairs: impl IntoIterator<Item = (C, V)>) -> Self {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(c, v)| (c, v.into()))
                .collect(),
        }
    }

    /// 降解为等值条件
    #[must_use]
    pub fn into_condition(self) -> sea_orm::Condition {
        self.pairs
            .into_iter()
            .fold(sea_orm::Condition::all(), |cond, (column, value)| {
                cond.add(column.eq(value))
            })
    }
}
