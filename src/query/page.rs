//! # 分页规范
//!
//! take / skip 偏移分页，以及基于唯一键位置的游标分页。
//! take 为负数表示从游标处向前翻页

use sea_orm::{ColumnTrait, Value};

/// 游标：一个唯一键列上的扫描起点（不含起点行本身）
#[derive(Debug, Clone)]
pub struct Cursor<C: ColumnTrait> {
    pub column: C,
    pub value: Value,
}

impl<C: ColumnTrait> Cursor<C> {
    pub fn new(column: C, value: impl Into<Value>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// 分页参数
#[derive(Debug, Clone)]
pub struct Page<C: ColumnTrait> {
    /// 取多少行；负数表示从游标向前取
    pub take: Option<i64>,
    pub skip: Option<u64>,
    pub cursor: Option<Cursor<C>>,
}

impl<C: ColumnTrait> Default for Page<C> {
    fn default() -> Self {
        Self {
            take: None,
            skip: None,
            cursor: None,
        }
    }
}

impl<C: ColumnTrait> Page<C> {
    /// 是否向前（反向）翻页
    #[must_use]
    pub fn is_backward(&self) -> bool {
        self.take.is_some_and(|t| t < 0)
    }

    /// take 的绝对值
    #[must_use]
    pub fn take_abs(&self) -> Option<u64> {
        self.take.map(i64::unsigned_abs)
    }
}
