//! # 字段变更文档
//!
//! update / update_many 的逐字段修改描述：直接赋值、数值增减乘除、
//! 列表追加。数值运算降解为 `SET col = col op ?`，并发修改可叠加

use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ColumnTrait, IdenStatic, Value};

/// 单字段变更
#[derive(Debug, Clone)]
pub enum FieldUpdate<C: ColumnTrait> {
    /// 直接赋值
    Set { column: C, value: Value },
    /// 数值/金额自增
    Increment { column: C, by: Value },
    /// 数值/金额自减
    Decrement { column: C, by: Value },
    Multiply { column: C, by: Value },
    Divide { column: C, by: Value },
    /// JSON 列表字段尾部追加一个元素
    Push { column: C, value: Value },
}

impl<C: ColumnTrait> FieldUpdate<C> {
    pub fn set(column: C, value: impl Into<Value>) -> Self {
        Self::Set {
            column,
            value: value.into(),
        }
    }

    pub fn increment(column: C, by: impl Into<Value>) -> Self {
        Self::Increment {
            column,
            by: by.into(),
        }
    }

    pub fn decrement(column: C, by: impl Into<Value>) -> Self {
        Self::Decrement {
            column,
            by: by.into(),
        }
    }

    pub fn multiply(column: C, by: impl Into<Value>) -> Self {
        Self::Multiply {
            column,
            by: by.into(),
        }
    }

    pub fn divide(column: C, by: impl Into<Value>) -> Self {
        Self::Divide {
            column,
            by: by.into(),
        }
    }

    pub fn push(column: C, value: impl Into<Value>) -> Self {
        Self::Push {
            column,
            value: value.into(),
        }
    }

    /// 目标列
    #[must_use]
    pub const fn target(&self) -> C
    where
        C: Copy,
    {
        match self {
            Self::Set { column, .. }
            | Self::Increment { column, .. }
            | Self::Decrement { column, .. }
            | Self::Multiply { column, .. }
            | Self::Divide { column, .. }
            | Self::Push { column, .. } => *column,
        }
    }

    /// 若为直接赋值则取出新值
    #[must_use]
    pub fn set_value(&self) -> Option<Value>
    where
        C: Copy,
    {
        match self {
            Self::Set { value, .. } => Some(value.clone()),
            _ => None,
        }
    }

    /// 降解为 `SET col = <expr>` 的右侧表达式
    #[must_use]
    pub fn into_expr(self) -> SimpleExpr {
        match self {
            Self::Set { value, .. } => Expr::value(value),
            Self::Increment { column, by } => Expr::col(column).add(Expr::value(by)),
            Self::Decrement { column, by } => Expr::col(column).sub(Expr::value(by)),
            Self::Multiply { column, by } => Expr::col(column).mul(Expr::value(by)),
            Self::Divide { column, by } => Expr::col(column).div(Expr::value(by)),
            // SQLite 的 json_insert 以 '$[#]' 追加到数组尾部
            Self::Push { column, value } => Expr::cust_with_values(
                format!("json_insert({}, '$[#]', ?)", column.as_str()),
                [value],
            ),
        }
    }
}
