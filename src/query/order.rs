//! # 排序规范

use sea_orm::sea_query::NullOrdering;
use sea_orm::{ColumnTrait, EntityTrait, Order, QueryOrder, Select};

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// 反向（用于负向 take 的游标前翻页）
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// 空值排序位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    First,
    Last,
}

/// 单字段排序项
#[derive(Debug, Clone)]
pub struct OrderBy<C: ColumnTrait> {
    pub column: C,
    pub direction: Direction,
    pub nulls: Option<Nulls>,
}

impl<C: ColumnTrait> OrderBy<C> {
    pub const fn asc(column: C) -> Self {
        Self {
            column,
            direction: Direction::Asc,
            nulls: None,
        }
    }

    pub const fn desc(column: C) -> Self {
        Self {
            column,
            direction: Direction::Desc,
            nulls: None,
        }
    }

    #[must_use]
    pub const fn nulls(mut self, nulls: Nulls) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

/// 把排序项应用到查询上；`reverse` 为真时整体反向
pub fn apply_order<E>(
    mut select: Select<E>,
    order: &[OrderBy<E::Column>],
    reverse: bool,
) -> Select<E>
where
    E: EntityTrait,
{
    for item in order {
        let direction = if reverse {
            item.direction.reversed()
        } else {
            item.direction
        };
        let sea_order = match direction {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        };
        select = match item.nulls {
            Some(Nulls::First) => {
                select.order_by_with_nulls(item.column, sea_order, NullOrdering::First)
            }
            Some(Nulls::Last) => {
                select.order_by_with_nulls(item.column, sea_order, NullOrdering::Last)
            }
            None => select.order_by(item.column, sea_order),
        };
    }
    select
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::users;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_order_with_nulls_last() {
        let select = apply_order(
            users::Entity::find(),
            &[OrderBy::asc(users::Column::Username).nulls(Nulls::Last)],
            false,
        );
        let sql = select.build(DbBackend::Sqlite).to_string();
        assert!(sql.contains("NULLS LAST"));
    }

    #[test]
    fn test_reverse_flips_direction() {
        let select = apply_order(
            users::Entity::find(),
            &[OrderBy::desc(users::Column::CreatedAt)],
            true,
        );
        let sql = select.build(DbBackend::Sqlite).to_string();
        assert!(sql.contains("ASC"));
    }
}
