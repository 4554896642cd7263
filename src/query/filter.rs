//! # 过滤条件树
//!
//! 由每字段比较组成、可用 AND / OR / NOT 组合的查询谓词，
//! 最终降解为 Sea-ORM 的 `Condition`

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, Condition, IdenStatic, IntoSimpleExpr, Value};

/// 单字段比较操作
#[derive(Debug, Clone)]
pub enum Compare {
    Equals(Value),
    NotEquals(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    Lt(Value),
    Lte(Value),
    Gt(Value),
    Gte(Value),
    /// 子串匹配，insensitive 时两侧都转小写比较
    Contains { needle: String, insensitive: bool },
    StartsWith { prefix: String, insensitive: bool },
    EndsWith { suffix: String, insensitive: bool },
    IsNull,
    IsNotNull,
}

/// 过滤谓词树
#[derive(Debug, Clone)]
pub enum Filter<C: ColumnTrait> {
    And(Vec<Filter<C>>),
    Or(Vec<Filter<C>>),
    Not(Box<Filter<C>>),
    Field { column: C, op: Compare },
}

impl<C: ColumnTrait> Filter<C> {
    pub fn eq(column: C, value: impl Into<Value>) -> Self {
        Self::Field {
            column,
            op: Compare::Equals(value.into()),
        }
    }

    pub fn ne(column: C, value: impl Into<Value>) -> Self {
        Self::Field {
            column,
            op: Compare::NotEquals(value.into()),
        }
    }

    pub fn is_in<V: Into<Value>>(column: C, values: impl IntoIterator<Item = V>) -> Self {
        Self::Field {
            column,
            op: Compare::In(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn not_in<V: Into<Value>>(column: C, values: impl IntoIterator<Item = V>) -> Self {
        Self::Field {
            column,
            op: Compare::NotIn(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn lt(column: C, value: impl Into<Value>) -> Self {
        Self::Field {
            column,
            op: Compare::Lt(value.into()),
        }
    }

    pub fn lte(column: C, value: impl Into<Value>) -> Self {
        Self::Field {
            column,
            op: Compare::Lte(value.into()),
        }
    }

    pub fn gt(column: C, value: impl Into<Value>) -> Self {
        Self::Field {
            column,
            op: Compare::Gt(value.into()),
        }
    }

    pub fn gte(column: C, value: impl Into<Value>) -> Self {
        Self::Field {
            column,
            op: Compare::Gte(value.into()),
        }
    }

    pub fn contains(column: C, needle: impl Into<String>) -> Self {
        Self::Field {
            column,
            op: Compare::Contains {
                needle: needle.into(),
                insensitive: false,
            },
        }
    }

    pub fn contains_insensitive(column: C, needle: impl Into<String>) -> Self {
        Self::Field {
            column,
            op: Compare::Contains {
                needle: needle.into(),
                insensitive: true,
            },
        }
    }

    pub fn starts_with(column: C, prefix: impl Into<String>) -> Self {
        Self::Field {
            column,
            op: Compare::StartsWith {
                prefix: prefix.into(),
                insensitive: false,
            },
        }
    }

    pub fn ends_with(column: C, suffix: impl Into<String>) -> Self {
        Self::Field {
            column,
            op: Compare::EndsWith {
                suffix: suffix.into(),
                insensitive: false,
            },
        }
    }

    pub fn is_null(column: C) -> Self {
        Self::Field {
            column,
            op: Compare::IsNull,
        }
    }

    pub fn is_not_null(column: C) -> Self {
        Self::Field {
            column,
            op: Compare::IsNotNull,
        }
    }

    pub fn and(filters: impl IntoIterator<Item = Self>) -> Self {
        Self::And(filters.into_iter().collect())
    }

    pub fn or(filters: impl IntoIterator<Item = Self>) -> Self {
        Self::Or(filters.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Self) -> Self {
        Self::Not(Box::new(filter))
    }

    /// 降解为 Sea-ORM 条件
    #[must_use]
    pub fn into_condition(self) -> Condition {
        match self {
            Self::And(filters) => filters
                .into_iter()
                .fold(Condition::all(), |cond, f| cond.add(f.into_condition())),
            Self::Or(filters) => filters
                .into_iter()
                .fold(Condition::any(), |cond, f| cond.add(f.into_condition())),
            Self::Not(inner) => inner.into_condition().not(),
            Self::Field { column, op } => Condition::all().add(lower_compare(column, op)),
        }
    }
}

/// 将单字段比较降解为条件
fn lower_compare<C: ColumnTrait>(column: C, op: Compare) -> Condition {
    let expr = match op {
        Compare::Equals(v) => column.eq(v),
        Compare::NotEquals(v) => column.ne(v),
        Compare::In(values) => column.is_in(values),
        Compare::NotIn(values) => column.is_not_in(values),
        Compare::Lt(v) => column.lt(v),
        Compare::Lte(v) => column.lte(v),
        Compare::Gt(v) => column.gt(v),
        Compare::Gte(v) => column.gte(v),
        Compare::Contains { needle, insensitive } => {
            return if insensitive {
                insensitive_like(column, format!("%{}%", needle.to_lowercase()))
            } else {
                // SQLite 的 LIKE 对 ASCII 不区分大小写，
                // 敏感匹配用 INSTR 逐字符定位
                Condition::all().add(
                    Expr::expr(Expr::cust_with_values(
                        format!("INSTR({}, ?)", column.as_str()),
                        [needle],
                    ))
                    .gt(0),
                )
            };
        }
        Compare::StartsWith { prefix, insensitive } => {
            return if insensitive {
                insensitive_like(column, format!("{}%", prefix.to_lowercase()))
            } else {
                Condition::all().add(
                    Expr::expr(Expr::cust_with_values(
                        format!("INSTR({}, ?)", column.as_str()),
                        [prefix],
                    ))
                    .eq(1),
                )
            };
        }
        Compare::EndsWith { suffix, insensitive } => {
            return if insensitive {
                insensitive_like(column, format!("%{}", suffix.to_lowercase()))
            } else {
                Condition::all().add(Expr::cust_with_values(
                    format!("SUBSTR({}, -LENGTH(?)) = ?", column.as_str()),
                    [suffix.clone(), suffix],
                ))
            };
        }
        Compare::IsNull => column.is_null(),
        Compare::IsNotNull => column.is_not_null(),
    };
    Condition::all().add(expr)
}

fn insensitive_like<C: ColumnTrait>(column: C, pattern: String) -> Condition {
    Condition::all().add(Expr::expr(Func::lower(column.into_simple_expr())).like(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::users;
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn to_sql(filter: Filter<users::Column>) -> String {
        users::Entity::find()
            .filter(filter.into_condition())
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn test_and_or_composition() {
        let sql = to_sql(Filter::or([
            Filter::eq(users::Column::Level, "BEGINNER"),
            Filter::and([
                Filter::gte(users::Column::CreatedAt, "2024-01-01 00:00:00"),
                Filter::is_not_null(users::Column::Username),
            ]),
        ]));
        assert!(sql.contains("OR"));
        assert!(sql.contains("AND"));
        assert!(sql.contains("IS NOT NULL"));
    }

    #[test]
    fn test_not_negates() {
        let sql = to_sql(Filter::not(Filter::eq(users::Column::Level, "ADVANCED")));
        assert!(sql.contains("NOT"));
    }

    #[test]
    fn test_in_list() {
        let sql = to_sql(Filter::is_in(
            users::Column::Level,
            ["BEGINNER", "INTERMEDIATE"],
        ));
        assert!(sql.contains("IN"));
    }

    #[test]
    fn test_contains_insensitive_lowers_both_sides() {
        let sql = to_sql(Filter::contains_insensitive(users::Column::Email, "X.COM"));
        assert!(sql.contains("LOWER"));
        assert!(sql.contains("%x.com%"));
    }

    #[test]
    fn test_sensitive_contains_avoids_like() {
        let sql = to_sql(Filter::contains(users::Column::Email, "Alice"));
        assert!(sql.contains("INSTR"), "sql: {sql}");
        assert!(!sql.contains("LIKE"), "sql: {sql}");
    }

    #[test]
    fn test_sensitive_starts_with_anchors_at_one() {
        let sql = to_sql(Filter::starts_with(users::Column::Email, "admin@"));
        assert!(sql.contains("INSTR"), "sql: {sql}");
        assert!(sql.contains("= 1"), "sql: {sql}");
    }

    #[test]
    fn test_sensitive_ends_with_compares_tail() {
        let sql = to_sql(Filter::ends_with(users::Column::Email, ".cn"));
        assert!(sql.contains("SUBSTR"), "sql: {sql}");
    }
}
