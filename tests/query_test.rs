//! 列表查询：过滤、排序、分页（偏移 + 游标）、去重与投影

mod common;

use entity::users;
use fundlab_data::{
    Cursor, DataError, FieldUpdate, Filter, FindResult, Nulls, OrderBy, Query, UniqueKey,
    UserInclude,
};
use pretty_assertions::assert_eq;

async fn seed_users(client: &fundlab_data::DataClient, n: usize) {
    for i in 1..=n {
        client
            .users()
            .create(common::user(&format!("u{i}@fundlab.cn")))
            .await
            .expect("创建用户");
    }
}

fn emails(rows: Vec<users::Model>) -> Vec<String> {
    rows.into_iter().map(|u| u.email).collect()
}

#[tokio::test]
async fn test_filter_with_order() {
    let client = common::setup().await;
    seed_users(&client, 3).await;
    client
        .users()
        .update(
            UniqueKey::new(users::Column::Email, "u2@fundlab.cn"),
            vec![FieldUpdate::set(users::Column::Level, "ADVANCED")],
        )
        .await
        .expect("升级");

    let rows = client
        .users()
        .find_many(
            Query::new()
                .filter(Filter::eq(users::Column::Level, "BEGINNER"))
                .order_by(OrderBy::desc(users::Column::Email)),
        )
        .await
        .expect("查询");
    assert_eq!(emails(rows), vec!["u3@fundlab.cn", "u1@fundlab.cn"]);
}

#[tokio::test]
async fn test_take_skip_offset_pagination() {
    let client = common::setup().await;
    seed_users(&client, 5).await;

    let rows = client
        .users()
        .find_many(
            Query::new()
                .order_by(OrderBy::asc(users::Column::Email))
                .skip(1)
                .take(2),
        )
        .await
        .expect("查询");
    assert_eq!(emails(rows), vec!["u2@fundlab.cn", "u3@fundlab.cn"]);
}

#[tokio::test]
async fn test_negative_take_returns_tail_in_order() {
    let client = common::setup().await;
    seed_users(&client, 5).await;

    let rows = client
        .users()
        .find_many(
            Query::new()
                .order_by(OrderBy::asc(users::Column::Email))
                .take(-2),
        )
        .await
        .expect("查询");
    // 取末尾两行，但输出仍按请求的升序排列
    assert_eq!(emails(rows), vec!["u4@fundlab.cn", "u5@fundlab.cn"]);
}

#[tokio::test]
async fn test_cursor_pagination_excludes_anchor() {
    let client = common::setup().await;
    seed_users(&client, 5).await;

    let rows = client
        .users()
        .find_many(
            Query::new()
                .cursor(Cursor::new(users::Column::Email, "u2@fundlab.cn"))
                .take(2),
        )
        .await
        .expect("查询");
    assert_eq!(emails(rows), vec!["u3@fundlab.cn", "u4@fundlab.cn"]);
}

#[tokio::test]
async fn test_cursor_backward_pagination() {
    let client = common::setup().await;
    seed_users(&client, 5).await;

    let rows = client
        .users()
        .find_many(
            Query::new()
                .cursor(Cursor::new(users::Column::Email, "u4@fundlab.cn"))
                .take(-2),
        )
        .await
        .expect("查询");
    assert_eq!(emails(rows), vec!["u2@fundlab.cn", "u3@fundlab.cn"]);
}

#[tokio::test]
async fn test_distinct_keeps_first_per_value() {
    let client = common::setup().await;
    seed_users(&client, 4).await;
    for email in ["u1@fundlab.cn", "u2@fundlab.cn"] {
        client
            .users()
            .update(
                UniqueKey::new(users::Column::Email, email),
                vec![FieldUpdate::set(users::Column::Level, "ADVANCED")],
            )
            .await
            .expect("升级");
    }

    let rows = client
        .users()
        .find_many(
            Query::new()
                .order_by(OrderBy::asc(users::Column::Email))
                .distinct([users::Column::Level]),
        )
        .await
        .expect("查询");
    assert_eq!(
        emails(rows),
        vec!["u1@fundlab.cn", "u3@fundlab.cn"],
        "每个等级保留排序后的首行"
    );
}

#[tokio::test]
async fn test_distinct_dedupes_before_take() {
    let client = common::setup().await;
    seed_users(&client, 4).await;
    // u1/u2 同级，窗口内出现重复组合时 take 仍要凑满 distinct 行数
    for (email, level) in [
        ("u1@fundlab.cn", "BEGINNER"),
        ("u2@fundlab.cn", "BEGINNER"),
        ("u3@fundlab.cn", "INTERMEDIATE"),
        ("u4@fundlab.cn", "ADVANCED"),
    ] {
        client
            .users()
            .update(
                UniqueKey::new(users::Column::Email, email),
                vec![FieldUpdate::set(users::Column::Level, level)],
            )
            .await
            .expect("定级");
    }

    let rows = client
        .users()
        .find_many(
            Query::new()
                .order_by(OrderBy::asc(users::Column::Email))
                .distinct([users::Column::Level])
                .take(3),
        )
        .await
        .expect("查询");
    assert_eq!(
        emails(rows),
        vec!["u1@fundlab.cn", "u3@fundlab.cn", "u4@fundlab.cn"],
        "先去重再 take"
    );
}

#[tokio::test]
async fn test_contains_insensitive() {
    let client = common::setup().await;
    client
        .users()
        .create(common::user("Alice@FundLab.cn"))
        .await
        .expect("创建用户");

    let sensitive = client
        .users()
        .find_many(Query::new().filter(Filter::contains(users::Column::Email, "alice")))
        .await
        .expect("查询");
    let insensitive = client
        .users()
        .find_many(Query::new().filter(Filter::contains_insensitive(
            users::Column::Email,
            "ALICE",
        )))
        .await
        .expect("查询");

    assert!(sensitive.is_empty(), "大小写敏感匹配不命中");
    assert_eq!(insensitive.len(), 1);
}

#[tokio::test]
async fn test_order_nulls_last() {
    let client = common::setup().await;
    client
        .users()
        .create(common::user("anon@fundlab.cn"))
        .await
        .expect("创建用户");
    client
        .users()
        .create(common::named_user("named@fundlab.cn", "老基民"))
        .await
        .expect("创建用户");

    let rows = client
        .users()
        .find_many(
            Query::new().order_by(OrderBy::asc(users::Column::Username).nulls(Nulls::Last)),
        )
        .await
        .expect("查询");
    assert!(rows[0].username.is_some());
    assert!(rows[1].username.is_none(), "NULL 行排在末尾");
}

#[tokio::test]
async fn test_find_first_respects_order() {
    let client = common::setup().await;
    seed_users(&client, 3).await;

    let first = client
        .users()
        .find_first(Query::new().order_by(OrderBy::desc(users::Column::Email)))
        .await
        .expect("查询")
        .expect("应有结果");
    assert_eq!(first.email, "u3@fundlab.cn");

    let err = client
        .users()
        .find_first_or_throw(
            Query::new().filter(Filter::eq(users::Column::Email, "ghost@fundlab.cn")),
        )
        .await
        .expect_err("空结果必须报错");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_select_projects_requested_columns() {
    let client = common::setup().await;
    seed_users(&client, 2).await;

    let result = client
        .find_users(
            Query::new().order_by(OrderBy::asc(users::Column::Email)),
            Some(vec![users::Column::Email, users::Column::Level]),
            None,
        )
        .await
        .expect("查询");

    let FindResult::Projected(rows) = result else {
        panic!("期望投影结果");
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["email"], "u1@fundlab.cn");
    assert!(
        rows[0].get("password_hash").is_none(),
        "未选择的字段不应出现"
    );
}

#[tokio::test]
async fn test_omit_strips_configured_fields_from_projection() {
    use std::collections::HashMap;

    let client = common::setup().await.with_omit(HashMap::from([(
        "users".to_string(),
        vec!["password_hash".to_string()],
    )]));
    seed_users(&client, 1).await;

    let result = client
        .find_users(
            Query::new(),
            Some(vec![
                users::Column::Email,
                users::Column::PasswordHash,
                users::Column::Level,
            ]),
            None,
        )
        .await
        .expect("查询");

    let FindResult::Projected(rows) = result else {
        panic!("期望投影结果");
    };
    assert_eq!(rows[0]["email"], "u1@fundlab.cn");
    assert_eq!(rows[0]["level"], "BEGINNER");
    assert!(
        rows[0].get("password_hash").is_none(),
        "命中忽略规则的字段被剔除"
    );
}

#[tokio::test]
async fn test_select_and_include_are_exclusive() {
    let client = common::setup().await;
    let err = client
        .find_users(
            Query::new(),
            Some(vec![users::Column::Email]),
            Some(UserInclude {
                posts: Some(fundlab_data::RelationQuery::new()),
                ..Default::default()
            }),
        )
        .await
        .expect_err("select 与 include 互斥");
    assert!(matches!(err, DataError::Validation { .. }), "err: {err}");
}
