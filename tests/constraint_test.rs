//! 约束冲突的错误分类：唯一索引、外键、批量插入跳过重复

mod common;

use entity::comments;
use fundlab_data::DataError;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use sea_orm::Set;

#[tokio::test]
async fn test_duplicate_like_reports_conflicting_fields() {
    let client = common::setup().await;
    let user = client
        .users()
        .create(common::user("liker@fundlab.cn"))
        .await
        .expect("创建用户");
    let post = client
        .posts()
        .create(common::post(&user.id, "第一只基金怎么选"))
        .await
        .expect("发帖");

    client
        .likes()
        .create(common::like(&post.id, &user.id))
        .await
        .expect("首次点赞");

    let err = client
        .likes()
        .create(common::like(&post.id, &user.id))
        .await
        .expect_err("重复点赞必须失败");

    match err {
        DataError::UniqueViolation { fields, .. } => {
            assert_eq!(fields, vec!["post_id", "user_id"], "冲突字段来自唯一索引");
        }
        other => panic!("期望唯一约束冲突，实际: {other}"),
    }
}

#[tokio::test]
async fn test_second_account_per_user_rejected() {
    let client = common::setup().await;
    let user = client
        .users()
        .create(common::user("onefund@fundlab.cn"))
        .await
        .expect("创建用户");

    client
        .simulation_accounts()
        .create(common::account(&user.id, dec!(10000)))
        .await
        .expect("开户");

    let err = client
        .simulation_accounts()
        .create(common::account(&user.id, dec!(500)))
        .await
        .expect_err("同一用户第二个账户必须失败");
    assert!(err.is_unique_violation(), "err: {err}");
    if let DataError::UniqueViolation { fields, .. } = err {
        assert_eq!(fields, vec!["user_id"]);
    }
}

#[tokio::test]
async fn test_dangling_foreign_key_rejected() {
    let client = common::setup().await;
    let user = client
        .users()
        .create(common::user("commenter@fundlab.cn"))
        .await
        .expect("创建用户");

    let orphan = comments::ActiveModel {
        post_id: Set("no-such-post".to_string()),
        user_id: Set(user.id),
        content: Set("这只基金怎么样".to_string()),
        ..Default::default()
    };
    let err = client
        .comments()
        .create(orphan)
        .await
        .expect_err("外键悬空必须失败");
    assert!(
        matches!(err, DataError::ForeignKeyViolation { .. }),
        "err: {err}"
    );
}

#[tokio::test]
async fn test_create_many_without_skip_fails_whole_batch() {
    let client = common::setup().await;
    client
        .users()
        .create(common::user("taken@fundlab.cn"))
        .await
        .expect("创建用户");

    let err = client
        .users()
        .create_many(
            vec![
                common::user("fresh@fundlab.cn"),
                common::user("taken@fundlab.cn"),
            ],
            false,
        )
        .await
        .expect_err("包含重复 email 的整批必须失败");
    assert!(err.is_unique_violation(), "err: {err}");
}

#[tokio::test]
async fn test_create_many_skip_duplicates_inserts_rest() {
    let client = common::setup().await;
    client
        .users()
        .create(common::user("taken@fundlab.cn"))
        .await
        .expect("创建用户");

    let inserted = client
        .users()
        .create_many(
            vec![
                common::user("fresh1@fundlab.cn"),
                common::user("taken@fundlab.cn"),
                common::user("fresh2@fundlab.cn"),
            ],
            true,
        )
        .await
        .expect("跳过重复后其余应入库");
    assert_eq!(inserted, 2, "重复行被静默跳过");
    assert_eq!(client.users().count(None).await.expect("计数"), 3);
}

#[tokio::test]
async fn test_cascade_delete_removes_children() {
    let client = common::setup().await;
    let user = client
        .users()
        .create(common::user("author@fundlab.cn"))
        .await
        .expect("创建用户");
    let post = client
        .posts()
        .create(common::post(&user.id, "定投三年实录"))
        .await
        .expect("发帖");
    client
        .likes()
        .create(common::like(&post.id, &user.id))
        .await
        .expect("点赞");

    client
        .posts()
        .delete(fundlab_data::UniqueKey::new(
            entity::posts::Column::Id,
            post.id,
        ))
        .await
        .expect("删帖");

    assert_eq!(client.likes().count(None).await.expect("计数"), 0, "点赞随帖级联删除");
}
