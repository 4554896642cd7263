//! 关联装载：一对多分组回填、嵌套过滤/限行、一对一装载

mod common;

use entity::{likes, posts, transactions, users};
use fundlab_data::{
    AccountInclude, Filter, FindResult, OrderBy, PostInclude, Query, RelationQuery, UserInclude,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_include_groups_children_by_parent() {
    let client = common::setup().await;
    let u1 = client
        .users()
        .create(common::user("writer@fundlab.cn"))
        .await
        .expect("创建用户");
    let u2 = client
        .users()
        .create(common::user("reader@fundlab.cn"))
        .await
        .expect("创建用户");
    for title in ["定投入门", "债基避坑"] {
        client
            .posts()
            .create(common::post(&u1.id, title))
            .await
            .expect("发帖");
    }
    client
        .posts()
        .create(common::post(&u2.id, "我的第一笔申购"))
        .await
        .expect("发帖");

    let result = client
        .find_users(
            Query::new().order_by(OrderBy::asc(users::Column::Email)),
            None,
            Some(UserInclude {
                posts: Some(RelationQuery::new().order_by(OrderBy::asc(posts::Column::Title))),
                ..Default::default()
            }),
        )
        .await
        .expect("查询");

    let FindResult::WithRelations(rows) = result else {
        panic!("期望带关联结果");
    };
    assert_eq!(rows.len(), 2);
    // 升序 email: reader 在前
    assert_eq!(rows[0].user.email, "reader@fundlab.cn");
    assert_eq!(
        rows[0].posts.as_ref().map(Vec::len),
        Some(1),
        "子行按父行分组"
    );
    assert_eq!(rows[1].posts.as_ref().map(Vec::len), Some(2));
    assert!(rows[0].comments.is_none(), "未 include 的关联保持 None");
}

#[tokio::test]
async fn test_include_nested_filter_and_take() {
    let client = common::setup().await;
    let user = client
        .users()
        .create(common::user("prolific@fundlab.cn"))
        .await
        .expect("创建用户");
    for title in ["a-入门", "b-进阶", "c-实盘"] {
        client
            .posts()
            .create(common::post(&user.id, title))
            .await
            .expect("发帖");
    }

    let result = client
        .find_users(
            Query::new(),
            None,
            Some(UserInclude {
                posts: Some(
                    RelationQuery::new()
                        .filter(Filter::ne(posts::Column::Title, "a-入门"))
                        .order_by(OrderBy::asc(posts::Column::Title))
                        .take(1),
                ),
                ..Default::default()
            }),
        )
        .await
        .expect("查询");

    let FindResult::WithRelations(rows) = result else {
        panic!("期望带关联结果");
    };
    let loaded = rows[0].posts.as_ref().expect("posts 已 include");
    assert_eq!(loaded.len(), 1, "take 按父行生效");
    assert_eq!(loaded[0].title, "b-进阶");
}

#[tokio::test]
async fn test_post_include_author_and_likes() {
    let client = common::setup().await;
    let author = client
        .users()
        .create(common::named_user("poster@fundlab.cn", "发帖人"))
        .await
        .expect("创建用户");
    let fan = client
        .users()
        .create(common::user("fan@fundlab.cn"))
        .await
        .expect("创建用户");
    let post = client
        .posts()
        .create(common::post(&author.id, "晒一晒持仓"))
        .await
        .expect("发帖");
    for uid in [&author.id, &fan.id] {
        client
            .likes()
            .create(common::like(&post.id, uid))
            .await
            .expect("点赞");
    }

    let result = client
        .find_posts(
            Query::new(),
            None,
            Some(PostInclude {
                author: true,
                likes: Some(RelationQuery::new().order_by(OrderBy::asc(likes::Column::UserId))),
                ..Default::default()
            }),
        )
        .await
        .expect("查询");

    let FindResult::WithRelations(rows) = result else {
        panic!("期望带关联结果");
    };
    assert_eq!(rows.len(), 1);
    let loaded_author = rows[0]
        .author
        .as_ref()
        .expect("author 已 include")
        .as_ref()
        .expect("外键非空，作者必在");
    assert_eq!(loaded_author.email, "poster@fundlab.cn");
    assert_eq!(rows[0].likes.as_ref().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_user_include_one_to_one_account() {
    let client = common::setup().await;
    let funded = client
        .users()
        .create(common::user("funded@fundlab.cn"))
        .await
        .expect("创建用户");
    client
        .users()
        .create(common::user("unfunded@fundlab.cn"))
        .await
        .expect("创建用户");
    client
        .simulation_accounts()
        .create(common::account(&funded.id, dec!(10000)))
        .await
        .expect("开户");

    let result = client
        .find_users(
            Query::new().order_by(OrderBy::asc(users::Column::Email)),
            None,
            Some(UserInclude {
                simulation_account: true,
                ..Default::default()
            }),
        )
        .await
        .expect("查询");

    let FindResult::WithRelations(rows) = result else {
        panic!("期望带关联结果");
    };
    // funded < unfunded
    let funded_account = rows[0].simulation_account.as_ref().expect("已 include");
    assert!(funded_account.is_some());
    let unfunded_account = rows[1].simulation_account.as_ref().expect("已 include");
    assert!(unfunded_account.is_none(), "没有账户的用户装载为 None");
}

#[tokio::test]
async fn test_account_include_positions_and_transactions() {
    let client = common::setup().await;
    let user = client
        .users()
        .create(common::user("active@fundlab.cn"))
        .await
        .expect("创建用户");
    let account = client
        .simulation_accounts()
        .create(common::account(&user.id, dec!(10000)))
        .await
        .expect("开户");
    client
        .transactions()
        .create(common::trade(
            &account.id,
            entity::transactions::TRADE_BUY,
            dec!(100),
            dec!(1.5),
        ))
        .await
        .expect("买入");
    client
        .transactions()
        .create(common::trade(
            &account.id,
            entity::transactions::TRADE_SELL,
            dec!(40),
            dec!(1.75),
        ))
        .await
        .expect("卖出");

    let result = client
        .find_simulation_accounts(
            Query::new(),
            None,
            Some(AccountInclude {
                transactions: Some(RelationQuery::new().filter(Filter::eq(
                    transactions::Column::TradeType,
                    entity::transactions::TRADE_BUY,
                ))),
                positions: Some(RelationQuery::new()),
            }),
        )
        .await
        .expect("查询");

    let FindResult::WithRelations(rows) = result else {
        panic!("期望带关联结果");
    };
    assert_eq!(rows.len(), 1);
    let trades = rows[0].transactions.as_ref().expect("已 include");
    assert_eq!(trades.len(), 1, "嵌套过滤只保留买入流水");
    assert_eq!(trades[0].total_amount, dec!(150));
    assert_eq!(rows[0].positions.as_ref().map(Vec::len), Some(0));
}
