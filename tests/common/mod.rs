//! 集成测试公共设施：内存数据库 + 常用的测试数据构造器

#![allow(dead_code)]

use rust_decimal::Decimal;
use sea_orm::{Database, Set};
use sea_orm_migration::MigratorTrait;

use entity::{likes, posts, simulation_accounts, transactions, users};
use fundlab_data::DataClient;

/// 每个测试一个独立的内存库，迁移全量应用
pub async fn setup() -> DataClient {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("连接内存数据库");
    migration::Migrator::up(&db, None).await.expect("应用迁移");
    DataClient::from_connection(db)
}

pub fn user(email: &str) -> users::ActiveModel {
    users::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set("hashed-password".to_string()),
        ..Default::default()
    }
}

pub fn named_user(email: &str, username: &str) -> users::ActiveModel {
    users::ActiveModel {
        email: Set(email.to_string()),
        username: Set(Some(username.to_string())),
        password_hash: Set("hashed-password".to_string()),
        ..Default::default()
    }
}

pub fn post(user_id: &str, title: &str) -> posts::ActiveModel {
    posts::ActiveModel {
        user_id: Set(user_id.to_string()),
        title: Set(title.to_string()),
        content: Set("测试内容".to_string()),
        category: Set("基金入门".to_string()),
        ..Default::default()
    }
}

pub fn like(post_id: &str, user_id: &str) -> likes::ActiveModel {
    likes::ActiveModel {
        post_id: Set(post_id.to_string()),
        user_id: Set(user_id.to_string()),
        ..Default::default()
    }
}

pub fn account(user_id: &str, cash: Decimal) -> simulation_accounts::ActiveModel {
    simulation_accounts::ActiveModel {
        user_id: Set(user_id.to_string()),
        total_assets: Set(cash),
        cash_balance: Set(cash),
        ..Default::default()
    }
}

pub fn trade(
    account_id: &str,
    trade_type: &str,
    shares: Decimal,
    price: Decimal,
) -> transactions::ActiveModel {
    transactions::ActiveModel {
        account_id: Set(account_id.to_string()),
        fund_code: Set("000001".to_string()),
        fund_name: Set("示例成长混合".to_string()),
        fund_type: Set("混合型".to_string()),
        trade_type: Set(trade_type.to_string()),
        shares: Set(shares),
        price: Set(price),
        total_amount: Set(shares * price),
        ..Default::default()
    }
}
