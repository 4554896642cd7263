//! # 实体定义测试
//!
//! 测试所有 Sea-ORM 实体定义的正确性

#[cfg(test)]
mod tests {
    use crate::{
        articles, collections, comments, likes, posts, positions, simulation_accounts,
        transactions, users,
    };
    use rust_decimal_macros::dec;
    use sea_orm::Set;

    #[tokio::test]
    async fn test_user_creation() {
        // 测试用户实体可以正常创建
        let user = users::ActiveModel {
            email: Set("test@example.com".to_string()),
            username: Set(Some("test_user".to_string())),
            password_hash: Set("hash123".to_string()),
            ..Default::default()
        };

        assert_eq!(user.email.as_ref(), "test@example.com");
        assert_eq!(user.username.as_ref(), &Some("test_user".to_string()));
        assert!(user.level.is_not_set());
    }

    #[tokio::test]
    async fn test_post_creation() {
        // 测试帖子实体，冗余计数默认由 before_save 填 0
        let post = posts::ActiveModel {
            user_id: Set("u-1".to_string()),
            title: Set("新手如何挑选指数基金".to_string()),
            content: Set("分享一下我的选基思路".to_string()),
            category: Set("经验分享".to_string()),
            ..Default::default()
        };

        assert_eq!(post.user_id.as_ref(), "u-1");
        assert_eq!(post.title.as_ref(), "新手如何挑选指数基金");
        assert!(post.like_count.is_not_set());
        assert!(post.comment_count.is_not_set());
    }

    #[tokio::test]
    async fn test_like_creation() {
        // 测试点赞实体
        let like = likes::ActiveModel {
            post_id: Set("p-1".to_string()),
            user_id: Set("u-1".to_string()),
            ..Default::default()
        };

        assert_eq!(like.post_id.as_ref(), "p-1");
        assert_eq!(like.user_id.as_ref(), "u-1");
    }

    #[tokio::test]
    async fn test_simulation_account_creation() {
        // 测试模拟账户实体，金额字段使用 Decimal
        let account = simulation_accounts::ActiveModel {
            user_id: Set("u-1".to_string()),
            total_assets: Set(dec!(100000.00)),
            cash_balance: Set(dec!(100000.00)),
            ..Default::default()
        };

        assert_eq!(account.user_id.as_ref(), "u-1");
        assert_eq!(account.total_assets.as_ref(), &dec!(100000.00));
        assert!(account.profit_loss.is_not_set());
    }

    #[tokio::test]
    async fn test_transaction_creation() {
        // 测试交易流水实体
        let txn = transactions::ActiveModel {
            account_id: Set("a-1".to_string()),
            fund_code: Set("110011".to_string()),
            fund_name: Set("易方达中小盘混合".to_string()),
            fund_type: Set("混合型".to_string()),
            trade_type: Set(transactions::TRADE_BUY.to_string()),
            shares: Set(dec!(100.5)),
            price: Set(dec!(4.25)),
            total_amount: Set(dec!(427.125)),
            ..Default::default()
        };

        assert_eq!(txn.fund_code.as_ref(), "110011");
        assert_eq!(txn.trade_type.as_ref(), transactions::TRADE_BUY);
        assert_eq!(txn.total_amount.as_ref(), &dec!(427.125));
    }

    #[test]
    fn test_all_entities_compile() {
        // 确保所有实体都能编译通过
        println!("✅ 所有实体定义编译通过");
        println!("- Users: {}", std::any::type_name::<users::Entity>());
        println!("- Articles: {}", std::any::type_name::<articles::Entity>());
        println!("- Posts: {}", std::any::type_name::<posts::Entity>());
        println!("- Comments: {}", std::any::type_name::<comments::Entity>());
        println!("- Likes: {}", std::any::type_name::<likes::Entity>());
        println!("- Collections: {}", std::any::type_name::<collections::Entity>());
        println!(
            "- SimulationAccounts: {}",
            std::any::type_name::<simulation_accounts::Entity>()
        );
        println!("- Positions: {}", std::any::type_name::<positions::Entity>());
        println!(
            "- Transactions: {}",
            std::any::type_name::<transactions::Entity>()
        );
    }
}
