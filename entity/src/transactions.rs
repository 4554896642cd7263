//! # 交易流水实体定义
//!
//! 模拟账户的买入/卖出记录，只增不改

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// 买入方向
pub const TRADE_BUY: &str = "BUY";
/// 卖出方向
pub const TRADE_SELL: &str = "SELL";

/// 交易流水实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// 所属模拟账户ID (外键)
    pub account_id: String,
    pub fund_code: String,
    pub fund_name: String,
    pub fund_type: String,
    /// 交易方向（BUY / SELL）
    pub trade_type: String,
    /// 成交份额
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub shares: Decimal,
    /// 成交净值
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub price: Decimal,
    /// 成交总额
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub total_amount: Decimal,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::simulation_accounts::Entity",
        from = "Column::AccountId",
        to = "super::simulation_accounts::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    SimulationAccount,
}

impl Related<super::simulation_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SimulationAccount.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if self.id.is_not_set() {
                self.id = Set(uuid::Uuid::new_v4().to_string());
            }
            if self.created_at.is_not_set() {
                self.created_at = Set(chrono::Utc::now().naive_utc());
            }
        }
        Ok(self)
    }
}
