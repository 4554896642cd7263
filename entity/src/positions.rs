//! # 持仓实体定义
//!
//! 模拟账户下单只基金的持仓快照

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// 持仓实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "positions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// 所属模拟账户ID (外键)
    pub account_id: String,
    /// 基金代码
    pub fund_code: String,
    pub fund_name: String,
    /// 基金类型（股票型/债券型/混合型/货币型等）
    pub fund_type: String,
    /// 持有份额
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub shares: Decimal,
    /// 平均成本
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub avg_cost: Decimal,
    /// 持仓盈亏
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub profit_loss: Decimal,
    pub created_at: DateTime,
    pub updated_at: DateTime,
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
        let now = chrono::Utc::now().naive_utc();
        if insert {
            if self.id.is_not_set() {
                self.id = Set(uuid::Uuid::new_v4().to_string());
            }
            if self.profit_loss.is_not_set() {
                self.profit_loss = Set(Decimal::ZERO);
            }
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
