//! # 收藏实体定义
//!
//! 用户收藏夹条目，指向一篇文章或一条帖子（二选一）

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// 收藏实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "collections")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// 收藏者ID (外键)
    pub user_id: String,
    /// 收藏的文章ID，与 post_id 互斥
    pub article_id: Option<String>,
    /// 收藏的帖子ID，与 article_id 互斥
    pub post_id: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
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
