//! # 文章实体定义
//!
//! 平台运营的学习文章表，独立内容，不关联其他实体

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// 文章实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub summary: Option<String>,
    /// 阅读难度（BEGINNER / INTERMEDIATE / ADVANCED）
    pub difficulty: String,
    pub category: String,
    /// 标签列表，JSON 字符串数组
    pub tags: Json,
    /// 预计阅读时长（分钟）
    pub read_time: i32,
    pub view_count: i32,
    pub cover_image: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

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
            if self.tags.is_not_set() {
                self.tags = Set(serde_json::json!([]));
            }
            if self.view_count.is_not_set() {
                self.view_count = Set(0);
            }
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
