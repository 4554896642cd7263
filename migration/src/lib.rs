pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_users_table;
mod m20240601_000002_create_articles_table;
mod m20240601_000003_create_posts_table;
mod m20240601_000004_create_comments_table;
mod m20240601_000005_create_likes_table;
mod m20240601_000006_create_collections_table;
mod m20240601_000007_create_simulation_accounts_table;
mod m20240601_000008_create_positions_table;
mod m20240601_000009_create_transactions_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users_table::Migration),
            Box::new(m20240601_000002_create_articles_table::Migration),
            Box::new(m20240601_000003_create_posts_table::Migration),
            Box::new(m20240601_000004_create_comments_table::Migration),
            Box::new(m20240601_000005_create_likes_table::Migration),
            Box::new(m20240601_000006_create_collections_table::Migration),
            Box::new(m20240601_000007_create_simulation_accounts_table::Migration),
            Box::new(m20240601_000008_create_positions_table::Migration),
            Box::new(m20240601_000009_create_transactions_table::Migration),
        ]
    }
}
