use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Articles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Articles::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Articles::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Articles::Content).text().not_null())
                    .col(ColumnDef::new(Articles::Summary).string_len(512))
                    .col(
                        ColumnDef::new(Articles::Difficulty)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Articles::Category)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Articles::Tags).json().not_null())
                    .col(ColumnDef::new(Articles::ReadTime).integer().not_null())
                    .col(
                        ColumnDef::new(Articles::ViewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Articles::CoverImage).string_len(512))
                    .col(
                        ColumnDef::new(Articles::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Articles::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .name("idx_articles_category")
                    .table(Articles::Table)
                    .col(Articles::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_articles_difficulty")
                    .table(Articles::Table)
                    .col(Articles::Difficulty)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Articles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Articles {
    Table,
    Id,
    Title,
    Content,
    Summary,
    Difficulty,
    Category,
    Tags,
    ReadTime,
    ViewCount,
    CoverImage,
    CreatedAt,
    UpdatedAt,
}
