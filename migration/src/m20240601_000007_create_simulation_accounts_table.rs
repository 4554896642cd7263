use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SimulationAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SimulationAccounts::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    // 每个用户最多一个模拟账户
                    .col(
                        ColumnDef::new(SimulationAccounts::UserId)
                            .string_len(36)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SimulationAccounts::TotalAssets)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SimulationAccounts::CashBalance)
                            .decimal_len(16, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SimulationAccounts::ProfitLoss)
                            .decimal_len(16, 4)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SimulationAccounts::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SimulationAccounts::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_simulation_accounts_user_id")
                            .from(SimulationAccounts::Table, SimulationAccounts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SimulationAccounts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SimulationAccounts {
    Table,
    Id,
    UserId,
    TotalAssets,
    CashBalance,
    ProfitLoss,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
