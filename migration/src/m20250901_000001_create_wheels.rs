use sea_orm_migration::prelude::*;

/// Wheels (one row per configured wheel, sectors stored in order as JSON)
#[derive(DeriveIden)]
enum Wheels {
    Table,
    Id,
    CasinoId,
    Name,
    Sectors,
    Version,
    CreatedAt,
    UpdatedAt,
}

/// Wheel mini games (one row per spin request)
#[derive(DeriveIden)]
enum WheelMiniGames {
    Table,
    Id,
    WheelId,
    CasinoId,
    OperatorId,
    PlayerId,
    ProbabilityOverride,
    Status,
    SectorIndex,
    Prize,
    GrantAttempts,
    FailureReason,
    CreatedAt,
    UpdatedAt,
    ResolvedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wheels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Wheels::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Wheels::CasinoId).big_integer().not_null())
                    .col(ColumnDef::new(Wheels::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Wheels::Sectors).json_binary().not_null())
                    .col(
                        ColumnDef::new(Wheels::Version)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Wheels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Wheels::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // tenant lookups always filter by casino
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_wheels_casino")
                    .table(Wheels::Table)
                    .col(Wheels::CasinoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WheelMiniGames::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WheelMiniGames::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WheelMiniGames::WheelId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WheelMiniGames::CasinoId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WheelMiniGames::OperatorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WheelMiniGames::PlayerId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WheelMiniGames::ProbabilityOverride)
                            .json_binary()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(WheelMiniGames::Status)
                            .string_len(16)
                            .not_null()
                            .default("created"),
                    )
                    .col(ColumnDef::new(WheelMiniGames::SectorIndex).integer().null())
                    .col(ColumnDef::new(WheelMiniGames::Prize).json_binary().null())
                    .col(
                        ColumnDef::new(WheelMiniGames::GrantAttempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(WheelMiniGames::FailureReason).text().null())
                    .col(
                        ColumnDef::new(WheelMiniGames::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(WheelMiniGames::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(WheelMiniGames::ResolvedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_wheel_mini_games_wheel")
                    .table(WheelMiniGames::Table)
                    .col(WheelMiniGames::WheelId)
                    .to_owned(),
            )
            .await?;

        // grant sweeper scans resolved games by age
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_wheel_mini_games_status_resolved_at")
                    .table(WheelMiniGames::Table)
                    .col(WheelMiniGames::Status)
                    .col(WheelMiniGames::ResolvedAt)
                    .to_owned(),
            )
            .await?;

        // No ON DELETE CASCADE: a wheel with mini games can never be deleted
        manager
            .alter_table(
                Table::alter()
                    .table(WheelMiniGames::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_wheel_mini_game_wheel")
                            .from_tbl(WheelMiniGames::Table)
                            .from_col(WheelMiniGames::WheelId)
                            .to_tbl(Wheels::Table)
                            .to_col(Wheels::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(WheelMiniGames::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Wheels::Table).to_owned())
            .await?;

        Ok(())
    }
}
