use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RateLimitRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RateLimitRules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RateLimitRules::Endpoint)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RateLimitRules::Method)
                            .string_len(10)
                            .not_null()
                            .default("ALL"),
                    )
                    .col(ColumnDef::new(RateLimitRules::LimitCount).integer().not_null())
                    .col(
                        ColumnDef::new(RateLimitRules::WindowSeconds)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RateLimitRules::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(RateLimitRules::Description).text().null())
                    .col(
                        ColumnDef::new(RateLimitRules::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RateLimitRules::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_rate_limit_rules_endpoint_method")
                    .table(RateLimitRules::Table)
                    .col(RateLimitRules::Endpoint)
                    .col(RateLimitRules::Method)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IpBlockingRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IpBlockingRules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IpBlockingRules::IpAddress)
                            .string_len(45)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(IpBlockingRules::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(IpBlockingRules::BlockReason).text().null())
                    .col(
                        ColumnDef::new(IpBlockingRules::BlockedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IpBlockingRules::ExpiresAt).timestamp().null())
                    .col(
                        ColumnDef::new(IpBlockingRules::CreatedBy)
                            .string_len(100)
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IpBlockingRules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RateLimitRules::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RateLimitRules {
    Table,
    Id,
    Endpoint,
    Method,
    LimitCount,
    WindowSeconds,
    Enabled,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum IpBlockingRules {
    Table,
    Id,
    IpAddress,
    Enabled,
    BlockReason,
    BlockedAt,
    ExpiresAt,
    CreatedBy,
}
