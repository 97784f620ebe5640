use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Price history is append-only; change_direction is computed at write
        // time against the latest prior row for the same (metal, category,
        // unit) and never recomputed
        manager
            .create_table(
                Table::create()
                    .table(GoldPrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GoldPrices::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GoldPrices::Metal).string_len(20).not_null())
                    .col(
                        ColumnDef::new(GoldPrices::Category)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(GoldPrices::Unit).string_len(20).not_null())
                    .col(
                        ColumnDef::new(GoldPrices::Price)
                            .decimal_len(16, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GoldPrices::ChangeDirection)
                            .string_len(10)
                            .null(),
                    )
                    .col(ColumnDef::new(GoldPrices::Source).string_len(50).not_null())
                    .col(ColumnDef::new(GoldPrices::FetchedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gold_prices_key_fetched")
                    .table(GoldPrices::Table)
                    .col(GoldPrices::Metal)
                    .col(GoldPrices::Category)
                    .col(GoldPrices::Unit)
                    .col(GoldPrices::FetchedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GoldPrices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum GoldPrices {
    Table,
    Id,
    Metal,
    Category,
    Unit,
    Price,
    ChangeDirection,
    Source,
    FetchedAt,
}
