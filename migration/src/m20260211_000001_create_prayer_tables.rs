use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CalculationMethods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CalculationMethods::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CalculationMethods::MethodId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(CalculationMethods::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CalculationMethods::Params).json_binary().null())
                    .col(
                        ColumnDef::new(CalculationMethods::Source)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CalculationMethods::LastSynced)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CalculationMethods::RawResponse).json_binary().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PrayerTimes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrayerTimes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PrayerTimes::LocationKey)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PrayerTimes::Date).date().not_null())
                    .col(ColumnDef::new(PrayerTimes::Method).integer().not_null())
                    .col(ColumnDef::new(PrayerTimes::School).integer().not_null())
                    .col(ColumnDef::new(PrayerTimes::Latitude).double().not_null())
                    .col(ColumnDef::new(PrayerTimes::Longitude).double().not_null())
                    .col(ColumnDef::new(PrayerTimes::Fajr).string_len(10).not_null())
                    .col(ColumnDef::new(PrayerTimes::Sunrise).string_len(10).not_null())
                    .col(ColumnDef::new(PrayerTimes::Dhuhr).string_len(10).not_null())
                    .col(ColumnDef::new(PrayerTimes::Asr).string_len(10).not_null())
                    .col(ColumnDef::new(PrayerTimes::Maghrib).string_len(10).not_null())
                    .col(ColumnDef::new(PrayerTimes::Isha).string_len(10).not_null())
                    .col(
                        ColumnDef::new(PrayerTimes::Source)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrayerTimes::LastSynced)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PrayerTimes::RawResponse).json_binary().null())
                    .to_owned(),
            )
            .await?;

        // Natural key: one row per location/date/method/school
        manager
            .create_index(
                Index::create()
                    .name("uq_prayer_times_natural_key")
                    .table(PrayerTimes::Table)
                    .col(PrayerTimes::LocationKey)
                    .col(PrayerTimes::Date)
                    .col(PrayerTimes::Method)
                    .col(PrayerTimes::School)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PrayerTimes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CalculationMethods::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CalculationMethods {
    Table,
    Id,
    MethodId,
    Name,
    Params,
    Source,
    LastSynced,
    RawResponse,
}

#[derive(Iden)]
enum PrayerTimes {
    Table,
    Id,
    LocationKey,
    Date,
    Method,
    School,
    Latitude,
    Longitude,
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
    Source,
    LastSynced,
    RawResponse,
}
