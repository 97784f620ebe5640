use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HadithCollections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HadithCollections::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HadithCollections::CollectionKey)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(HadithCollections::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(HadithCollections::TotalHadith).integer().null())
                    .col(
                        ColumnDef::new(HadithCollections::Source)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HadithCollections::LastSynced)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HadithCollections::RawResponse).json_binary().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HadithBooks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HadithBooks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HadithBooks::CollectionId).integer().not_null())
                    .col(ColumnDef::new(HadithBooks::BookNumber).integer().not_null())
                    .col(ColumnDef::new(HadithBooks::Name).string_len(255).not_null())
                    .col(ColumnDef::new(HadithBooks::Source).string_len(50).not_null())
                    .col(ColumnDef::new(HadithBooks::LastSynced).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hadith_books_collection")
                            .from(HadithBooks::Table, HadithBooks::CollectionId)
                            .to(HadithCollections::Table, HadithCollections::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_hadith_books_collection_number")
                    .table(HadithBooks::Table)
                    .col(HadithBooks::CollectionId)
                    .col(HadithBooks::BookNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Hadiths::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Hadiths::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Hadiths::CollectionId).integer().not_null())
                    .col(ColumnDef::new(Hadiths::BookId).integer().null())
                    .col(
                        ColumnDef::new(Hadiths::HadithNumber)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Hadiths::TextAr).text().null())
                    .col(ColumnDef::new(Hadiths::TextEn).text().null())
                    // Denormalized projection written only by the translation
                    // pipeline on job completion
                    .col(ColumnDef::new(Hadiths::TextBn).text().null())
                    .col(ColumnDef::new(Hadiths::Grade).string_len(100).null())
                    .col(ColumnDef::new(Hadiths::Source).string_len(50).not_null())
                    .col(ColumnDef::new(Hadiths::LastSynced).timestamp().not_null())
                    .col(ColumnDef::new(Hadiths::RawResponse).json_binary().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hadiths_collection")
                            .from(Hadiths::Table, Hadiths::CollectionId)
                            .to(HadithCollections::Table, HadithCollections::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_hadiths_collection_number")
                    .table(Hadiths::Table)
                    .col(Hadiths::CollectionId)
                    .col(Hadiths::HadithNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Hadiths::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HadithBooks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HadithCollections::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum HadithCollections {
    Table,
    Id,
    CollectionKey,
    Name,
    TotalHadith,
    Source,
    LastSynced,
    RawResponse,
}

#[derive(Iden)]
enum HadithBooks {
    Table,
    Id,
    CollectionId,
    BookNumber,
    Name,
    Source,
    LastSynced,
}

#[derive(Iden)]
enum Hadiths {
    Table,
    Id,
    CollectionId,
    BookId,
    HadithNumber,
    TextAr,
    TextEn,
    TextBn,
    Grade,
    Source,
    LastSynced,
    RawResponse,
}
