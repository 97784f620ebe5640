use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reciters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reciters::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Reciters::SourceId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Reciters::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Reciters::Style).string_len(100).null())
                    .col(ColumnDef::new(Reciters::Source).string_len(50).not_null())
                    .col(ColumnDef::new(Reciters::LastSynced).timestamp().not_null())
                    .col(ColumnDef::new(Reciters::RawResponse).json_binary().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AudioFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AudioFiles::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AudioFiles::VerseKey)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AudioFiles::ReciterId).integer().not_null())
                    .col(ColumnDef::new(AudioFiles::AudioUrl).text().not_null())
                    .col(ColumnDef::new(AudioFiles::Format).string_len(20).null())
                    .col(ColumnDef::new(AudioFiles::Source).string_len(50).not_null())
                    .col(ColumnDef::new(AudioFiles::LastSynced).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_audio_files_reciter")
                            .from(AudioFiles::Table, AudioFiles::ReciterId)
                            .to(Reciters::Table, Reciters::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_audio_files_verse_reciter")
                    .table(AudioFiles::Table)
                    .col(AudioFiles::VerseKey)
                    .col(AudioFiles::ReciterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VerseTranslations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerseTranslations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VerseTranslations::VerseKey)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerseTranslations::TranslationSource)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerseTranslations::Language)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(ColumnDef::new(VerseTranslations::Text).text().not_null())
                    .col(
                        ColumnDef::new(VerseTranslations::Source)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerseTranslations::LastSynced)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_verse_translations_verse_source")
                    .table(VerseTranslations::Table)
                    .col(VerseTranslations::VerseKey)
                    .col(VerseTranslations::TranslationSource)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerseTranslations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AudioFiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reciters::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Reciters {
    Table,
    Id,
    SourceId,
    Name,
    Style,
    Source,
    LastSynced,
    RawResponse,
}

#[derive(Iden)]
enum AudioFiles {
    Table,
    Id,
    VerseKey,
    ReciterId,
    AudioUrl,
    Format,
    Source,
    LastSynced,
}

#[derive(Iden)]
enum VerseTranslations {
    Table,
    Id,
    VerseKey,
    TranslationSource,
    Language,
    Text,
    Source,
    LastSynced,
}
