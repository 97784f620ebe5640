use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TranslationJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TranslationJobs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::HadithId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::SourceLang)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::TargetLang)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(TranslationJobs::TranslatedText).text().null())
                    .col(
                        ColumnDef::new(TranslationJobs::RetryCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TranslationJobs::Error).text().null())
                    .col(
                        ColumnDef::new(TranslationJobs::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TranslationJobs::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // One translation job per hadith and target language
        manager
            .create_index(
                Index::create()
                    .name("uq_translation_jobs_hadith_lang")
                    .table(TranslationJobs::Table)
                    .col(TranslationJobs::HadithId)
                    .col(TranslationJobs::TargetLang)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_translation_jobs_status")
                    .table(TranslationJobs::Table)
                    .col(TranslationJobs::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TranslationJobs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TranslationJobs {
    Table,
    Id,
    HadithId,
    SourceLang,
    TargetLang,
    Status,
    TranslatedText,
    RetryCount,
    Error,
    CreatedAt,
    UpdatedAt,
}
