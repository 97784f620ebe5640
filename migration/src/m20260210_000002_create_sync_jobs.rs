use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Durable job queue shared by every worker process. Claiming is done
        // with FOR UPDATE SKIP LOCKED so concurrent workers never double-run.
        manager
            .create_table(
                Table::create()
                    .table(SyncJobs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncJobs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SyncJobs::JobType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SyncJobs::JobName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SyncJobs::Payload).json_binary().not_null())
                    .col(
                        ColumnDef::new(SyncJobs::Status)
                            .string_len(20)
                            .not_null()
                            .default("queued"),
                    )
                    .col(
                        ColumnDef::new(SyncJobs::ProgressPercentage)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SyncJobs::Error).text().null())
                    .col(
                        ColumnDef::new(SyncJobs::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SyncJobs::StartedAt).timestamp().null())
                    .col(ColumnDef::new(SyncJobs::FinishedAt).timestamp().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sync_jobs_status_created")
                    .table(SyncJobs::Table)
                    .col(SyncJobs::Status)
                    .col(SyncJobs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncJobs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SyncJobs {
    Table,
    Id,
    JobType,
    JobName,
    Payload,
    Status,
    ProgressPercentage,
    Error,
    CreatedAt,
    StartedAt,
    FinishedAt,
}
