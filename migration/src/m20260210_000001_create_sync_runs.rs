use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only ledger of sync attempts. Rows are never updated after
        // finished_at is set.
        manager
            .create_table(
                Table::create()
                    .table(SyncRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncRuns::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::JobName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::Resource)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::Status)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::StartedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SyncRuns::FinishedAt).timestamp().null())
                    .col(ColumnDef::new(SyncRuns::DurationMs).big_integer().null())
                    .col(
                        ColumnDef::new(SyncRuns::RecordsProcessed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SyncRuns::RecordsFailed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(SyncRuns::Error).text().null())
                    .col(ColumnDef::new(SyncRuns::Notes).text().null())
                    .to_owned(),
            )
            .await?;

        // The skip-if-fresh lookup filters on (job_name, resource, status)
        // and sorts by started_at
        manager
            .create_index(
                Index::create()
                    .name("idx_sync_runs_job_resource")
                    .table(SyncRuns::Table)
                    .col(SyncRuns::JobName)
                    .col(SyncRuns::Resource)
                    .col(SyncRuns::StartedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncRuns::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SyncRuns {
    Table,
    Id,
    JobName,
    Resource,
    Status,
    StartedAt,
    FinishedAt,
    DurationMs,
    RecordsProcessed,
    RecordsFailed,
    Error,
    Notes,
}
