use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RequestLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RequestLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RequestLogs::IpAddress)
                            .string_len(45)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RequestLogs::Endpoint)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RequestLogs::Method).string_len(10).not_null())
                    .col(ColumnDef::new(RequestLogs::StatusCode).integer().not_null())
                    .col(ColumnDef::new(RequestLogs::LatencyMs).integer().not_null())
                    .col(ColumnDef::new(RequestLogs::UserAgent).text().null())
                    .col(
                        ColumnDef::new(RequestLogs::RequestedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Analytics scans are always bounded by requested_at
        manager
            .create_index(
                Index::create()
                    .name("idx_request_logs_requested_at")
                    .table(RequestLogs::Table)
                    .col(RequestLogs::RequestedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClientIpStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientIpStats::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClientIpStats::IpAddress)
                            .string_len(45)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ClientIpStats::RequestCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ClientIpStats::ErrorCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ClientIpStats::AvgLatencyMs)
                            .double()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ClientIpStats::LastRequest)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientIpStats::Blocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ApiEndpointStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApiEndpointStats::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ApiEndpointStats::Endpoint)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApiEndpointStats::Method)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApiEndpointStats::RequestCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ApiEndpointStats::ErrorCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ApiEndpointStats::AvgLatencyMs)
                            .double()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ApiEndpointStats::LastRequest)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_api_endpoint_stats_endpoint_method")
                    .table(ApiEndpointStats::Table)
                    .col(ApiEndpointStats::Endpoint)
                    .col(ApiEndpointStats::Method)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ApiEndpointStats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ClientIpStats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RequestLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RequestLogs {
    Table,
    Id,
    IpAddress,
    Endpoint,
    Method,
    StatusCode,
    LatencyMs,
    UserAgent,
    RequestedAt,
}

#[derive(Iden)]
enum ClientIpStats {
    Table,
    Id,
    IpAddress,
    RequestCount,
    ErrorCount,
    AvgLatencyMs,
    LastRequest,
    Blocked,
}

#[derive(Iden)]
enum ApiEndpointStats {
    Table,
    Id,
    Endpoint,
    Method,
    RequestCount,
    ErrorCount,
    AvgLatencyMs,
    LastRequest,
}
