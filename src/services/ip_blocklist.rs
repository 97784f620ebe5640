//! IP blocklist
//!
//! Point lookups honor expiry at read time, so an expired rule stops
//! blocking even before the sweep disables it. The sweep keeps the
//! denormalized client_ip_stats.blocked flag from drifting.

use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::client_ip_stats::{self, Entity as ClientIpStats};
use crate::entities::ip_blocking_rules::{self, Entity as IpBlockingRules};

/// True iff an enabled, unexpired block rule exists for this IP.
/// Errors fail open: a broken guard must not take the API down.
pub async fn is_blocked(db: &DatabaseConnection, ip: &str) -> bool {
    match find_active_rule(db, ip).await {
        Ok(rule) => rule.is_some(),
        Err(e) => {
            tracing::warn!("IP blocklist lookup failed for {}: {}. Allowing request", ip, e);
            false
        }
    }
}

async fn find_active_rule(
    db: &DatabaseConnection,
    ip: &str,
) -> Result<Option<ip_blocking_rules::Model>, sea_orm::DbErr> {
    let rule = IpBlockingRules::find()
        .filter(ip_blocking_rules::Column::IpAddress.eq(ip))
        .filter(ip_blocking_rules::Column::Enabled.eq(true))
        .one(db)
        .await?;

    let now = Utc::now().naive_utc();
    Ok(rule.filter(|r| r.expires_at.is_none_or(|exp| exp > now)))
}

/// Create or re-arm a block for an IP. Re-blocking an already-known IP
/// updates the existing row in place.
pub async fn block(
    db: &DatabaseConnection,
    ip: &str,
    reason: Option<String>,
    expires_at: Option<NaiveDateTime>,
    created_by: Option<String>,
) -> Result<ip_blocking_rules::Model, sea_orm::DbErr> {
    let now = Utc::now().naive_utc();

    let model = ip_blocking_rules::ActiveModel {
        ip_address: Set(ip.to_string()),
        enabled: Set(true),
        block_reason: Set(reason),
        blocked_at: Set(now),
        expires_at: Set(expires_at),
        created_by: Set(created_by),
        ..Default::default()
    };

    let rule = IpBlockingRules::insert(model)
        .on_conflict(
            OnConflict::column(ip_blocking_rules::Column::IpAddress)
                .update_columns([
                    ip_blocking_rules::Column::Enabled,
                    ip_blocking_rules::Column::BlockReason,
                    ip_blocking_rules::Column::BlockedAt,
                    ip_blocking_rules::Column::ExpiresAt,
                    ip_blocking_rules::Column::CreatedBy,
                ])
                .to_owned(),
        )
        .exec_with_returning(db)
        .await?;

    set_stat_blocked(db, ip, true).await?;

    tracing::info!("Blocked IP {} (expires: {:?})", ip, rule.expires_at);
    Ok(rule)
}

/// Disable the block rule for an IP. Returns false when no rule existed.
pub async fn unblock(db: &DatabaseConnection, ip: &str) -> Result<bool, sea_orm::DbErr> {
    let rule = IpBlockingRules::find()
        .filter(ip_blocking_rules::Column::IpAddress.eq(ip))
        .one(db)
        .await?;

    let Some(rule) = rule else {
        return Ok(false);
    };

    let mut active: ip_blocking_rules::ActiveModel = rule.into();
    active.enabled = Set(false);
    active.update(db).await?;

    set_stat_blocked(db, ip, false).await?;

    tracing::info!("Unblocked IP {}", ip);
    Ok(true)
}

/// Disable every enabled rule whose expiry has passed and clear the
/// mirrored stat flag. Returns the number of rules swept.
pub async fn sweep_expired(db: &DatabaseConnection) -> Result<usize, sea_orm::DbErr> {
    let now = Utc::now().naive_utc();

    let expired = IpBlockingRules::find()
        .filter(ip_blocking_rules::Column::Enabled.eq(true))
        .filter(ip_blocking_rules::Column::ExpiresAt.is_not_null())
        .filter(ip_blocking_rules::Column::ExpiresAt.lte(now))
        .all(db)
        .await?;

    let count = expired.len();
    for rule in expired {
        let ip = rule.ip_address.clone();
        let mut active: ip_blocking_rules::ActiveModel = rule.into();
        active.enabled = Set(false);
        active.update(db).await?;
        set_stat_blocked(db, &ip, false).await?;
        tracing::info!("Block on {} expired, unblocked", ip);
    }

    Ok(count)
}

async fn set_stat_blocked(
    db: &DatabaseConnection,
    ip: &str,
    blocked: bool,
) -> Result<(), sea_orm::DbErr> {
    let stat = ClientIpStats::find()
        .filter(client_ip_stats::Column::IpAddress.eq(ip))
        .one(db)
        .await?;

    if let Some(stat) = stat {
        let mut active: client_ip_stats::ActiveModel = stat.into();
        active.blocked = Set(blocked);
        active.update(db).await?;
    }

    Ok(())
}
