//! Gold/silver price sync (change-detection variant)
//!
//! Scrapes the price table, then appends one observation per
//! (metal, category, unit). change_direction is computed here, at write
//! time, against the latest prior observation for the same key — it is a
//! stored column, never recomputed on read.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::gold_prices::{self, Entity as GoldPrices};
use crate::jobs::{finish_with_tally, JobContext, RecordTally, SyncOptions, SyncOutcome, SyncError, SyncTarget};
use crate::scrapers::ScrapedPrice;
use crate::services::sync_ledger;
use crate::AppState;

const RESOURCE: &str = "prices";

pub mod change {
    pub const UP: &str = "up";
    pub const DOWN: &str = "down";
    pub const UNCHANGED: &str = "unchanged";
}

/// Numeric comparison against the previous observation. None when there is
/// no prior row for this key.
pub fn change_direction(previous: Option<Decimal>, current: Decimal) -> Option<&'static str> {
    let previous = previous?;
    Some(if current > previous {
        change::UP
    } else if current < previous {
        change::DOWN
    } else {
        change::UNCHANGED
    })
}

pub async fn sync_gold_prices(
    state: &AppState,
    options: &SyncOptions,
    ctx: &JobContext,
) -> Result<SyncOutcome, SyncError> {
    let job_name = SyncTarget::GoldPrices.job_name();
    let freshness = state.config.freshness_for(SyncTarget::GoldPrices);

    if !options.force
        && sync_ledger::recently_synced(&state.db, job_name, RESOURCE, freshness).await?
    {
        return Ok(SyncOutcome::skipped());
    }

    let run = sync_ledger::begin_run(&state.db, job_name, RESOURCE).await?;

    let observations = match state.gold_scraper.fetch_prices().await {
        Ok(observations) => observations,
        Err(e) => {
            sync_ledger::fail_run(&state.db, run, &e.to_string()).await?;
            return Err(e.into());
        }
    };

    tracing::info!("[{}] Scraped {} price observations", job_name, observations.len());

    let mut tally = RecordTally::default();
    let total = observations.len();

    for (index, observation) in observations.into_iter().enumerate() {
        if !ctx.should_continue().await {
            tracing::info!("[{}] Stopping early on operator request", job_name);
            break;
        }

        if options.dry_run {
            tally.ok();
        } else {
            let key = format!(
                "{}/{}/{}",
                observation.metal, observation.category, observation.unit
            );
            match insert_observation(state, observation).await {
                Ok(()) => tally.ok(),
                Err(e) => tally.fail(&key, e),
            }
        }

        ctx.set_progress(((index + 1) * 100 / total.max(1)) as i32).await;
    }

    let notes = options.dry_run.then(|| "dry run".to_string());
    finish_with_tally(&state.db, run, tally, notes).await
}

async fn insert_observation(
    state: &AppState,
    observation: ScrapedPrice,
) -> Result<(), sea_orm::DbErr> {
    let previous = GoldPrices::find()
        .filter(gold_prices::Column::Metal.eq(&observation.metal))
        .filter(gold_prices::Column::Category.eq(&observation.category))
        .filter(gold_prices::Column::Unit.eq(&observation.unit))
        .order_by(gold_prices::Column::FetchedAt, Order::Desc)
        .limit(1)
        .one(&state.db)
        .await?;

    let direction = change_direction(previous.map(|p| p.price), observation.price);

    let row = gold_prices::ActiveModel {
        metal: Set(observation.metal),
        category: Set(observation.category),
        unit: Set(observation.unit),
        price: Set(observation.price),
        change_direction: Set(direction.map(|d| d.to_string())),
        source: Set(observation.source),
        fetched_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    row.insert(&state.db).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_went_up() {
        assert_eq!(change_direction(Some(dec!(100)), dec!(110)), Some(change::UP));
    }

    #[test]
    fn test_price_went_down() {
        assert_eq!(change_direction(Some(dec!(110)), dec!(100)), Some(change::DOWN));
    }

    #[test]
    fn test_price_unchanged() {
        assert_eq!(
            change_direction(Some(dec!(100)), dec!(100)),
            Some(change::UNCHANGED)
        );
        // Same value, different scale
        assert_eq!(
            change_direction(Some(dec!(100.00)), dec!(100)),
            Some(change::UNCHANGED)
        );
    }

    #[test]
    fn test_no_prior_observation() {
        assert_eq!(change_direction(None, dec!(100)), None);
    }
}
