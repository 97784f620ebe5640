//! Hadith sync
//!
//! Collection metadata first, then books, then hadiths page by page.
//! Hadiths are upserted keyed by (collection_id, hadith_number). Each new
//! hadith without a Bangla text also seeds a pending translation job —
//! seeding is best effort and never fails the sync.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Duration;

use crate::entities::hadith_books::{self, Entity as HadithBooks};
use crate::entities::hadith_collections::{self, Entity as HadithCollections};
use crate::entities::hadiths::{self, Entity as Hadiths};
use crate::entities::translation_jobs::{self, Entity as TranslationJobs};
use crate::jobs::{finish_with_tally, JobContext, RecordTally, SyncOptions, SyncOutcome, SyncError, SyncTarget};
use crate::services::sunnah_api::HadithRecord;
use crate::services::sync_ledger;
use crate::AppState;

const SOURCE: &str = "sunnah_api";
const PER_PAGE: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct HadithPayload {
    /// Upstream collection slug, e.g. "bukhari"
    pub collection: String,
    /// Seed translation jobs for hadiths missing a Bangla text
    #[serde(default = "default_true")]
    pub seed_translations: bool,
}

fn default_true() -> bool {
    true
}

pub async fn sync_hadith(
    state: &AppState,
    payload: &Value,
    options: &SyncOptions,
    ctx: &JobContext,
) -> Result<SyncOutcome, SyncError> {
    let params: HadithPayload = serde_json::from_value(payload.clone())
        .map_err(|e| SyncError::Payload(e.to_string()))?;

    let job_name = SyncTarget::Hadith.job_name();
    let freshness = state.config.freshness_for(SyncTarget::Hadith);

    if !options.force
        && sync_ledger::recently_synced(&state.db, job_name, &params.collection, freshness)
            .await?
    {
        return Ok(SyncOutcome::skipped());
    }

    let run = sync_ledger::begin_run(&state.db, job_name, &params.collection).await?;

    // Collection metadata is the anchor; failing here fails the run
    let (info, raw) = match state.sunnah.fetch_collection(&params.collection).await {
        Ok(result) => result,
        Err(e) => {
            sync_ledger::fail_run(&state.db, run, &e.to_string()).await?;
            return Err(e.into());
        }
    };

    let collection = match upsert_collection(state, &params.collection, &info.title, info.total_hadith, raw).await
    {
        Ok(collection) => collection,
        Err(e) => {
            sync_ledger::fail_run(&state.db, run, &e.to_string()).await?;
            return Err(e.into());
        }
    };

    let mut tally = RecordTally::default();
    let mut cancelled = false;

    // Books give us both structure and a denominator for progress
    let books = match state.sunnah.fetch_books(&params.collection).await {
        Ok(books) => books,
        Err(e) => {
            tally.fail("book list", e);
            Vec::new()
        }
    };

    let total_books = books.len();

    'outer: for (book_index, book) in books.iter().enumerate() {
        // Some collections carry non-numeric intro "books"; skip them
        let Ok(book_number) = book.book_number.parse::<i32>() else {
            tracing::debug!(
                "[{}] Skipping non-numeric book '{}' in {}",
                job_name,
                book.book_number,
                params.collection
            );
            continue;
        };

        if !ctx.should_continue().await {
            cancelled = true;
            break;
        }

        let book_id = if options.dry_run {
            None
        } else {
            match upsert_book(state, collection.id, book_number, book.book_name.as_deref()).await {
                Ok(book) => Some(book.id),
                Err(e) => {
                    tally.fail(&format!("book {}", book_number), e);
                    continue;
                }
            }
        };

        let mut page = 1u32;
        loop {
            if !ctx.should_continue().await {
                cancelled = true;
                break 'outer;
            }

            let (records, total) = match state
                .sunnah
                .fetch_hadiths_page(&params.collection, book_number, page, PER_PAGE)
                .await
            {
                Ok(result) => result,
                Err(e) => {
                    tally.fail(&format!("book {} page {}", book_number, page), e);
                    break;
                }
            };

            let page_len = records.len();

            for record in records {
                if options.dry_run {
                    tally.ok();
                    continue;
                }
                match upsert_hadith(state, collection.id, book_id, &record).await {
                    Ok(hadith_id) => {
                        tally.ok();
                        if params.seed_translations {
                            seed_translation_job(state, hadith_id, &record).await;
                        }
                    }
                    Err(e) => {
                        tally.fail(
                            &format!("hadith {}:{}", params.collection, record.hadith_number),
                            e,
                        );
                    }
                }
            }

            let fetched_everything = match total {
                Some(total) => (page as i64 * PER_PAGE as i64) >= total,
                None => (page_len as u32) < PER_PAGE,
            };
            if fetched_everything {
                break;
            }

            page += 1;
            tokio::time::sleep(Duration::from_millis(state.config.page_delay_ms)).await;
        }

        ctx.set_progress(((book_index + 1) * 100 / total_books.max(1)) as i32).await;
    }

    let notes = match (options.dry_run, cancelled) {
        (true, _) => Some("dry run".to_string()),
        (false, true) => Some("stopped early by operator".to_string()),
        (false, false) => None,
    };
    finish_with_tally(&state.db, run, tally, notes).await
}

async fn upsert_collection(
    state: &AppState,
    collection_key: &str,
    title: &Option<String>,
    total_hadith: Option<i32>,
    raw: Value,
) -> Result<hadith_collections::Model, sea_orm::DbErr> {
    let model = hadith_collections::ActiveModel {
        collection_key: Set(collection_key.to_string()),
        name: Set(title.clone().unwrap_or_else(|| collection_key.to_string())),
        total_hadith: Set(total_hadith),
        source: Set(SOURCE.to_string()),
        last_synced: Set(Utc::now().naive_utc()),
        raw_response: Set(Some(raw)),
        ..Default::default()
    };

    HadithCollections::insert(model)
        .on_conflict(
            OnConflict::column(hadith_collections::Column::CollectionKey)
                .update_columns([
                    hadith_collections::Column::Name,
                    hadith_collections::Column::TotalHadith,
                    hadith_collections::Column::LastSynced,
                    hadith_collections::Column::RawResponse,
                ])
                .to_owned(),
        )
        .exec_with_returning(&state.db)
        .await
}

async fn upsert_book(
    state: &AppState,
    collection_id: i32,
    book_number: i32,
    name: Option<&str>,
) -> Result<hadith_books::Model, sea_orm::DbErr> {
    let model = hadith_books::ActiveModel {
        collection_id: Set(collection_id),
        book_number: Set(book_number),
        name: Set(name.unwrap_or_default().to_string()),
        source: Set(SOURCE.to_string()),
        last_synced: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    HadithBooks::insert(model)
        .on_conflict(
            OnConflict::columns([
                hadith_books::Column::CollectionId,
                hadith_books::Column::BookNumber,
            ])
            .update_columns([
                hadith_books::Column::Name,
                hadith_books::Column::LastSynced,
            ])
            .to_owned(),
        )
        .exec_with_returning(&state.db)
        .await
}

async fn upsert_hadith(
    state: &AppState,
    collection_id: i32,
    book_id: Option<i32>,
    record: &HadithRecord,
) -> Result<i64, sea_orm::DbErr> {
    let model = hadiths::ActiveModel {
        collection_id: Set(collection_id),
        book_id: Set(book_id),
        hadith_number: Set(record.hadith_number.clone()),
        text_ar: Set(record.text_ar.clone()),
        text_en: Set(record.text_en.clone()),
        // text_bn is deliberately absent: it belongs to the translation
        // pipeline and a re-sync must not wipe it
        grade: Set(record.grade.clone()),
        source: Set(SOURCE.to_string()),
        last_synced: Set(Utc::now().naive_utc()),
        raw_response: Set(Some(record.raw.clone())),
        ..Default::default()
    };

    let hadith = Hadiths::insert(model)
        .on_conflict(
            OnConflict::columns([
                hadiths::Column::CollectionId,
                hadiths::Column::HadithNumber,
            ])
            .update_columns([
                hadiths::Column::BookId,
                hadiths::Column::TextAr,
                hadiths::Column::TextEn,
                hadiths::Column::Grade,
                hadiths::Column::LastSynced,
                hadiths::Column::RawResponse,
            ])
            .to_owned(),
        )
        .exec_with_returning(&state.db)
        .await?;

    Ok(hadith.id)
}

/// Queue a Bangla translation for a hadith that has an English text but no
/// translation yet. Failure here is logged and swallowed: the translation
/// pipeline is decoupled from the primary sync by design.
async fn seed_translation_job(state: &AppState, hadith_id: i64, record: &HadithRecord) {
    if record.text_en.is_none() {
        return;
    }

    let exists = TranslationJobs::find()
        .filter(translation_jobs::Column::HadithId.eq(hadith_id))
        .filter(translation_jobs::Column::TargetLang.eq("bn"))
        .one(&state.db)
        .await;

    match exists {
        Ok(Some(_)) => {}
        Ok(None) => {
            let now = Utc::now().naive_utc();
            let job = translation_jobs::ActiveModel {
                hadith_id: Set(hadith_id),
                source_lang: Set("en".to_string()),
                target_lang: Set("bn".to_string()),
                status: Set(crate::jobs::translation_worker::status::PENDING.to_string()),
                retry_count: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            let insert = TranslationJobs::insert(job)
                .on_conflict(
                    OnConflict::columns([
                        translation_jobs::Column::HadithId,
                        translation_jobs::Column::TargetLang,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&state.db)
                .await;
            if let Err(e) = insert {
                tracing::warn!("Failed to seed translation job for hadith {}: {}", hadith_id, e);
            }
        }
        Err(e) => {
            tracing::warn!("Translation job lookup failed for hadith {}: {}", hadith_id, e);
        }
    }
}
