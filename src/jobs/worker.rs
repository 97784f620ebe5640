//! Sync workers
//!
//! Each worker is a polling loop: claim the oldest queued job, dispatch it
//! through SyncTarget, record the outcome. Claiming is atomic in the queue
//! layer, so any number of workers across any number of processes can run
//! concurrently. Everything a job does is caught here — a failing sync
//! must never take the worker (or the process) down with it.

use tokio::time::{interval, Duration};

use crate::entities::sync_jobs;
use crate::jobs::{JobContext, SyncOptions, SyncTarget};
use crate::services::job_queue;
use crate::AppState;

pub async fn start_workers(state: AppState) {
    // Jobs left active by a crashed worker become claimable again
    if let Err(e) = job_queue::requeue_stale(&state.db).await {
        tracing::error!("Failed to requeue stale jobs: {}", e);
    }

    for worker_id in 0..state.config.worker_count {
        let state = state.clone();
        tokio::spawn(async move {
            run_worker_loop(state, worker_id).await;
        });
    }
}

async fn run_worker_loop(state: AppState, worker_id: usize) {
    let mut poll = interval(Duration::from_secs(state.config.worker_poll_secs));
    tracing::info!("[worker-{}] Started", worker_id);

    loop {
        poll.tick().await;

        let job = match job_queue::claim_next(&state.db).await {
            Ok(Some(job)) => job,
            Ok(None) => continue,
            Err(e) => {
                tracing::error!("[worker-{}] Claim failed: {}", worker_id, e);
                continue;
            }
        };

        tracing::info!(
            "[worker-{}] Running job {} ({})",
            worker_id,
            job.id,
            job.job_name
        );

        run_job(&state, job, worker_id).await;
    }
}

async fn run_job(state: &AppState, job: sync_jobs::Model, worker_id: usize) {
    let job_id = job.id;

    let Some(target) = SyncTarget::from_str(&job.job_type) else {
        tracing::error!("[worker-{}] Unknown job type '{}'", worker_id, job.job_type);
        let _ = job_queue::mark_failed(&state.db, job_id, "unknown job type").await;
        return;
    };

    let options: SyncOptions = serde_json::from_value(job.payload.clone()).unwrap_or_default();
    let ctx = JobContext::for_job(state.db.clone(), job_id);

    match target.run(state, &job.payload, &options, &ctx).await {
        Ok(outcome) => {
            tracing::info!(
                "[worker-{}] Job {} finished: {} ({} processed, {} failed)",
                worker_id,
                job_id,
                outcome.status,
                outcome.records_processed,
                outcome.records_failed
            );
            if let Err(e) = job_queue::mark_completed(&state.db, job_id).await {
                tracing::error!("[worker-{}] Failed to mark job {} completed: {}", worker_id, job_id, e);
            }
        }
        Err(e) => {
            tracing::error!("[worker-{}] Job {} failed: {}", worker_id, job_id, e);
            if let Err(e) = job_queue::mark_failed(&state.db, job_id, &e.to_string()).await {
                tracing::error!("[worker-{}] Failed to mark job {} failed: {}", worker_id, job_id, e);
            }
        }
    }
}
