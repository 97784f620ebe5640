//! Scheduled sweep for expired IP blocks
//!
//! Point lookups already honor expiry, so this sweep only exists to turn
//! expired rules off and keep the denormalized client_ip_stats.blocked flag
//! in step with the rules table.

use tokio::time::{interval, Duration};

use crate::services::ip_blocklist;
use crate::AppState;

const SWEEP_INTERVAL_SECS: u64 = 60;

pub async fn start_guard_sweep(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(SWEEP_INTERVAL_SECS));

        loop {
            ticker.tick().await;

            match ip_blocklist::sweep_expired(&state.db).await {
                Ok(0) => {}
                Ok(count) => {
                    tracing::info!("[guard-sweep] Unblocked {} expired rule(s)", count);
                }
                Err(e) => {
                    tracing::error!("[guard-sweep] Sweep failed: {}", e);
                }
            }
        }
    });
}
