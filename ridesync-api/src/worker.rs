use chrono::Utc;
use ridesync_engine::Reclaimer;
use std::time::Duration;
use tracing::{error, info};

/// Background tick that keeps the store converged even when nobody is
/// polling: every refresh interval, expire stale requests and collapse
/// duplicates.
///
/// A failed sweep is logged and retried on the next tick; the loop never
/// exits.
pub async fn start_reclaimer_worker(reclaimer: Reclaimer, interval: Duration) {
    info!(interval_secs = interval.as_secs(), "Reclaimer worker started");
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;
        match reclaimer.sweep(Utc::now()).await {
            Ok(outcome) => {
                if outcome.expired > 0 || outcome.deduped > 0 {
                    info!(
                        expired = outcome.expired,
                        deduped = outcome.deduped,
                        "reclaimer tick"
                    );
                }
            }
            Err(err) => error!("Reclaimer sweep failed: {}", err),
        }
    }
}
