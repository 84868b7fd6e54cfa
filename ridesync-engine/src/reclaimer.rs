use crate::error::EngineError;
use chrono::{DateTime, Utc};
use ridesync_core::repository::RequestRepository;
use std::sync::Arc;
use tracing::debug;

/// What one sweep changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Pending requests past their expiry, now cancelled
    pub expired: u64,
    /// Older duplicate pending rows per passenger, now cancelled
    pub deduped: u64,
}

/// Idempotent sweep run every refresh cycle.
///
/// Step 1 expires timed-out pending requests; step 2 collapses duplicate
/// pending rows per passenger down to the newest. Both steps are pure
/// functions of current state and safe to re-run arbitrarily often.
#[derive(Clone)]
pub struct Reclaimer {
    requests: Arc<dyn RequestRepository>,
}

impl Reclaimer {
    pub fn new(requests: Arc<dyn RequestRepository>) -> Self {
        Self { requests }
    }

    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<SweepOutcome, EngineError> {
        let expired = self.requests.expire_pending(now).await?;
        let deduped = self.requests.cancel_duplicate_pending().await?;

        let outcome = SweepOutcome { expired, deduped };
        if outcome != SweepOutcome::default() {
            debug!(expired, deduped, "reclaimer sweep converged stale requests");
        }
        Ok(outcome)
    }
}
