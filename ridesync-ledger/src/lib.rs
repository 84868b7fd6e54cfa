use chrono::{DateTime, Utc};
use ridesync_core::repository::{LedgerRepository, StoreResult};
use ridesync_core::{CompletedRide, LedgerStats, NewCompletedRide, RideMode, TripDetails};
use std::sync::Arc;

/// Append-capped ride history per user.
///
/// Every completion is recorded once per side (passenger and driver each get
/// their own row, same fare); the store keeps only the `cap` most recent
/// rows per owner.
#[derive(Clone)]
pub struct RideLedger {
    repo: Arc<dyn LedgerRepository>,
    cap: u32,
}

impl RideLedger {
    pub fn new(repo: Arc<dyn LedgerRepository>, cap: u32) -> Self {
        Self { repo, cap }
    }

    pub async fn record_completion(
        &self,
        owner: &str,
        trip: &TripDetails,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let ride = NewCompletedRide {
            owner: owner.to_string(),
            source: trip.source.clone(),
            destination: trip.destination.clone(),
            vehicle: trip.vehicle,
            ride_mode: RideMode::from_sharing(trip.sharing),
            price: trip.price,
            recorded_at: now,
        };

        self.repo.insert_capped(&ride, self.cap).await?;
        tracing::debug!(owner, price = trip.price, "recorded completed ride");
        Ok(())
    }

    pub async fn history(&self, owner: &str) -> StoreResult<Vec<CompletedRide>> {
        self.repo.history(owner).await
    }

    pub async fn stats(&self, owner: &str) -> StoreResult<LedgerStats> {
        self.repo.stats(owner).await
    }
}
