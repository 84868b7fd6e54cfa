use crate::error::EngineError;
use chrono::{DateTime, Duration, Utc};
use ridesync_core::repository::RequestRepository;
use ridesync_core::{
    ActiveRequest, NewRequest, RequestStatus, RideMode, StoreError, TripDetails, VehicleClass,
};
use ridesync_ledger::RideLedger;
use std::sync::Arc;
use tracing::info;

/// Seats advertised when a passenger joins an existing shared ride
const SHARED_JOIN_CAPACITY: i32 = 4;

/// Owns the active-request state machine: creation, matching, acceptance,
/// completion, cancellation and shared-ride joining.
///
/// Every transition is a single conditional write in the store; the engine
/// turns lost races into `AlreadyTaken`/`NotFound` outcomes instead of
/// surfacing them as failures.
#[derive(Clone)]
pub struct LifecycleEngine {
    requests: Arc<dyn RequestRepository>,
    ledger: RideLedger,
    ttl: Duration,
}

impl LifecycleEngine {
    pub fn new(requests: Arc<dyn RequestRepository>, ledger: RideLedger, ttl: Duration) -> Self {
        Self {
            requests,
            ledger,
            ttl,
        }
    }

    /// Create a new pending request for the passenger.
    ///
    /// The passenger must not hold another non-terminal request: the guard
    /// here closes the common path, the store's partial unique index closes
    /// the race window between two concurrent creates.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_request(
        &self,
        passenger: &str,
        pickup: &str,
        destination: &str,
        vehicle: VehicleClass,
        price: i64,
        sharing: bool,
        now: DateTime<Utc>,
    ) -> Result<ActiveRequest, EngineError> {
        if self.requests.active_for_passenger(passenger).await?.is_some() {
            return Err(EngineError::DuplicateActiveRequest(passenger.to_string()));
        }

        let new_request = NewRequest {
            passenger: passenger.to_string(),
            pickup: pickup.to_string(),
            destination: destination.to_string(),
            vehicle,
            price,
            ride_mode: RideMode::from_sharing(sharing),
            expires_at: now + self.ttl,
            max_passengers: vehicle.capacity(),
        };

        let request = self.insert_guarded(passenger, &new_request).await?;
        info!(
            id = request.id,
            passenger,
            vehicle = %vehicle,
            mode = %request.ride_mode,
            "request created"
        );
        Ok(request)
    }

    /// Join an existing shared ride: a new independent pending row with its
    /// own id, copying the matched ride's destination, vehicle and fare.
    ///
    /// The matched row itself is not mutated.
    pub async fn join_shared(
        &self,
        passenger: &str,
        request_id: i64,
        pickup: &str,
        now: DateTime<Utc>,
    ) -> Result<ActiveRequest, EngineError> {
        let matched = self
            .requests
            .get(request_id)
            .await?
            .ok_or(EngineError::NotFound(request_id))?;

        let joinable = matched.ride_mode == RideMode::Shared
            && !matched.status.is_terminal()
            && matched.has_open_seat();
        if !joinable {
            return Err(EngineError::NotFound(request_id));
        }

        if self.requests.active_for_passenger(passenger).await?.is_some() {
            return Err(EngineError::DuplicateActiveRequest(passenger.to_string()));
        }

        let new_request = NewRequest {
            passenger: passenger.to_string(),
            pickup: pickup.to_string(),
            destination: matched.destination.clone(),
            vehicle: matched.vehicle,
            price: matched.price,
            ride_mode: RideMode::Shared,
            expires_at: now + self.ttl,
            max_passengers: SHARED_JOIN_CAPACITY,
        };

        let request = self.insert_guarded(passenger, &new_request).await?;
        info!(
            id = request.id,
            passenger,
            joined = request_id,
            "joined shared ride"
        );
        Ok(request)
    }

    /// What a driver of the given class should see: per passenger, only the
    /// newest pending non-expired request, excluding passengers who are
    /// already booked; ascending id for first-come-first-served display
    pub async fn list_pending_for_driver(
        &self,
        vehicle: VehicleClass,
        now: DateTime<Utc>,
    ) -> Result<Vec<ActiveRequest>, EngineError> {
        Ok(self.requests.list_pending(vehicle, now).await?)
    }

    /// Accept a pending request on behalf of a driver.
    ///
    /// The store-side conditional update decides the race: whoever loses
    /// gets `AlreadyTaken` and must re-fetch rather than retry the same id.
    pub async fn accept_request(&self, id: i64, driver: &str) -> Result<(), EngineError> {
        if self.requests.accept_if_pending(id, driver).await? {
            info!(id, driver, "request accepted");
            return Ok(());
        }

        match self.requests.get(id).await? {
            Some(request) => match request.status {
                RequestStatus::Accepted | RequestStatus::Completed => {
                    Err(EngineError::AlreadyTaken(id))
                }
                _ => Err(EngineError::NotFound(id)),
            },
            None => Err(EngineError::NotFound(id)),
        }
    }

    /// Driver-side completion; idempotent.
    ///
    /// On the actual transition, two ledger rows are written: one for the
    /// passenger and one for the driver, each with the same fare and route.
    pub async fn complete_request(&self, id: i64, now: DateTime<Utc>) -> Result<(), EngineError> {
        if !self.requests.complete_if_accepted(id).await? {
            return match self.requests.get(id).await? {
                Some(request) if request.status == RequestStatus::Completed => Ok(()),
                _ => Err(EngineError::NotFound(id)),
            };
        }

        let request = self
            .requests
            .get(id)
            .await?
            .ok_or(EngineError::NotFound(id))?;

        let trip = TripDetails {
            source: request.pickup.clone(),
            destination: request.destination.clone(),
            vehicle: request.vehicle,
            sharing: request.ride_mode == RideMode::Shared,
            price: request.price,
        };

        self.ledger
            .record_completion(&request.passenger, &trip, now)
            .await?;
        if let Some(driver) = &request.driver {
            self.ledger.record_completion(driver, &trip, now).await?;
        }

        info!(id, passenger = %request.passenger, "request completed");
        Ok(())
    }

    /// Passenger-side cancellation, permitted only while pending.
    /// Re-cancelling an already-cancelled request is a no-op.
    pub async fn cancel_request(&self, id: i64) -> Result<(), EngineError> {
        if self.requests.cancel_if_pending(id).await? {
            info!(id, "request cancelled");
            return Ok(());
        }

        match self.requests.get(id).await? {
            Some(request) if request.status == RequestStatus::Cancelled => Ok(()),
            _ => Err(EngineError::NotFound(id)),
        }
    }

    /// The passenger's current non-terminal request, if any
    pub async fn active_request_for(
        &self,
        passenger: &str,
    ) -> Result<Option<ActiveRequest>, EngineError> {
        Ok(self.requests.active_for_passenger(passenger).await?)
    }

    /// Shared rides to the destination that still advertise a free seat
    pub async fn find_shared_matches(
        &self,
        destination: &str,
    ) -> Result<Vec<ActiveRequest>, EngineError> {
        Ok(self.requests.shared_matches(destination).await?)
    }

    /// Rides the driver has accepted and not yet completed
    pub async fn accepted_rides_for(
        &self,
        driver: &str,
    ) -> Result<Vec<ActiveRequest>, EngineError> {
        Ok(self.requests.accepted_for_driver(driver).await?)
    }

    async fn insert_guarded(
        &self,
        passenger: &str,
        new_request: &NewRequest,
    ) -> Result<ActiveRequest, EngineError> {
        match self.requests.insert(new_request).await {
            Ok(request) => Ok(request),
            Err(StoreError::UniqueViolation(_)) => {
                Err(EngineError::DuplicateActiveRequest(passenger.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}
