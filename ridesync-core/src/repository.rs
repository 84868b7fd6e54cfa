use crate::account::Account;
use crate::ledger::{CompletedRide, LedgerStats, NewCompletedRide};
use crate::request::{ActiveRequest, NewRequest};
use crate::vehicle::VehicleClass;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Errors surfaced by the persistence layer.
///
/// `UniqueViolation` carries the domain signal (duplicate account, duplicate
/// active request); everything else the driver raises is `Unavailable` and
/// is retried on the caller's next poll cycle.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("uniqueness constraint violated: {0}")]
    UniqueViolation(String),

    #[error("store unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository trait for account data access
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account; `UniqueViolation` when the username is taken
    async fn create(&self, username: &str, password: &str) -> StoreResult<()>;

    async fn find(&self, username: &str) -> StoreResult<Option<Account>>;

    /// Username/password lookup
    async fn verify(&self, username: &str, password: &str) -> StoreResult<bool> {
        Ok(self
            .find(username)
            .await?
            .is_some_and(|account| account.password == password))
    }
}

/// Repository trait for active-request data access.
///
/// Status transitions are single conditional UPDATEs; the returned bool is
/// whether a row actually moved, which is how accept/accept and
/// complete/complete races are decided.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Insert a pending request; `UniqueViolation` when the passenger
    /// already holds a non-terminal request
    async fn insert(&self, request: &NewRequest) -> StoreResult<ActiveRequest>;

    async fn get(&self, id: i64) -> StoreResult<Option<ActiveRequest>>;

    /// The passenger's newest non-terminal request, if any
    async fn active_for_passenger(&self, passenger: &str) -> StoreResult<Option<ActiveRequest>>;

    /// Pending, non-expired requests of the given class, one per passenger
    /// (MAX(id) wins), excluding passengers already accepted elsewhere,
    /// ordered ascending by id
    async fn list_pending(
        &self,
        vehicle: VehicleClass,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<ActiveRequest>>;

    async fn accept_if_pending(&self, id: i64, driver: &str) -> StoreResult<bool>;

    async fn complete_if_accepted(&self, id: i64) -> StoreResult<bool>;

    async fn cancel_if_pending(&self, id: i64) -> StoreResult<bool>;

    /// Shared, non-terminal requests to the destination with a seat left
    async fn shared_matches(&self, destination: &str) -> StoreResult<Vec<ActiveRequest>>;

    async fn accepted_for_driver(&self, driver: &str) -> StoreResult<Vec<ActiveRequest>>;

    /// Reclaimer step 1: cancel pending rows past their expiry
    async fn expire_pending(&self, now: DateTime<Utc>) -> StoreResult<u64>;

    /// Reclaimer step 2: cancel all but the newest pending row per passenger
    async fn cancel_duplicate_pending(&self) -> StoreResult<u64>;
}

/// Repository trait for the completed-ride ledger
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Sliding-window insert: evict the single oldest row when the owner is
    /// at `cap`, then insert; one transaction
    async fn insert_capped(&self, ride: &NewCompletedRide, cap: u32) -> StoreResult<()>;

    /// The owner's rows, newest first
    async fn history(&self, owner: &str) -> StoreResult<Vec<CompletedRide>>;

    async fn stats(&self, owner: &str) -> StoreResult<LedgerStats>;
}
