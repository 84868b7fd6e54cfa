use crate::request::RideMode;
use crate::vehicle::VehicleClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable completed-ride record; one row per ride side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedRide {
    pub id: i64,
    pub owner: String,
    pub source: String,
    pub destination: String,
    pub vehicle: VehicleClass,
    pub ride_mode: RideMode,
    pub price: i64,
    /// Always "Completed"; kept as a column for the history view
    pub status: String,
    pub recorded_at: DateTime<Utc>,
}

/// Insertion payload for a ledger row; the store assigns id and stamps the
/// status column
#[derive(Debug, Clone)]
pub struct NewCompletedRide {
    pub owner: String,
    pub source: String,
    pub destination: String,
    pub vehicle: VehicleClass,
    pub ride_mode: RideMode,
    pub price: i64,
    pub recorded_at: DateTime<Utc>,
}

/// What the ledger needs to know about a finished trip
#[derive(Debug, Clone)]
pub struct TripDetails {
    pub source: String,
    pub destination: String,
    pub vehicle: VehicleClass,
    pub sharing: bool,
    pub price: i64,
}

/// Summary over one owner's ledger rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerStats {
    pub count: i64,
    pub total_value: i64,
    pub average: f64,
}
