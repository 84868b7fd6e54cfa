use crate::vehicle::VehicleClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Request status in the lifecycle
///
/// Transitions are monotone: `Pending -> Accepted -> Completed`, with
/// `Pending -> Cancelled` as the only other edge. `Completed` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "completed" => Ok(RequestStatus::Completed),
            "cancelled" => Ok(RequestStatus::Cancelled),
            other => Err(format!("unknown request status: {}", other)),
        }
    }
}

/// Solo or pooled ride
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RideMode {
    Solo,
    Shared,
}

impl RideMode {
    pub fn from_sharing(sharing: bool) -> Self {
        if sharing {
            RideMode::Shared
        } else {
            RideMode::Solo
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RideMode::Solo => "Solo",
            RideMode::Shared => "Shared",
        }
    }
}

impl fmt::Display for RideMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RideMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Solo" => Ok(RideMode::Solo),
            "Shared" => Ok(RideMode::Shared),
            other => Err(format!("unknown ride mode: {}", other)),
        }
    }
}

/// The central mutable entity: one passenger's open transportation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveRequest {
    /// Monotonic store-assigned id; FIFO tie-break and join-order proxy
    pub id: i64,
    pub passenger: String,
    pub pickup: String,
    pub destination: String,
    pub vehicle: VehicleClass,
    /// Fare fixed at creation, never recomputed
    pub price: i64,
    pub status: RequestStatus,
    /// Set on acceptance; retained through completion
    pub driver: Option<String>,
    /// Consulted only while the request is pending
    pub expires_at: DateTime<Utc>,
    pub ride_mode: RideMode,
    pub current_passengers: i32,
    pub max_passengers: i32,
}

impl ActiveRequest {
    pub fn has_open_seat(&self) -> bool {
        self.current_passengers < self.max_passengers
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == RequestStatus::Pending && self.expires_at <= now
    }
}

/// Insertion payload for a new pending request
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub passenger: String,
    pub pickup: String,
    pub destination: String,
    pub vehicle: VehicleClass,
    pub price: i64,
    pub ride_mode: RideMode,
    pub expires_at: DateTime<Utc>,
    pub max_passengers: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(status: RequestStatus, expires_at: DateTime<Utc>) -> ActiveRequest {
        ActiveRequest {
            id: 1,
            passenger: "p1".to_string(),
            pickup: "LJU Campus".to_string(),
            destination: "Satellite".to_string(),
            vehicle: VehicleClass::Auto,
            price: 100,
            status,
            driver: None,
            expires_at,
            ride_mode: RideMode::Solo,
            current_passengers: 1,
            max_passengers: 3,
        }
    }

    #[test]
    fn only_completed_and_cancelled_are_terminal() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(!RequestStatus::Accepted.is_terminal());
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
    }

    #[test]
    fn expiry_only_applies_while_pending() {
        let now = Utc::now();
        let stale = now - Duration::seconds(1);

        assert!(request(RequestStatus::Pending, stale).is_expired(now));
        assert!(!request(RequestStatus::Pending, now + Duration::seconds(60)).is_expired(now));
        // an accepted ride no longer consults its expiry
        assert!(!request(RequestStatus::Accepted, stale).is_expired(now));
    }
}
